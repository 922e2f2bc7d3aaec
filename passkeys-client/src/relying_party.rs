//! The relying party's JSON endpoints and login form actions.

use serde::Deserialize;
use url::Url;

use crate::NetworkError;

#[cfg(feature = "reqwest")]
mod reqwest_backend;

#[cfg(feature = "reqwest")]
pub use self::reqwest_backend::HttpRelyingParty;

/// The answer of the registration completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationStatus {
    /// `"OK"` when the key was stored.
    pub status: String,
    /// Why the key was refused.
    #[serde(default)]
    pub message: Option<String>,
}

impl RegistrationStatus {
    /// Whether the key was stored.
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// What a login form submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The relying party accepted the login and sent the user on, usually to `next`.
    Redirect(Url),
    /// The relying party rendered a page instead, typically the login form with its errors.
    Page {
        /// The HTTP status code
        status: u16,
        /// The HTML document
        body: String,
    },
}

/// Pluggable trait for the [`Client`](crate::Client) to reach the relying party. Every method
/// receives the endpoint from the client's [`Config`](crate::Config).
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait RelyingParty {
    /// `GET` the authentication options.
    async fn auth_begin(&self, url: Url) -> Result<serde_json::Value, NetworkError>;

    /// `GET` the registration options.
    async fn reg_begin(&self, url: Url) -> Result<serde_json::Value, NetworkError>;

    /// `POST` the encoded attestation as JSON.
    async fn reg_complete(
        &self,
        url: Url,
        credential: serde_json::Value,
        csrf_token: Option<String>,
    ) -> Result<RegistrationStatus, NetworkError>;

    /// `POST` a login form, form-encoded, without following the redirect it answers with.
    async fn submit_login(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> Result<LoginOutcome, NetworkError>;

    /// `POST` `{ "id": id }` and return the confirmation text.
    async fn delete_key(
        &self,
        url: Url,
        id: String,
        csrf_token: Option<String>,
    ) -> Result<String, NetworkError>;

    /// `PUT` `{ "id": id }`.
    async fn toggle_key(
        &self,
        url: Url,
        id: String,
        csrf_token: Option<String>,
    ) -> Result<(), NetworkError>;
}

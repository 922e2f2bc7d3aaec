//! Where the relying party lives and how its login form is laid out.

use serde::Deserialize;
use url::Url;

use crate::ClientError;


/// The relying party endpoints a [`Client`](crate::Client) talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urls {
    /// Returns the authentication options.
    pub auth_begin: Url,
    /// Returns the registration options.
    pub reg_begin: Url,
    /// Receives the new credential.
    pub reg_complete: Url,
    /// Deletes a stored key.
    pub del_key: Url,
    /// Enables or disables a stored key.
    pub toggle_key: Url,
    /// Action of the passkey login form.
    pub passkey_login: Url,
    /// Action of the one-time code login form.
    pub otp_login: Url,
    /// Where the user lands after enrolling or deleting a key.
    pub home: Url,
}

impl Urls {
    /// Derive every endpoint from the mount point of the passkeys application, so that
    /// `https://example.com/passkeys` yields `https://example.com/passkeys/auth-begin` and so on.
    pub fn from_base(base: &Url) -> Result<Self, ClientError> {
        if base.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "{base} cannot be used as a base url"
            )));
        }

        let mut root = base.clone();
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        root.set_query(None);
        root.set_fragment(None);

        let endpoint = |name: &str| {
            root.join(name).map_err(|err| {
                ClientError::Configuration(format!("cannot derive `{name}` from {base}: {err}"))
            })
        };

        Ok(Self {
            auth_begin: endpoint("auth-begin")?,
            reg_begin: endpoint("reg-begin")?,
            reg_complete: endpoint("reg-complete")?,
            del_key: endpoint("del-key")?,
            toggle_key: endpoint("toggle-key")?,
            passkey_login: endpoint("passkey-login")?,
            otp_login: endpoint("otp-login")?,
            home: base.clone(),
        })
    }
}

/// Names of the login form fields, as rendered by the relying party.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// The account identifier, `email` unless the user model logs in by username.
    pub username: String,
    /// The password input.
    pub password: String,
    /// The post-login redirect target.
    pub next: String,
    /// Tells the relying party which login button was used.
    #[serde(rename = "type")]
    pub kind: String,
    /// The one-time code input.
    pub otp: String,
    /// Asks for a fresh one-time code.
    pub resend_otp: String,
    /// The CSRF token input.
    pub csrf: String,
    /// The hidden input receiving the encoded assertion. A form without it cannot log in with a
    /// passkey.
    pub passkeys: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            username: "email".into(),
            password: "password".into(),
            next: "next".into(),
            kind: "type".into(),
            otp: "otp".into(),
            resend_otp: "resend_otp".into(),
            csrf: "csrfmiddlewaretoken".into(),
            passkeys: Some("passkeys".into()),
        }
    }
}

/// Everything a [`Client`](crate::Client) needs to know about its relying party.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The relying party endpoints.
    pub urls: Urls,
    /// The login form layout.
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    allows_insecure_localhost: bool,
}

impl Config {
    /// Create a configuration with the default form layout.
    pub fn new(urls: Urls) -> Self {
        Self {
            urls,
            form: FormConfig::default(),
            allows_insecure_localhost: false,
        }
    }

    /// Create a configuration from the mount point of the passkeys application.
    pub fn from_base_url(base: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base)
            .map_err(|err| ClientError::Configuration(format!("invalid base url {base}: {err}")))?;
        Urls::from_base(&base).map(Self::new)
    }

    /// Parse a JSON configuration such as
    /// `{ "urls": { "authBegin": "...", ... }, "form": { "username": "username" } }`.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|err| ClientError::Configuration(err.to_string()))
    }

    /// Let flows run on `localhost` and loopback origins without `https`.
    pub fn allows_insecure_localhost(mut self, is_allowed: bool) -> Self {
        self.allows_insecure_localhost = is_allowed;
        self
    }

    /// Whether [`Self::allows_insecure_localhost`] was enabled.
    pub fn insecure_localhost_allowed(&self) -> bool {
        self.allows_insecure_localhost
    }

    /// Replace the form layout.
    pub fn with_form(mut self, form: FormConfig) -> Self {
        self.form = form;
        self
    }
}

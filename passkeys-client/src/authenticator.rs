//! The seam to the platform authenticator, what a browser exposes as `navigator.credentials`.

use passkeys_types::{
    codec::Value,
    webauthn::{AuthenticatedPublicKeyCredential, CreatedPublicKeyCredential},
};

use crate::{AbortSignal, AuthenticatorError};

/// How the user is asked to pick a credential.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mediation {
    /// The user explicitly asked to sign in with a passkey.
    #[default]
    Required,
    /// Credentials are offered through the username field's autofill, without a modal dialog.
    Conditional,
}

/// Input of [`PlatformAuthenticator::get`].
#[derive(Debug, Clone)]
pub struct CredentialRequest {
    /// The decoded `{ "publicKey": { ... } }` request options, binary members as
    /// [`Value::Bytes`].
    pub options: Value,
    /// How the user is asked.
    pub mediation: Mediation,
    /// Set for conditional requests, which a later request may supersede.
    pub signal: Option<AbortSignal>,
}

/// Input of [`PlatformAuthenticator::create`].
#[derive(Debug, Clone)]
pub struct CredentialCreation {
    /// The decoded `{ "publicKey": { ... } }` creation options, binary members as
    /// [`Value::Bytes`].
    pub options: Value,
}

/// Pluggable trait for the [`Client`](crate::Client) to reach whatever signs on behalf of the
/// user. Timeouts carried in the options are enforced by the implementation.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait PlatformAuthenticator {
    /// Produce an assertion for one of the allowed, or any discoverable, credentials.
    async fn get(
        &self,
        request: CredentialRequest,
    ) -> Result<AuthenticatedPublicKeyCredential, AuthenticatorError>;

    /// Create a new credential for the user in the options.
    async fn create(
        &self,
        request: CredentialCreation,
    ) -> Result<CreatedPublicKeyCredential, AuthenticatorError>;

    /// Whether a user-verifying platform authenticator is present.
    async fn is_user_verifying_platform_authenticator_available(&self) -> bool;

    /// Whether [`Mediation::Conditional`] requests are supported.
    async fn is_conditional_mediation_available(&self) -> bool;
}

use std::fmt;

use passkeys_types::codec::DecodeError;

/// The two ceremonies a [`Client`](crate::Client) runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Signing in with an existing passkey.
    Authentication,
    /// Enrolling a new passkey.
    Registration,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Authentication => "authentication",
            Flow::Registration => "registration",
        })
    }
}

/// A request to the relying party that did not produce the expected answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The endpoint that was called
        url: String,
        /// What the HTTP stack reported
        reason: String,
    },
    /// The relying party answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// The endpoint that was called
        url: String,
        /// The HTTP status code
        status: u16,
    },
    /// The relying party answered with a body that is not what the endpoint returns.
    #[error("{url} returned an unexpected body: {reason}")]
    InvalidBody {
        /// The endpoint that was called
        url: String,
        /// Why the body was refused
        reason: String,
    },
}

/// Failures reported by the platform authenticator, named after the `DOMException`s a browser
/// raises from `navigator.credentials`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticatorError {
    /// The user cancelled, or the ceremony timed out.
    #[error("the operation was not allowed or timed out")]
    NotAllowed,
    /// None of the requested algorithms or options are supported.
    #[error("the requested options are not supported")]
    NotSupported,
    /// The authenticator already holds one of the excluded credentials.
    #[error("the authenticator is in an invalid state for this request")]
    InvalidState,
    /// The request was superseded by a newer one.
    #[error("the request was aborted")]
    Aborted,
    /// The origin is not allowed to use the relying party ID.
    #[error("the request was refused for security reasons")]
    Security,
    /// Any other exception, by name.
    #[error("the authenticator failed with {0}")]
    Unknown(String),
}

impl AuthenticatorError {
    /// Map a `DOMException` name such as `"NotAllowedError"`.
    pub fn from_dom_exception_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => AuthenticatorError::NotAllowed,
            "NotSupportedError" => AuthenticatorError::NotSupported,
            "InvalidStateError" => AuthenticatorError::InvalidState,
            "AbortError" => AuthenticatorError::Aborted,
            "SecurityError" => AuthenticatorError::Security,
            other => AuthenticatorError::Unknown(other.to_owned()),
        }
    }
}

/// Errors produced by the [`Client`](crate::Client) flows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The relying party options could not be decoded. The authenticator was not invoked.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A relying party endpoint failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// The platform authenticator failed.
    #[error(transparent)]
    Authenticator(#[from] AuthenticatorError),
    /// The relying party refused the submitted credential.
    #[error("the relying party rejected the credential with status {status}")]
    ServerRejection {
        /// The `status` member of the answer
        status: String,
        /// The `message` member of the answer, if any
        message: Option<String>,
    },
    /// Passkeys are only offered over `https`.
    #[error("{0} is not a secure context")]
    InsecureContext(String),
    /// The [`Config`](crate::Config) cannot serve the request.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The same flow is already running on this client.
    #[error("{0} is already in progress")]
    FlowInProgress(Flow),
}

impl ClientError {
    /// Whether the failure is worth offering the user another attempt.
    pub fn offers_retry(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_)
                | ClientError::Authenticator(_)
                | ClientError::ServerRejection { .. }
        )
    }
}

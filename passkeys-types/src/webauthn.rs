//! The subset of the [WebAuthn Level 3] dictionaries that a passkey login form exchanges with its
//! relying party.
//!
//! Every binary member is a [`Bytes`], so serializing any of these types with `serde_json` yields
//! the base64url JSON form the relying party expects, and deserializing accepts it back.
//!
//! [WebAuthn Level 3]: https://w3c.github.io/webauthn

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{utils::serde::ignore_unknown, Bytes};

mod assertion;
mod attestation;
mod common;

// re-export types
pub use self::{assertion::*, attestation::*, common::*};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::AuthenticatorAssertionResponse {}
    impl Sealed for super::AuthenticatorAttestationResponse {}
}

/// Marker trait for response types
pub trait AuthenticatorResponse: sealed::Sealed {}

impl AuthenticatorResponse for AuthenticatorAssertionResponse {}
impl AuthenticatorResponse for AuthenticatorAttestationResponse {}

/// The result of a successful `navigator.credentials.create()` or `navigator.credentials.get()`.
///
/// Prefer the aliases:
/// * registration: [CreatedPublicKeyCredential]
/// * authentication: [AuthenticatedPublicKeyCredential]
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredential<R: AuthenticatorResponse> {
    /// The credential ID chosen by the authenticator, usually the base64url encoding of
    /// [Self::raw_id]. The relying party looks stored keys up by this value.
    pub id: String,

    /// The raw bytes of the credential ID.
    pub raw_id: Bytes,

    /// Always [PublicKeyCredentialType::PublicKey] for passkeys.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The authenticator's answer: an [AuthenticatorAttestationResponse] after registration or an
    /// [AuthenticatorAssertionResponse] after authentication.
    pub response: R,

    /// How the authenticator was reached, when the platform reports it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Client extension outputs, passed along to the relying party as-is.
    #[serde(default)]
    pub client_extension_results: IndexMap<String, serde_json::Value>,
}

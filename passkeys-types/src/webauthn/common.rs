//! Types shared by registration (attestation) and authentication (assertion).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec},
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::{
    AuthenticatorAttestationResponse, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions,
};

/// The valid credential types.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum PublicKeyCredentialType {
    /// The only type currently defined.
    PublicKey,
    /// Anything else; it is the default so unknown values are ignored during deserialization.
    #[default]
    Unknown,
}

impl PublicKeyCredentialType {
    /// The wire name of this credential type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicKeyCredentialType::PublicKey => "public-key",
            PublicKeyCredentialType::Unknown => "unknown",
        }
    }
}

/// Identifies an existing credential, in [`PublicKeyCredentialRequestOptions::allow_credentials`]
/// and [`PublicKeyCredentialCreationOptions::exclude_credentials`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptor>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialDescriptor {
    /// Descriptors of an unknown type should be ignored.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The credential ID, base64url on the wire and raw bytes for the authenticator.
    pub id: Bytes,

    /// Hints on how the authenticator managing this credential may be reached, as stored from
    /// [`AuthenticatorAttestationResponse::transports`] at registration.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

/// The relying party's requirement on user verification.
///
/// <https://w3c.github.io/webauthn/#enumdef-userverificationrequirement>
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum UserVerificationRequirement {
    /// Fail the ceremony if the user cannot be verified.
    Required,
    /// Verify the user if possible.
    #[default]
    Preferred,
    /// Do not verify the user.
    Discouraged,
}

/// Hints about how a client may communicate with an authenticator.
///
/// <https://w3c.github.io/webauthn/#enum-transport>
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorTransport {
    /// Removable USB.
    Usb,
    /// Near Field Communication.
    Nfc,
    /// Bluetooth Low Energy.
    Ble,
    /// Cross-device flows such as signing in on a desktop with a phone.
    #[serde(alias = "cable")]
    Hybrid,
    /// A platform authenticator built into the client device.
    Internal,
}

impl AuthenticatorTransport {
    /// The wire name of this transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticatorTransport::Usb => "usb",
            AuthenticatorTransport::Nfc => "nfc",
            AuthenticatorTransport::Ble => "ble",
            AuthenticatorTransport::Hybrid => "hybrid",
            AuthenticatorTransport::Internal => "internal",
        }
    }
}

/// The attachment modality of an authenticator.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorAttachment {
    /// Built into the client device.
    Platform,
    /// Removable and able to roam between devices.
    CrossPlatform,
}

impl AuthenticatorAttachment {
    /// The wire name of this attachment.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticatorAttachment::Platform => "platform",
            AuthenticatorAttachment::CrossPlatform => "cross-platform",
        }
    }
}

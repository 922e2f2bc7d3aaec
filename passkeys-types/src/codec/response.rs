use indexmap::IndexMap;

use super::Value;
use crate::webauthn::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    AuthenticatorTransport, PublicKeyCredential,
};

/// Builds a [`Value::Map`] member by member, skipping optional members that are absent.
#[derive(Default)]
struct MapBuilder(IndexMap<String, Value>);

impl MapBuilder {
    fn member(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    fn optional<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.member(key, value),
            None => self,
        }
    }

    fn build(self) -> Value {
        Value::Map(self.0)
    }
}

impl<R> From<PublicKeyCredential<R>> for Value
where
    R: AuthenticatorResponse + Into<Value>,
{
    fn from(credential: PublicKeyCredential<R>) -> Self {
        let extensions = credential
            .client_extension_results
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect::<IndexMap<_, _>>();

        MapBuilder::default()
            .member("id", credential.id)
            .member("rawId", credential.raw_id)
            .member("type", credential.ty.as_str())
            .member("response", credential.response)
            .optional(
                "authenticatorAttachment",
                credential.authenticator_attachment.map(|a| a.as_str()),
            )
            .member("clientExtensionResults", extensions)
            .build()
    }
}

impl From<AuthenticatorAssertionResponse> for Value {
    fn from(response: AuthenticatorAssertionResponse) -> Self {
        MapBuilder::default()
            .member("clientDataJSON", response.client_data_json)
            .member("authenticatorData", response.authenticator_data)
            .member("signature", response.signature)
            .optional("userHandle", response.user_handle)
            .build()
    }
}

impl From<AuthenticatorAttestationResponse> for Value {
    fn from(response: AuthenticatorAttestationResponse) -> Self {
        let transports = response.transports.map(|transports| {
            transports
                .iter()
                .map(AuthenticatorTransport::as_str)
                .map(Value::from)
                .collect::<Vec<_>>()
        });

        MapBuilder::default()
            .member("clientDataJSON", response.client_data_json)
            .member("attestationObject", response.attestation_object)
            .optional("authenticatorData", response.authenticator_data)
            .optional("publicKey", response.public_key)
            .optional("publicKeyAlgorithm", response.public_key_algorithm)
            .optional("transports", transports)
            .build()
    }
}

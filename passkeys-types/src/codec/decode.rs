use indexmap::IndexMap;

use super::Value;
use crate::encoding;

const PUBLIC_KEY: &str = "publicKey";
const CHALLENGE: &str = "challenge";
const ALLOW_CREDENTIALS: &str = "allowCredentials";
const EXCLUDE_CREDENTIALS: &str = "excludeCredentials";
const USER: &str = "user";
const ID: &str = "id";

/// Errors produced while decoding relying party options into their binary form.
///
/// A decode error ends the ceremony before the authenticator is invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The member is text but not base64url, or has an impossible length.
    #[error("`{field}` is not valid base64url")]
    NotBase64Url {
        /// Path of the offending member, e.g. `publicKey.allowCredentials[0].id`
        field: String,
    },
    /// A member the ceremony cannot do without is absent or `null`.
    #[error("required field `{0}` is missing")]
    MissingField(String),
    /// A member known to the schema holds the wrong kind of value.
    #[error("`{field}` should be {expected}")]
    UnexpectedType {
        /// Path of the offending member
        field: String,
        /// What the schema expects at that position
        expected: &'static str,
    },
}

/// Decode the authentication options returned by the relying party's `auth-begin` endpoint.
///
/// The input is the whole `{ "publicKey": { ... } }` document. `publicKey.challenge` and the `id`
/// of every `publicKey.allowCredentials` entry are decoded into [`Value::Bytes`]; every other
/// member is left as received. An empty or `null` `allowCredentials` is removed, so the
/// authenticator is free to offer discoverable credentials.
pub fn decode_request_options(options: serde_json::Value) -> Result<Value, DecodeError> {
    let mut options = Value::from(options);
    let public_key = public_key_mut(&mut options)?;

    decode_required(public_key, CHALLENGE, "publicKey.challenge")?;

    let drop_allow_list = match public_key.get(ALLOW_CREDENTIALS) {
        Some(Value::Null) => true,
        Some(Value::List(descriptors)) => descriptors.is_empty(),
        _ => false,
    };
    if drop_allow_list {
        public_key.shift_remove(ALLOW_CREDENTIALS);
    } else {
        decode_descriptor_ids(
            public_key,
            ALLOW_CREDENTIALS,
            "publicKey.allowCredentials",
        )?;
    }

    Ok(options)
}

/// Decode the registration options returned by the relying party's `reg-begin` endpoint.
///
/// The input is the whole `{ "publicKey": { ... } }` document. `publicKey.challenge`,
/// `publicKey.user.id` and the `id` of every `publicKey.excludeCredentials` entry are decoded into
/// [`Value::Bytes`]; every other member is left as received.
pub fn decode_creation_options(options: serde_json::Value) -> Result<Value, DecodeError> {
    let mut options = Value::from(options);
    let public_key = public_key_mut(&mut options)?;

    decode_required(public_key, CHALLENGE, "publicKey.challenge")?;

    let user = match public_key.get_mut(USER) {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("publicKey.user".into())),
        Some(Value::Map(user)) => user,
        Some(_) => {
            return Err(DecodeError::UnexpectedType {
                field: "publicKey.user".into(),
                expected: "an object",
            })
        }
    };
    decode_required(user, ID, "publicKey.user.id")?;

    if matches!(public_key.get(EXCLUDE_CREDENTIALS), Some(Value::Null)) {
        public_key.shift_remove(EXCLUDE_CREDENTIALS);
    }
    decode_descriptor_ids(
        public_key,
        EXCLUDE_CREDENTIALS,
        "publicKey.excludeCredentials",
    )?;

    Ok(options)
}

fn public_key_mut(options: &mut Value) -> Result<&mut IndexMap<String, Value>, DecodeError> {
    let root = options
        .as_map_mut()
        .ok_or_else(|| DecodeError::UnexpectedType {
            field: "options".into(),
            expected: "an object",
        })?;

    match root.get_mut(PUBLIC_KEY) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(PUBLIC_KEY.into())),
        Some(Value::Map(public_key)) => Ok(public_key),
        Some(_) => Err(DecodeError::UnexpectedType {
            field: PUBLIC_KEY.into(),
            expected: "an object",
        }),
    }
}

/// Decode the `id` of every credential descriptor listed under `key`. An absent list is fine.
fn decode_descriptor_ids(
    parent: &mut IndexMap<String, Value>,
    key: &str,
    path: &str,
) -> Result<(), DecodeError> {
    let descriptors = match parent.get_mut(key) {
        None => return Ok(()),
        Some(Value::List(descriptors)) => descriptors,
        Some(_) => {
            return Err(DecodeError::UnexpectedType {
                field: path.into(),
                expected: "a list",
            })
        }
    };

    for (index, descriptor) in descriptors.iter_mut().enumerate() {
        let entry = format!("{path}[{index}]");
        let descriptor = descriptor
            .as_map_mut()
            .ok_or_else(|| DecodeError::UnexpectedType {
                field: entry.clone(),
                expected: "an object",
            })?;
        decode_required(descriptor, ID, &format!("{entry}.id"))?;
    }

    Ok(())
}

/// Replace the base64url text stored under `key` with its bytes.
fn decode_required(
    parent: &mut IndexMap<String, Value>,
    key: &str,
    path: &str,
) -> Result<(), DecodeError> {
    let value = parent
        .get_mut(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| DecodeError::MissingField(path.into()))?;

    let Value::String(text) = &*value else {
        return Err(DecodeError::UnexpectedType {
            field: path.into(),
            expected: "base64url text",
        });
    };

    let bytes =
        encoding::try_from_base64url(text).ok_or_else(|| DecodeError::NotBase64Url {
            field: path.into(),
        })?;
    *value = Value::Bytes(bytes.into());

    Ok(())
}

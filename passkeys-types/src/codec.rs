//! Lossless conversion between raw binary credential material and its JSON-safe base64url form.
//!
//! WebAuthn structures carry raw bytes (challenges, credential ids, signatures, ...) that cannot
//! cross a JSON boundary as is. The codec works on [`Value`], a tree that is either a JSON
//! primitive, a list, an ordered map or a [`Bytes`] leaf:
//!
//! * [`encode`] turns any [`Value`] into a [`serde_json::Value`], writing every binary leaf as
//!   unpadded base64url text. It is total and never looks at field names.
//! * [`decode_request_options`] and [`decode_creation_options`] go the other way for the option
//!   structures a relying party sends. Only the members known to be binary are decoded, everything
//!   else is passed through as it came.
//!
//! Platform responses are typed ([`webauthn::AuthenticatedPublicKeyCredential`] and
//! [`webauthn::CreatedPublicKeyCredential`]) and convert into a [`Value`] with [`From`].

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, ser::SerializeMap, Serialize, Serializer};

use crate::{encoding, Bytes, NotBase64Encoded};

#[cfg(doc)]
use crate::webauthn;

mod decode;
mod response;


pub use self::decode::{decode_creation_options, decode_request_options, DecodeError};

/// A binary aware JSON-like value.
///
/// Maps keep the insertion order of their keys, so encoding preserves the order in which the
/// members were received or built.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(serde_json::Number),
    /// JSON string
    String(String),
    /// Raw binary data, encoded as base64url text.
    Bytes(Bytes),
    /// JSON array
    List(Vec<Value>),
    /// JSON object
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Create an empty [`Value::Map`].
    pub fn map() -> Self {
        Value::Map(IndexMap::new())
    }

    /// Look up `key` if this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Mutably look up `key` if this is a map.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.as_map_mut()?.get_mut(key)
    }

    /// Insert a member if this is a map, returning the value it replaced.
    ///
    /// Does nothing on any other variant and hands `value` back as the error.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, Value> {
        match self {
            Value::Map(map) => Ok(map.insert(key.into(), value.into())),
            _ => Err(value.into()),
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The text of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// The bytes of a [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The items of a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The members of a [`Value::Map`].
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The members of a [`Value::Map`], mutably.
    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Deserialize this value into one of the typed [`webauthn`] structures.
    ///
    /// Binary leaves reach the target as base64url text, which every [`Bytes`] member accepts.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(encode(self))
    }
}

/// Encode a value into its JSON-safe form.
///
/// Lists are encoded element-wise and maps member-wise, keeping order and length. [`Value::Bytes`]
/// leaves become unpadded base64url strings, every other leaf is copied as is. The input is left
/// untouched and the output never contains binary data.
pub fn encode(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Number(num) => serde_json::Value::Number(num.clone()),
        Value::String(text) => serde_json::Value::String(text.clone()),
        Value::Bytes(bytes) => serde_json::Value::String(base64url_encode(bytes)),
        Value::List(items) => serde_json::Value::Array(items.iter().map(encode).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), encode(value)))
                .collect(),
        ),
    }
}

/// Encode bytes as unpadded base64url text ([RFC 4648 §5]).
///
/// [RFC 4648 §5]: https://www.rfc-editor.org/rfc/rfc4648#section-5
pub fn base64url_encode(data: &[u8]) -> String {
    encoding::base64url(data)
}

/// Decode base64url text, with or without padding.
///
/// Unlike `Bytes::try_from`, the standard base64 alphabet (`+` and `/`) is rejected.
pub fn base64url_decode(text: &str) -> Result<Bytes, NotBase64Encoded> {
    encoding::try_from_base64url(text)
        .map(Bytes::from)
        .ok_or(NotBase64Encoded)
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(flag) => serializer.serialize_bool(*flag),
            Value::Number(num) => num.serialize(serializer),
            Value::String(text) => serializer.serialize_str(text),
            Value::Bytes(bytes) => bytes.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(num) => Value::Number(num),
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_owned())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(num: i64) -> Self {
        Value::Number(num.into())
    }
}

impl From<u32> for Value {
    fn from(num: u32) -> Self {
        Value::Number(num.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

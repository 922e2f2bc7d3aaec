//! # Passkeys Types
//!
//! The binary side of a passkey login form: [`Bytes`] and its base64url [`encoding`], the
//! [`codec`] that moves relying party options and authenticator responses across the JSON
//! boundary, and the [`webauthn`] wire types those options deserialize into.
//!
//! ```
//! use passkeys_types::codec::{decode_request_options, encode};
//!
//! let options = serde_json::json!({ "publicKey": { "challenge": "AAECAw", "allowCredentials": [] } });
//! let decoded = decode_request_options(options).unwrap();
//!
//! let challenge = decoded.get("publicKey").and_then(|pk| pk.get("challenge")).unwrap();
//! assert_eq!(challenge.as_bytes().unwrap().as_slice(), [0, 1, 2, 3]);
//! assert_eq!(encode(&decoded), serde_json::json!({ "publicKey": { "challenge": "AAECAw" } }));
//! ```

mod utils;

pub mod codec;
pub mod webauthn;

// Re-exports
pub use utils::{
    bytes::{Bytes, NotBase64Encoded},
    encoding,
};

#[cfg(any(test, feature = "testable"))]
pub use utils::rand;

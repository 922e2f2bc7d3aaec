//! # Passkeys
//!
//! A collection of libraries for pages that log users in with passkeys against a relying party
//! exposing JSON endpoints. It is comprised of two sub-libraries:
//!
//! - `passkeys-types` - usable as [`types`]: [`Bytes`](types::Bytes), the base64url
//!   [`codec`](types::codec) and the [WebAuthn][webauthn-3] wire types.
//! - `passkeys-client` - usable as [`client`]: the [`Client`](client::Client) running the
//!   authentication and registration ceremonies.
//!
//! ## Basic Concepts
//!
//! Raw binary credential material (challenges, credential ids, signatures) cannot cross a JSON
//! boundary. The relying party sends it as unpadded base64url text, the platform authenticator
//! wants bytes. The codec converts between the two: [`decode_request_options`] and
//! [`decode_creation_options`] turn exactly the binary members of the options into bytes, and
//! [`encode`] turns any value back into JSON-safe text.
//!
//! The [`Client`](client::Client) chains the pieces together:
//!
//! RelyingParty <-> [`Client`](client::Client) <-> [`PlatformAuthenticator`](client::PlatformAuthenticator)
//!
//! - [`authenticate()`](client::Client::authenticate()) - fetch the request options, get an
//!   assertion and post it with the login form.
//! - [`register()`](client::Client::register()) - fetch the creation options, create a credential
//!   and post it to the registration endpoint.
//!
//! [webauthn-3]: https://www.w3.org/TR/webauthn-3/
//! [`decode_request_options`]: types::codec::decode_request_options
//! [`decode_creation_options`]: types::codec::decode_creation_options
//! [`encode`]: types::codec::encode
//!
//! ### Example: Logging in with a passkey
//!
//! ```
//! use passkeys::{
//!     client::{
//!         Client, Config, LoginForm, LoginOutcome, Mediation, MockPlatformAuthenticator,
//!         MockRelyingParty,
//!     },
//!     types::webauthn::{
//!         AuthenticatedPublicKeyCredential, AuthenticatorAssertionResponse,
//!         PublicKeyCredentialType,
//!     },
//! };
//! use url::Url;
//!
//! # tokio_test::block_on(async {
//! let config = Config::from_base_url("https://example.com/passkeys").unwrap();
//!
//! // The relying party hands out a challenge and accepts the login form.
//! let mut relying_party = MockRelyingParty::new();
//! relying_party.expect_auth_begin().returning(|_| {
//!     Ok(serde_json::json!({ "publicKey": { "challenge": "AAECAw", "allowCredentials": [] } }))
//! });
//! relying_party
//!     .expect_submit_login()
//!     .returning(|_, _| Ok(LoginOutcome::Redirect(Url::parse("https://example.com/").unwrap())));
//!
//! // The platform authenticator receives the challenge as bytes.
//! let mut authenticator = MockPlatformAuthenticator::new();
//! authenticator.expect_get().returning(|request| {
//!     let challenge = request
//!         .options
//!         .get("publicKey")
//!         .and_then(|pk| pk.get("challenge"))
//!         .and_then(|challenge| challenge.as_bytes())
//!         .unwrap();
//!     assert_eq!(challenge.as_slice(), [0, 1, 2, 3]);
//!
//!     Ok(AuthenticatedPublicKeyCredential {
//!         id: "q83v".into(),
//!         raw_id: vec![0xab, 0xcd, 0xef].into(),
//!         ty: PublicKeyCredentialType::PublicKey,
//!         response: AuthenticatorAssertionResponse {
//!             client_data_json: b"{}".as_slice().into(),
//!             authenticator_data: vec![0; 37].into(),
//!             signature: vec![0; 64].into(),
//!             user_handle: None,
//!         },
//!         authenticator_attachment: None,
//!         client_extension_results: Default::default(),
//!     })
//! });
//!
//! let client = Client::new(relying_party, authenticator, config)
//!     .with_cookie_header("csrftoken=abc123");
//! let origin = Url::parse("https://example.com/passkeys/login").unwrap();
//!
//! let outcome = client
//!     .authenticate(&origin, Mediation::Required, LoginForm::default().with_next("/"))
//!     .await
//!     .unwrap();
//! assert!(matches!(outcome, LoginOutcome::Redirect(_)));
//! # })
//! ```

pub use passkeys_client as client;
pub use passkeys_types as types;

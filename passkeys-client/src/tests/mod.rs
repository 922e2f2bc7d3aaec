use super::*;
use passkeys_types::{
    codec::DecodeError,
    webauthn::{
        AuthenticatedPublicKeyCredential, AuthenticatorAssertionResponse,
        AuthenticatorAttestationResponse, CreatedPublicKeyCredential, PublicKeyCredentialType,
    },
};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tokio::sync::Notify;

const BASE: &str = "https://example.com/passkeys";

fn origin() -> Url {
    Url::parse("https://example.com/passkeys/login").unwrap()
}

fn config() -> Config {
    Config::from_base_url(BASE).unwrap()
}

fn request_options() -> serde_json::Value {
    json!({
        "publicKey": {
            "challenge": "AAECAw",
            "timeout": 60000,
            "rpId": "example.com",
            "allowCredentials": [],
            "userVerification": "preferred",
        }
    })
}

fn creation_options() -> serde_json::Value {
    json!({
        "publicKey": {
            "rp": { "id": "example.com", "name": "Example" },
            "user": { "id": "YWRtaW4", "name": "admin", "displayName": "Admin" },
            "challenge": "AAECAw",
            "pubKeyCredParams": [{ "type": "public-key", "alg": -7 }],
            "excludeCredentials": [{ "type": "public-key", "id": "q83v" }],
        }
    })
}

fn assertion() -> AuthenticatedPublicKeyCredential {
    AuthenticatedPublicKeyCredential {
        id: "q83v".into(),
        raw_id: vec![0xab, 0xcd, 0xef].into(),
        ty: PublicKeyCredentialType::PublicKey,
        response: AuthenticatorAssertionResponse {
            client_data_json: b"{}".as_slice().into(),
            authenticator_data: vec![0; 37].into(),
            signature: vec![0, 1, 2, 3].into(),
            user_handle: None,
        },
        authenticator_attachment: None,
        client_extension_results: Default::default(),
    }
}

fn attestation() -> CreatedPublicKeyCredential {
    CreatedPublicKeyCredential {
        id: "q83v".into(),
        raw_id: vec![0xab, 0xcd, 0xef].into(),
        ty: PublicKeyCredentialType::PublicKey,
        response: AuthenticatorAttestationResponse {
            client_data_json: b"{}".as_slice().into(),
            attestation_object: vec![0xa0].into(),
            authenticator_data: None,
            public_key: None,
            public_key_algorithm: None,
            transports: None,
        },
        authenticator_attachment: None,
        client_extension_results: Default::default(),
    }
}

fn home_redirect() -> LoginOutcome {
    LoginOutcome::Redirect(Url::parse("https://example.com/passkeys/").unwrap())
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn rp_with_options() -> MockRelyingParty {
    let mut rp = MockRelyingParty::new();
    rp.expect_auth_begin()
        .withf(|url| url.as_str() == "https://example.com/passkeys/auth-begin")
        .returning(|_| Ok(request_options()));
    rp
}

/// Answers explicit requests once released and never answers conditional ones.
#[derive(Default)]
struct HeldAuthenticator {
    release: Notify,
}

#[async_trait::async_trait]
impl PlatformAuthenticator for HeldAuthenticator {
    async fn get(
        &self,
        request: CredentialRequest,
    ) -> Result<AuthenticatedPublicKeyCredential, AuthenticatorError> {
        match request.mediation {
            Mediation::Conditional => std::future::pending().await,
            Mediation::Required => {
                self.release.notified().await;
                Ok(assertion())
            }
        }
    }

    async fn create(
        &self,
        _request: CredentialCreation,
    ) -> Result<CreatedPublicKeyCredential, AuthenticatorError> {
        Err(AuthenticatorError::NotSupported)
    }

    async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        true
    }

    async fn is_conditional_mediation_available(&self) -> bool {
        true
    }
}

/// Hands out request options once released and accepts every login form.
#[derive(Default)]
struct HeldRelyingParty {
    release: Notify,
    submitted: AtomicUsize,
}

fn not_found(url: Url) -> NetworkError {
    NetworkError::Status {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait::async_trait]
impl RelyingParty for HeldRelyingParty {
    async fn auth_begin(&self, _url: Url) -> Result<serde_json::Value, NetworkError> {
        self.release.notified().await;
        Ok(request_options())
    }

    async fn reg_begin(&self, url: Url) -> Result<serde_json::Value, NetworkError> {
        Err(not_found(url))
    }

    async fn reg_complete(
        &self,
        url: Url,
        _credential: serde_json::Value,
        _csrf_token: Option<String>,
    ) -> Result<RegistrationStatus, NetworkError> {
        Err(not_found(url))
    }

    async fn submit_login(
        &self,
        _url: Url,
        _fields: Vec<(String, String)>,
    ) -> Result<LoginOutcome, NetworkError> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(home_redirect())
    }

    async fn delete_key(
        &self,
        url: Url,
        _id: String,
        _csrf_token: Option<String>,
    ) -> Result<String, NetworkError> {
        Err(not_found(url))
    }

    async fn toggle_key(
        &self,
        url: Url,
        _id: String,
        _csrf_token: Option<String>,
    ) -> Result<(), NetworkError> {
        Err(not_found(url))
    }
}

#[tokio::test]
async fn authenticate_submits_the_encoded_assertion() {
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .withf(|url, fields| {
            let credential: serde_json::Value =
                serde_json::from_str(field(fields, "passkeys").unwrap()).unwrap();
            url.as_str() == "https://example.com/passkeys/passkey-login"
                && field(fields, "type") == Some("passkey")
                && field(fields, "csrfmiddlewaretoken") == Some("token")
                && field(fields, "next") == Some("/passkeys/")
                && credential["rawId"] == "q83v"
                && credential["response"]["signature"] == "AAECAw"
                && credential["response"].get("userHandle").is_none()
        })
        .returning(|_, _| Ok(home_redirect()))
        .times(1);

    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_get()
        .withf(|request| {
            let public_key = request.options.get("publicKey").unwrap();
            request.mediation == Mediation::Required
                && request.signal.is_none()
                && public_key.get("challenge").and_then(Value::as_bytes).map(|b| b.as_slice())
                    == Some(&[0, 1, 2, 3][..])
                && public_key.get("allowCredentials").is_none()
                && public_key.get("rpId").and_then(Value::as_str) == Some("example.com")
        })
        .returning(|_| Ok(assertion()))
        .times(1);

    let client = Client::new(rp, authenticator, config()).with_csrf_token("token");
    let outcome = client
        .authenticate(
            &origin(),
            Mediation::Required,
            LoginForm::default().with_next("/passkeys/"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, home_redirect());
    assert!(!client.is_authenticating());
}

#[tokio::test]
async fn decode_error_never_reaches_the_authenticator() {
    let mut rp = MockRelyingParty::new();
    rp.expect_auth_begin()
        .returning(|_| Ok(json!({ "publicKey": { "challenge": "a+b/" } })));
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_get().never();

    let client = Client::new(rp, authenticator, config());
    let err = client
        .authenticate(&origin(), Mediation::Required, LoginForm::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Decode(DecodeError::NotBase64Url {
            field: "publicKey.challenge".into()
        })
    );
    assert!(!err.offers_retry());
    assert!(!client.is_authenticating());
}

#[tokio::test]
async fn insecure_origin_is_refused_before_any_request() {
    let client = Client::new(
        MockRelyingParty::new(),
        MockPlatformAuthenticator::new(),
        config(),
    );
    let http = Url::parse("http://example.com/passkeys/login").unwrap();

    let err = client
        .authenticate(&http, Mediation::Required, LoginForm::default())
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::InsecureContext("http://example.com".into()));

    let err = client.register(&http, "laptop").await.unwrap_err();
    assert_eq!(err, ClientError::InsecureContext("http://example.com".into()));
}

#[tokio::test]
async fn localhost_runs_when_allowed() {
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .returning(|_, _| Ok(home_redirect()));
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_get().returning(|_| Ok(assertion()));

    let client = Client::new(rp, authenticator, config().allows_insecure_localhost(true));
    let local = Url::parse("http://localhost:8000/passkeys/login").unwrap();

    assert!(client
        .authenticate(&local, Mediation::Required, LoginForm::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn failures_release_the_gate() {
    let mut rp = MockRelyingParty::new();
    rp.expect_auth_begin().returning(|url| {
        Err(NetworkError::Status {
            url: url.to_string(),
            status: 500,
        })
    });
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_get().never();

    let client = Client::new(rp, authenticator, config());
    for _ in 0..2 {
        let err = client
            .authenticate(&origin(), Mediation::Required, LoginForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(NetworkError::Status { status: 500, .. })));
        assert!(err.offers_retry());
    }
}

#[tokio::test]
async fn cancelled_authenticator_is_reported() {
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_get()
        .returning(|_| Err(AuthenticatorError::from_dom_exception_name("NotAllowedError")));

    let client = Client::new(rp_with_options(), authenticator, config());
    let err = client
        .authenticate(&origin(), Mediation::Required, LoginForm::default())
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::Authenticator(AuthenticatorError::NotAllowed));
    assert!(err.offers_retry());
}

#[tokio::test]
async fn second_explicit_login_is_refused_while_one_runs() {
    let origin = origin();
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .returning(|_, _| Ok(home_redirect()))
        .times(1);
    let client = Client::new(rp, HeldAuthenticator::default(), config());

    let first = client.authenticate(&origin, Mediation::Required, LoginForm::default());
    let second = async {
        assert!(client.is_authenticating());
        let result = client
            .authenticate(&origin, Mediation::Required, LoginForm::default())
            .await;
        client.authenticator().release.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, Ok(home_redirect()));
    assert_eq!(
        second,
        Err(ClientError::FlowInProgress(Flow::Authentication))
    );
    assert!(!client.is_authenticating());
}

#[tokio::test]
async fn explicit_login_aborts_the_conditional_request() {
    let origin = origin();
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .returning(|_, _| Ok(home_redirect()))
        .times(1);
    let client = Client::new(rp, HeldAuthenticator::default(), config());

    let conditional = client.authenticate(&origin, Mediation::Conditional, LoginForm::default());
    let explicit = async {
        client.authenticator().release.notify_one();
        client
            .authenticate(&origin, Mediation::Required, LoginForm::default())
            .await
    };
    let (conditional, explicit) = tokio::join!(conditional, explicit);

    assert_eq!(
        conditional,
        Err(ClientError::Authenticator(AuthenticatorError::Aborted))
    );
    assert_eq!(explicit, Ok(home_redirect()));
}

#[tokio::test]
async fn new_conditional_request_supersedes_the_previous_one() {
    let origin = origin();
    let client = Client::new(rp_with_options(), HeldAuthenticator::default(), config());

    let first = client.authenticate(&origin, Mediation::Conditional, LoginForm::default());
    let second = async {
        tokio::task::yield_now().await;
        tokio::select! {
            _ = client.authenticate(&origin, Mediation::Conditional, LoginForm::default()) => {
                panic!("a conditional request is never answered")
            }
            () = tokio::task::yield_now() => {}
        }
    };
    let (first, ()) = tokio::join!(first, second);

    assert_eq!(
        first,
        Err(ClientError::Authenticator(AuthenticatorError::Aborted))
    );
}

#[tokio::test]
async fn conditional_request_aborted_while_fetching_options_stops() {
    let origin = origin();
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_get().never();
    let client = Client::new(HeldRelyingParty::default(), authenticator, config());

    let conditional = client.authenticate(&origin, Mediation::Conditional, LoginForm::default());
    let abort = async {
        tokio::task::yield_now().await;
        client.abort_conditional();
        client.relying_party().release.notify_one();
    };
    let (conditional, ()) = tokio::join!(conditional, abort);

    assert_eq!(
        conditional,
        Err(ClientError::Authenticator(AuthenticatorError::Aborted))
    );
    assert_eq!(client.relying_party().submitted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explicit_login_aborting_during_option_fetch_wins() {
    let origin = origin();
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_get()
        .withf(|request| request.mediation == Mediation::Required)
        .returning(|_| Ok(assertion()))
        .times(1);
    let client = Client::new(HeldRelyingParty::default(), authenticator, config());

    let conditional = client.authenticate(&origin, Mediation::Conditional, LoginForm::default());
    let explicit = async {
        tokio::task::yield_now().await;
        let explicit = client.authenticate(&origin, Mediation::Required, LoginForm::default());
        let release = async {
            tokio::task::yield_now().await;
            client.relying_party().release.notify_waiters();
        };
        tokio::join!(explicit, release).0
    };
    let (conditional, explicit) = tokio::join!(conditional, explicit);

    assert_eq!(
        conditional,
        Err(ClientError::Authenticator(AuthenticatorError::Aborted))
    );
    assert_eq!(explicit, Ok(home_redirect()));
    assert_eq!(client.relying_party().submitted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn conditional_request_is_refused_during_an_explicit_login() {
    let origin = origin();
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .returning(|_, _| Ok(home_redirect()))
        .times(1);
    let client = Client::new(rp, HeldAuthenticator::default(), config());

    let explicit = client.authenticate(&origin, Mediation::Required, LoginForm::default());
    let conditional = async {
        assert!(client.is_authenticating());
        let result = client
            .authenticate(&origin, Mediation::Conditional, LoginForm::default())
            .await;
        client.authenticator().release.notify_one();
        result
    };
    let (explicit, conditional) = tokio::join!(explicit, conditional);

    assert_eq!(explicit, Ok(home_redirect()));
    assert_eq!(
        conditional,
        Err(ClientError::FlowInProgress(Flow::Authentication))
    );
    assert!(!client.is_authenticating());
}

#[tokio::test]
async fn conditional_requests_carry_a_signal() {
    let mut rp = rp_with_options();
    rp.expect_submit_login()
        .returning(|_, _| Ok(home_redirect()));
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_get()
        .withf(|request| {
            request.mediation == Mediation::Conditional
                && request.signal.as_ref().is_some_and(|signal| !signal.is_aborted())
        })
        .returning(|_| Ok(assertion()))
        .times(1);

    let client = Client::new(rp, authenticator, config());
    assert!(client
        .authenticate(&origin(), Mediation::Conditional, LoginForm::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn register_sends_the_named_attestation() {
    let mut rp = MockRelyingParty::new();
    rp.expect_reg_begin()
        .withf(|url| url.as_str() == "https://example.com/passkeys/reg-begin")
        .returning(|_| Ok(creation_options()));
    rp.expect_reg_complete()
        .withf(|url, credential, csrf_token| {
            url.as_str() == "https://example.com/passkeys/reg-complete"
                && csrf_token.as_deref() == Some("cookie-token")
                && *credential
                    == json!({
                        "id": "q83v",
                        "rawId": "q83v",
                        "type": "public-key",
                        "response": { "clientDataJSON": "e30", "attestationObject": "oA" },
                        "clientExtensionResults": {},
                        "key_name": "laptop",
                    })
        })
        .returning(|_, _, _| {
            Ok(RegistrationStatus {
                status: "OK".into(),
                message: None,
            })
        })
        .times(1);

    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_create()
        .withf(|request| {
            let public_key = request.options.get("publicKey").unwrap();
            let user_id = public_key
                .get("user")
                .and_then(|user| user.get("id"))
                .and_then(Value::as_bytes);
            user_id.map(|id| id.as_slice()) == Some(b"admin".as_slice())
                && public_key
                    .get("excludeCredentials")
                    .and_then(Value::as_list)
                    .and_then(|list| list[0].get("id"))
                    .and_then(Value::as_bytes)
                    .is_some()
        })
        .returning(|_| Ok(attestation()))
        .times(1);

    let client = Client::new(rp, authenticator, config())
        .with_cookie_header("sessionid=abc; csrftoken=cookie-token");
    let home = client.register(&origin(), "laptop").await.unwrap();

    assert_eq!(home.as_str(), BASE);
    assert!(!client.is_registering());
}

#[tokio::test]
async fn rejected_registration_carries_the_message() {
    let mut rp = MockRelyingParty::new();
    rp.expect_reg_begin().returning(|_| Ok(creation_options()));
    rp.expect_reg_complete().returning(|_, _, _| {
        Ok(RegistrationStatus {
            status: "ERR".into(),
            message: Some("Error on server, please try again later".into()),
        })
    });
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_create().returning(|_| Ok(attestation()));

    let client = Client::new(rp, authenticator, config());
    let err = client.register(&origin(), "laptop").await.unwrap_err();

    assert_eq!(
        err,
        ClientError::ServerRejection {
            status: "ERR".into(),
            message: Some("Error on server, please try again later".into()),
        }
    );
    assert!(err.offers_retry());
}

#[tokio::test]
async fn registration_needs_a_user_id() {
    let mut rp = MockRelyingParty::new();
    rp.expect_reg_begin()
        .returning(|_| Ok(json!({ "publicKey": { "challenge": "AAECAw", "user": {} } })));
    rp.expect_reg_complete().never();
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator.expect_create().never();

    let client = Client::new(rp, authenticator, config());
    assert_eq!(
        client.register(&origin(), "laptop").await,
        Err(ClientError::Decode(DecodeError::MissingField(
            "publicKey.user.id".into()
        )))
    );
}

#[tokio::test]
async fn otp_form_goes_to_the_otp_endpoint() {
    let mut rp = MockRelyingParty::new();
    rp.expect_submit_login()
        .withf(|url, fields| {
            url.as_str() == "https://example.com/passkeys/otp-login"
                && field(fields, "otp") == Some("a1b2c3")
                && field(fields, "type") == Some("otp")
                && field(fields, "csrfmiddlewaretoken") == Some("token")
        })
        .returning(|_, _| {
            Ok(LoginOutcome::Page {
                status: 200,
                body: "<form></form>".into(),
            })
        })
        .times(1);

    let mut entry = OtpEntry::default();
    let code = entry.paste("a1b2c3");
    let form = LoginForm {
        otp: code,
        ..LoginForm::new(LoginType::Password, "user@example.com")
    };

    let client = Client::new(rp, MockPlatformAuthenticator::new(), config()).with_csrf_token("token");
    let outcome = client.submit_otp(&origin(), form).await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Page { status: 200, .. }));
}

#[tokio::test]
async fn key_management_forwards_the_id() {
    let mut rp = MockRelyingParty::new();
    rp.expect_delete_key()
        .withf(|url, id, csrf_token| {
            url.path() == "/passkeys/del-key" && id == "7" && csrf_token.as_deref() == Some("token")
        })
        .returning(|_, _, _| Ok("Deleted Successfully".into()))
        .times(1);
    rp.expect_toggle_key()
        .withf(|url, id, _| url.path() == "/passkeys/toggle-key" && id == "7")
        .returning(|url, _, _| {
            Err(NetworkError::Status {
                url: url.to_string(),
                status: 403,
            })
        })
        .times(1);

    let client = Client::new(rp, MockPlatformAuthenticator::new(), config()).with_csrf_token("token");
    assert_eq!(client.delete_key("7").await.unwrap(), "Deleted Successfully");
    assert!(matches!(
        client.toggle_key("7").await,
        Err(ClientError::Network(NetworkError::Status { status: 403, .. }))
    ));
}

#[tokio::test]
async fn conditional_ui_needs_both_capabilities() {
    let mut authenticator = MockPlatformAuthenticator::new();
    authenticator
        .expect_is_user_verifying_platform_authenticator_available()
        .returning(|| true);
    authenticator
        .expect_is_conditional_mediation_available()
        .returning(|| false);
    let client = Client::new(MockRelyingParty::new(), authenticator, config());
    assert!(!client.conditional_ui_available().await);

    let client = Client::new(MockRelyingParty::new(), HeldAuthenticator::default(), config());
    assert!(client.conditional_ui_available().await);
}

#[test]
fn dom_exception_names() {
    for (name, expected) in [
        ("NotAllowedError", AuthenticatorError::NotAllowed),
        ("NotSupportedError", AuthenticatorError::NotSupported),
        ("InvalidStateError", AuthenticatorError::InvalidState),
        ("AbortError", AuthenticatorError::Aborted),
        ("SecurityError", AuthenticatorError::Security),
        ("DataError", AuthenticatorError::Unknown("DataError".into())),
    ] {
        assert_eq!(AuthenticatorError::from_dom_exception_name(name), expected);
    }
}

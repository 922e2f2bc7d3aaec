//! # Passkeys Client
//!
//! This crate defines a [`Client`] that runs the passkey ceremonies of a login page against a
//! relying party: it fetches the options from the relying party's JSON endpoints, decodes them
//! with [`passkeys_types::codec`], hands them to a [`PlatformAuthenticator`] and sends the encoded
//! answer back, either as the hidden field of the login form or as the body of the registration
//! completion endpoint.
//!
//! The client performs no cryptography. Both collaborators are traits: [`RelyingParty`], with
//! [`HttpRelyingParty`] as the default HTTP implementation, and [`PlatformAuthenticator`], which
//! the embedding application provides.
use std::sync::{Mutex, PoisonError};

use log::{debug, error, warn};
use passkeys_types::codec::{decode_creation_options, decode_request_options, encode, Value};
use url::Url;

mod abort;
mod authenticator;
pub mod config;
pub mod csrf;
mod error;
mod form;
mod gate;
mod otp;
mod relying_party;
mod secure_context;

#[cfg(test)]
mod tests;

pub use self::{
    abort::{AbortController, AbortSignal},
    authenticator::{CredentialCreation, CredentialRequest, Mediation, PlatformAuthenticator},
    config::{Config, FormConfig, Urls},
    error::{AuthenticatorError, ClientError, Flow, NetworkError},
    form::{LoginForm, LoginType},
    otp::OtpEntry,
    relying_party::{LoginOutcome, RegistrationStatus, RelyingParty},
    secure_context::is_secure_context,
};

#[cfg(feature = "reqwest")]
pub use self::relying_party::HttpRelyingParty;

#[cfg(any(test, feature = "testable"))]
pub use self::{authenticator::MockPlatformAuthenticator, relying_party::MockRelyingParty};

use self::{gate::FlightGate, secure_context::assert_secure_context};

/// The member of the registration body naming the new key.
const KEY_NAME: &str = "key_name";

/// The conditional request currently waiting on the authenticator, if any.
#[derive(Debug, Default)]
struct ConditionalSlot {
    generation: u64,
    current: Option<(u64, AbortController)>,
}

/// A `Client` runs passkey logins and registrations for one page. Users of this struct supply a
/// [`RelyingParty`], a [`PlatformAuthenticator`] and the [`Config`] describing the relying party.
///
/// At most one explicit authentication and one registration run at a time; starting another
/// fails with [`ClientError::FlowInProgress`]. A conditional authentication waits in the
/// background and is aborted by the next authentication of either kind.
pub struct Client<R, A>
where
    R: RelyingParty + Sync,
    A: PlatformAuthenticator + Sync,
{
    relying_party: R,
    authenticator: A,
    config: Config,
    csrf_token: Option<String>,
    authentication: FlightGate,
    registration: FlightGate,
    conditional: Mutex<ConditionalSlot>,
}

impl<R, A> Client<R, A>
where
    R: RelyingParty + Sync,
    A: PlatformAuthenticator + Sync,
{
    /// Create a `Client` for the relying party described by `config`.
    pub fn new(relying_party: R, authenticator: A, config: Config) -> Self {
        Self {
            relying_party,
            authenticator,
            config,
            csrf_token: None,
            authentication: FlightGate::new(Flow::Authentication),
            registration: FlightGate::new(Flow::Registration),
            conditional: Mutex::default(),
        }
    }

    /// Set the CSRF token sent with every mutating request.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Take the CSRF token from the page's `Cookie` header, see [`csrf::token_from_cookie_header`].
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.csrf_token = csrf::token_from_cookie_header(header, csrf::CSRF_COOKIE_NAME);
        self
    }

    /// Read access to the Client's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read access to the Client's `RelyingParty`.
    pub fn relying_party(&self) -> &R {
        &self.relying_party
    }

    /// Read access to the Client's `PlatformAuthenticator`.
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// The CSRF token in use, if any.
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Whether an explicit authentication is running. Submit controls stay disabled meanwhile.
    pub fn is_authenticating(&self) -> bool {
        self.authentication.is_busy()
    }

    /// Whether a registration is running.
    pub fn is_registering(&self) -> bool {
        self.registration.is_busy()
    }

    /// Whether passkeys can be offered through the username field's autofill alone, in which case
    /// a separate "login with passkey" button is redundant.
    pub async fn conditional_ui_available(&self) -> bool {
        self.authenticator
            .is_user_verifying_platform_authenticator_available()
            .await
            && self.authenticator.is_conditional_mediation_available().await
    }

    /// Abort the outstanding conditional request, if any.
    pub fn abort_conditional(&self) {
        let mut slot = self.conditional.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, controller)) = slot.current.take() {
            warn!("Aborting the pending conditional passkey request");
            controller.abort();
        }
    }

    /// Log in with a passkey from `origin`.
    ///
    /// The assertion is JSON encoded into the passkeys field of `form`, which is then posted to
    /// the passkey login endpoint. The form's kind is forced to [`LoginType::Passkey`] and it
    /// inherits the client's CSRF token unless it carries its own.
    pub async fn authenticate(
        &self,
        origin: &Url,
        mediation: Mediation,
        form: LoginForm,
    ) -> Result<LoginOutcome, ClientError> {
        let result = self.run_authentication(origin, mediation, form).await;
        match &result {
            Err(ClientError::Authenticator(AuthenticatorError::Aborted)) => {
                debug!("Passkey authentication was superseded");
            }
            Err(ClientError::FlowInProgress(_)) if mediation == Mediation::Conditional => {
                debug!("Skipping conditional passkey request during an explicit login");
            }
            Err(err) => error!("Error during login: {err}"),
            Ok(_) => debug!("Passkey login submitted"),
        }
        result
    }

    async fn run_authentication(
        &self,
        origin: &Url,
        mediation: Mediation,
        form: LoginForm,
    ) -> Result<LoginOutcome, ClientError> {
        assert_secure_context(origin, self.config.insecure_localhost_allowed())?;

        let (_permit, conditional) = match mediation {
            Mediation::Required => {
                let permit = self.authentication.try_acquire()?;
                self.abort_conditional();
                (Some(permit), None)
            }
            Mediation::Conditional => (None, Some(self.start_conditional()?)),
        };

        let outcome = self
            .authenticate_with(mediation, conditional.as_ref().map(|(_, signal)| signal), form)
            .await;

        if let Some((generation, _)) = conditional {
            self.finish_conditional(generation);
        }
        outcome
    }

    async fn authenticate_with(
        &self,
        mediation: Mediation,
        signal: Option<&AbortSignal>,
        form: LoginForm,
    ) -> Result<LoginOutcome, ClientError> {
        let url = self.config.urls.auth_begin.clone();
        debug!("Fetching passkey request options from {url}");
        let options = self.relying_party.auth_begin(url).await?;
        let options = decode_request_options(options)?;
        ensure_pending(signal)?;

        let request = CredentialRequest {
            options,
            mediation,
            signal: signal.cloned(),
        };
        let assertion = match signal {
            Some(signal) => tokio::select! {
                biased;
                () = signal.aborted() => Err(AuthenticatorError::Aborted),
                assertion = self.authenticator.get(request) => assertion,
            },
            None => self.authenticator.get(request).await,
        }?;
        ensure_pending(signal)?;

        let credential = encode(&Value::from(assertion));
        let form = LoginForm {
            kind: LoginType::Passkey,
            passkeys: Some(credential.to_string()),
            csrf_token: form.csrf_token.or_else(|| self.csrf_token.clone()),
            ..form
        };
        self.submit(form).await
    }

    /// Register the slot of a new conditional request, aborting the previous one.
    ///
    /// Refused while an explicit authentication runs, which would abort it anyway.
    fn start_conditional(&self) -> Result<(u64, AbortSignal), ClientError> {
        let mut slot = self.conditional.lock().unwrap_or_else(PoisonError::into_inner);
        if self.authentication.is_busy() {
            return Err(ClientError::FlowInProgress(Flow::Authentication));
        }
        if let Some((_, previous)) = slot.current.take() {
            warn!("A new passkey request supersedes the pending conditional one");
            previous.abort();
        }

        slot.generation += 1;
        let controller = AbortController::new();
        let signal = controller.signal();
        let generation = slot.generation;
        slot.current = Some((generation, controller));
        Ok((generation, signal))
    }

    /// Free the slot if it still belongs to the request of `generation`.
    fn finish_conditional(&self, generation: u64) {
        let mut slot = self.conditional.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(slot.current, Some((current, _)) if current == generation) {
            slot.current = None;
        }
    }

    /// Enroll a new passkey called `key_name` from `origin`.
    ///
    /// Returns the page to send the user to once the relying party stored the key.
    pub async fn register(&self, origin: &Url, key_name: &str) -> Result<Url, ClientError> {
        let result = self.run_registration(origin, key_name).await;
        match &result {
            Ok(_) => debug!("Passkey `{key_name}` registered"),
            Err(err) => error!("Registration Failed as {err}"),
        }
        result
    }

    async fn run_registration(&self, origin: &Url, key_name: &str) -> Result<Url, ClientError> {
        assert_secure_context(origin, self.config.insecure_localhost_allowed())?;
        let _permit = self.registration.try_acquire()?;

        let url = self.config.urls.reg_begin.clone();
        debug!("Fetching passkey creation options from {url}");
        let options = self.relying_party.reg_begin(url).await?;
        let options = decode_creation_options(options)?;

        let attestation = self
            .authenticator
            .create(CredentialCreation { options })
            .await?;

        let mut credential = Value::from(attestation);
        if let Some(members) = credential.as_map_mut() {
            members.insert(KEY_NAME.to_owned(), key_name.into());
        }

        let status = self
            .relying_party
            .reg_complete(
                self.config.urls.reg_complete.clone(),
                encode(&credential),
                self.csrf_token.clone(),
            )
            .await?;
        if !status.is_ok() {
            return Err(ClientError::ServerRejection {
                status: status.status,
                message: status.message,
            });
        }

        Ok(self.config.urls.home.clone())
    }

    /// Post a one-time code login form, or a request for a new code, from `origin`.
    pub async fn submit_otp(
        &self,
        origin: &Url,
        form: LoginForm,
    ) -> Result<LoginOutcome, ClientError> {
        assert_secure_context(origin, self.config.insecure_localhost_allowed())?;
        let form = LoginForm {
            kind: LoginType::Otp,
            csrf_token: form.csrf_token.or_else(|| self.csrf_token.clone()),
            ..form
        };
        self.submit(form).await.map_err(|err| {
            error!("Error during login: {err}");
            err
        })
    }

    async fn submit(&self, form: LoginForm) -> Result<LoginOutcome, ClientError> {
        let fields = form.fields(&self.config.form)?;
        let action = form.action(&self.config.urls).clone();
        debug!("Submitting the {} login form to {action}", form.kind.as_str());
        Ok(self.relying_party.submit_login(action, fields).await?)
    }

    /// Delete the stored key `id`, returning the relying party's confirmation.
    pub async fn delete_key(&self, id: &str) -> Result<String, ClientError> {
        self.relying_party
            .delete_key(
                self.config.urls.del_key.clone(),
                id.to_owned(),
                self.csrf_token.clone(),
            )
            .await
            .map_err(|err| {
                error!("Error confirming deletion: {err}");
                err.into()
            })
    }

    /// Enable or disable the stored key `id`.
    pub async fn toggle_key(&self, id: &str) -> Result<(), ClientError> {
        self.relying_party
            .toggle_key(
                self.config.urls.toggle_key.clone(),
                id.to_owned(),
                self.csrf_token.clone(),
            )
            .await
            .map_err(|err| {
                error!("Error toggling key {id}: {err}");
                err.into()
            })
    }
}

/// Fail with [`AuthenticatorError::Aborted`] once a superseded request's signal fired.
fn ensure_pending(signal: Option<&AbortSignal>) -> Result<(), AuthenticatorError> {
    match signal {
        Some(signal) if signal.is_aborted() => Err(AuthenticatorError::Aborted),
        _ => Ok(()),
    }
}

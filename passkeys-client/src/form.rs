//! The login form a [`Client`](crate::Client) submits on the user's behalf.

use url::Url;

use crate::{
    config::{FormConfig, Urls},
    ClientError,
};


/// Which login button was used, sent as the form's `type` field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoginType {
    /// Username and password.
    #[default]
    Password,
    /// An assertion from the platform authenticator.
    Passkey,
    /// A one-time code sent by email.
    Otp,
}

impl LoginType {
    /// The value of the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginType::Password => "password",
            LoginType::Passkey => "passkey",
            LoginType::Otp => "otp",
        }
    }
}

/// The values of a login form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Which button submitted the form.
    pub kind: LoginType,
    /// The account identifier.
    pub username: String,
    /// Only sent for [`LoginType::Password`].
    pub password: Option<String>,
    /// Where to go after logging in.
    pub next: Option<String>,
    /// The JSON encoded assertion, for [`LoginType::Passkey`].
    pub passkeys: Option<String>,
    /// The one-time code, for [`LoginType::Otp`].
    pub otp: Option<String>,
    /// Ask for a new one-time code instead of checking [`Self::otp`].
    pub resend_otp: bool,
    /// Echoed in the CSRF field.
    pub csrf_token: Option<String>,
}

impl LoginForm {
    /// An empty form for `username`.
    pub fn new(kind: LoginType, username: impl Into<String>) -> Self {
        Self {
            kind,
            username: username.into(),
            ..Self::default()
        }
    }

    /// Set where to go after logging in.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Set the CSRF token.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Where the form is posted.
    pub fn action<'a>(&self, urls: &'a Urls) -> &'a Url {
        match self.kind {
            LoginType::Otp => &urls.otp_login,
            LoginType::Password | LoginType::Passkey => &urls.passkey_login,
        }
    }

    /// The form-encoded pairs in document order: CSRF token, username, password, `next`, the
    /// passkeys field or the one-time code, and the login type.
    ///
    /// Fails when a passkey form is built against a layout that has no passkeys field.
    pub fn fields(&self, form: &FormConfig) -> Result<Vec<(String, String)>, ClientError> {
        let mut fields = Vec::new();
        let mut push = |name: &str, value: &str| fields.push((name.to_owned(), value.to_owned()));

        if let Some(token) = &self.csrf_token {
            push(&form.csrf, token);
        }
        push(&form.username, &self.username);
        if self.kind == LoginType::Password {
            push(&form.password, self.password.as_deref().unwrap_or_default());
        }
        if let Some(next) = &self.next {
            push(&form.next, next);
        }

        match self.kind {
            LoginType::Password => {}
            LoginType::Passkey => {
                let name = form.passkeys.as_deref().ok_or_else(|| {
                    ClientError::Configuration("the login form has no passkeys field".into())
                })?;
                push(name, self.passkeys.as_deref().unwrap_or_default());
            }
            LoginType::Otp if self.resend_otp => push(&form.resend_otp, "true"),
            LoginType::Otp => push(&form.otp, self.otp.as_deref().unwrap_or_default()),
        }
        push(&form.kind, self.kind.as_str());

        Ok(fields)
    }
}

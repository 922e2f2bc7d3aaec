use reqwest::{
    header::{ACCEPT, LOCATION},
    redirect, Client, RequestBuilder, Response,
};
use url::Url;

use super::{LoginOutcome, RegistrationStatus, RelyingParty};
use crate::{csrf::CSRF_HEADER, NetworkError};


/// A [`RelyingParty`] speaking HTTP through [`reqwest`].
///
/// The underlying client keeps the relying party's cookies, so the session that holds the
/// pending challenge survives between the `begin` and `complete` calls, and never follows
/// redirects, so a login answer can be reported as [`LoginOutcome::Redirect`].
#[derive(Debug, Clone)]
pub struct HttpRelyingParty {
    client: Client,
}

impl HttpRelyingParty {
    /// Build a backend with its own HTTP client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing HTTP client. It should not follow redirects.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(url: &Url, request: RequestBuilder) -> Result<Response, NetworkError> {
        request.send().await.map_err(|err| transport(url, err))
    }

    async fn send_checked(url: &Url, request: RequestBuilder) -> Result<Response, NetworkError> {
        let response = Self::send(url, request).await?;
        if !response.status().is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn json_body<T: serde::de::DeserializeOwned>(
        url: &Url,
        response: Response,
    ) -> Result<T, NetworkError> {
        let body = response.bytes().await.map_err(|err| transport(url, err))?;
        serde_json::from_slice(&body).map_err(|err| NetworkError::InvalidBody {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }

    fn with_csrf(request: RequestBuilder, csrf_token: Option<String>) -> RequestBuilder {
        match csrf_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    async fn get_options(&self, url: Url) -> Result<serde_json::Value, NetworkError> {
        let request = self.client.get(url.clone()).header(ACCEPT, "application/json");
        let response = Self::send_checked(&url, request).await?;
        Self::json_body(&url, response).await
    }

    fn key_request(
        request: RequestBuilder,
        id: String,
        csrf_token: Option<String>,
    ) -> RequestBuilder {
        // older deployments read the id from the query string
        let request = request
            .query(&[("id", id.as_str())])
            .json(&serde_json::json!({ "id": id }));
        Self::with_csrf(request, csrf_token)
    }
}

fn transport(url: &Url, err: reqwest::Error) -> NetworkError {
    NetworkError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait::async_trait]
impl RelyingParty for HttpRelyingParty {
    async fn auth_begin(&self, url: Url) -> Result<serde_json::Value, NetworkError> {
        self.get_options(url).await
    }

    async fn reg_begin(&self, url: Url) -> Result<serde_json::Value, NetworkError> {
        self.get_options(url).await
    }

    async fn reg_complete(
        &self,
        url: Url,
        credential: serde_json::Value,
        csrf_token: Option<String>,
    ) -> Result<RegistrationStatus, NetworkError> {
        let request = Self::with_csrf(
            self.client
                .post(url.clone())
                .header(ACCEPT, "application/json")
                .json(&credential),
            csrf_token,
        );
        let response = Self::send_checked(&url, request).await?;
        Self::json_body(&url, response).await
    }

    async fn submit_login(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> Result<LoginOutcome, NetworkError> {
        let response = Self::send(&url, self.client.post(url.clone()).form(&fields)).await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|location| location.to_str().ok())
                .ok_or_else(|| NetworkError::InvalidBody {
                    url: url.to_string(),
                    reason: format!("HTTP {} without a location", status.as_u16()),
                })?;
            let target = response.url().join(location).map_err(|err| {
                NetworkError::InvalidBody {
                    url: url.to_string(),
                    reason: format!("bad location {location}: {err}"),
                }
            })?;
            return Ok(LoginOutcome::Redirect(target));
        }

        if status.is_server_error() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| transport(&url, err))?;
        Ok(LoginOutcome::Page {
            status: status.as_u16(),
            body,
        })
    }

    async fn delete_key(
        &self,
        url: Url,
        id: String,
        csrf_token: Option<String>,
    ) -> Result<String, NetworkError> {
        let request = Self::key_request(self.client.post(url.clone()), id, csrf_token);
        let response = Self::send_checked(&url, request).await?;
        response.text().await.map_err(|err| transport(&url, err))
    }

    async fn toggle_key(
        &self,
        url: Url,
        id: String,
        csrf_token: Option<String>,
    ) -> Result<(), NetworkError> {
        let request = Self::key_request(self.client.put(url.clone()), id, csrf_token);
        Self::send_checked(&url, request).await?;
        Ok(())
    }
}

//! HTTP calls to the backend's auth endpoints.
//!
//! Every call attaches `Authorization: Bearer <token>` when a token is held.
//! Non-2xx responses are surfaced as [`ApiError::Rejected`] with whatever
//! `message` the server put in the body.
use reqwest::{Method, RequestBuilder, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}")]
    Rejected { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Response envelope shared by the three endpoints.
///
/// Session-check puts the session under `data`, login under `user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn into_session(self) -> (Option<serde_json::Value>, Option<String>) {
        (self.data.or(self.user), self.token.filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AuthApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        // No explicit timeout: the transport default applies.
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn check_session(&self, token: Option<&str>) -> Result<Envelope, ApiError> {
        let req = self.request(Method::GET, &self.config.check_path, token)?;
        Self::send(req).await
    }

    pub async fn login(
        &self,
        body: &LoginRequest<'_>,
        token: Option<&str>,
    ) -> Result<Envelope, ApiError> {
        let req = self
            .request(Method::POST, &self.config.login_path, token)?
            .json(body);
        Self::send(req).await
    }

    pub async fn logout(&self, token: Option<&str>) -> Result<Envelope, ApiError> {
        let req = self.request(Method::GET, &self.config.logout_path, token)?;
        Self::send(req).await
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint(path)?;
        let mut req = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send(req: RequestBuilder) -> Result<Envelope, ApiError> {
        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope>(&bytes)
                .ok()
                .and_then(|env| env.message)
                .filter(|m| !m.is_empty());
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // An empty 2xx body (e.g. 204 from logout) carries nothing to adopt.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::default());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

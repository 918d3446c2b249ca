//! Backend location and endpoint paths.
use thiserror::Error;
use url::Url;

pub const DEFAULT_STORAGE_KEY: &str = "token";
pub const DEFAULT_CHECK_PATH: &str = "/api/v1/check-auth";
pub const DEFAULT_LOGIN_PATH: &str = "/api/v1/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/v1/logout";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    pub check_path: String,
    pub login_path: String,
    pub logout_path: String,
    pub storage_key: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        // Validate once; endpoints are built by appending paths to the raw base.
        Url::parse(base_url)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            check_path: DEFAULT_CHECK_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        })
    }

    /// `BACKEND_URL` is required; `AUTH_STORAGE_KEY` and the `AUTH_*_PATH`
    /// overrides are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?;
        let mut config = Self::new(&base_url)?;

        if let Some(key) = non_empty_env("AUTH_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(path) = non_empty_env("AUTH_CHECK_PATH") {
            config.check_path = path;
        }
        if let Some(path) = non_empty_env("AUTH_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(path) = non_empty_env("AUTH_LOGOUT_PATH") {
            config.logout_path = path;
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", self.base_url, path))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

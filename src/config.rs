/*
 * Responsibility
 * - 環境変数や設定の読み込み (SECRET_KEY, cookie 名, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 検証用 secret はここで読み、AuthService の生成時に明示的に渡す
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Secret material is kept out of `Debug`.
#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HS256 secret shared with the token issuer
    pub secret_key: String,
    pub token_cookie_name: String,
    pub access_token_leeway_seconds: u64,
    pub admin_role: String,

    pub request_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("token_cookie_name", &self.token_cookie_name)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .field("admin_role", &self.admin_role)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish_non_exhaustive()
    }
}

pub const DEFAULT_TOKEN_COOKIE: &str = "token";
pub const DEFAULT_ADMIN_ROLE: &str = "admin";

impl Config {
    /// Development defaults around an explicit secret. Used by tests and embedders.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            secret_key: secret_key.into(),
            token_cookie_name: DEFAULT_TOKEN_COOKIE.to_string(),
            access_token_leeway_seconds: 0,
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            request_timeout_seconds: 30,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let secret_key =
            std::env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?;
        if secret_key.trim().is_empty() {
            return Err(ConfigError::Invalid("SECRET_KEY"));
        }

        let token_cookie_name = std::env::var("AUTH_COOKIE_NAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_COOKIE.to_string());

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let admin_role = std::env::var("ADMIN_ROLE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string());

        let request_timeout_seconds = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(30);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            secret_key,
            token_cookie_name,
            access_token_leeway_seconds,
            admin_role,
            request_timeout_seconds,
        })
    }
}

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Failures of the authentication gate. All of them end the request with 401.
///
/// Bad signatures, malformed tokens and expiry all share `InvalidOrExpired`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not authenticated, token missing")]
    MissingCredential,
    #[error("Invalid or expired token")]
    InvalidOrExpired(#[source] jsonwebtoken::errors::Error),
    #[error("Invalid token or missing userId")]
    MissingSubject,
}

impl AuthError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidOrExpired(_) => "invalid_or_expired",
            Self::MissingSubject => "missing_subject",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidOrExpired(e)
    }
}

#[derive(Debug, Error)]
pub enum AuthConfigError {
    #[error("verification secret must not be empty")]
    EmptySecret,
}

/// Access token (JWT, HS256) claims.
///
/// NOTE:
/// - The issuer writes the subject as `userId`; `sub` is accepted as a fallback.
/// - Both are kept as `Value` because some issuers emit numeric ids.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default, rename = "userId")]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub sub: Option<serde_json::Value>,

    #[serde(default)]
    pub role: Option<serde_json::Value>,

    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
}

impl AccessTokenClaims {
    pub fn subject(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .and_then(subject_from_value)
            .or_else(|| self.sub.as_ref().and_then(subject_from_value))
    }

    pub fn role(&self) -> Option<String> {
        self.role
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// Empty strings, zero, null and booleans do not identify anyone.
fn subject_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Verified claims, in the shape the rest of the app uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub subject: String,
    pub role: Option<String>,
}

/// HS256 access-token verifier.
///
/// - The secret is injected at construction and never printed via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(secret: &str, leeway_seconds: u64) -> Result<Self, AuthConfigError> {
        if secret.is_empty() {
            return Err(AuthConfigError::EmptySecret);
        }

        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        // Tokens carry no audience; an unexpected `aud` must not reject them.
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify signature + `exp` and decode the claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify, then require a subject. This is the entry-point for the gate.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AuthError> {
        let claims = self.verify(token)?;

        let subject = claims.subject().ok_or(AuthError::MissingSubject)?;

        Ok(VerifiedAccessToken {
            subject,
            role: claims.role(),
        })
    }
}

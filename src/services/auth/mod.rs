pub mod access_jwt;
pub mod factory;
pub mod fingerprint;

pub use access_jwt::{AuthError, AuthService, VerifiedAccessToken};
pub use factory::build_auth_service;
pub use fingerprint::token_fingerprint;

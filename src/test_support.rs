//! Helpers shared by unit tests: token minting and response decoding.
use axum::{body::Body, http::Response};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};

pub const SECRET: &str = "test-secret-key";

pub fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

pub fn mint(secret: &str, claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test token")
}

pub fn token_for(user_id: &str, role: &str) -> String {
    mint(
        SECRET,
        serde_json::json!({ "userId": user_id, "role": role, "exp": now() + 600 }),
    )
}

pub async fn json_body(res: Response<Body>) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

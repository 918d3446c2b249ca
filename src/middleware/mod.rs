/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 認証 gate / role gate
 * - cors / http: 横断的な HTTP 層
 */
pub mod auth;
pub mod cors;
pub mod http;

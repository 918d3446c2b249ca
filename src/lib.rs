/*
 * Responsibility
 * - crate のモジュール構成
 * - main.rs と tests から同じ Router 組み立てを使えるように lib として公開する
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub mod access;
pub mod role;

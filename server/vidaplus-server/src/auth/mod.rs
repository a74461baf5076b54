//! Password hashing and access tokens

pub mod password;
pub mod tokens;

pub use password::PasswordService;
pub use tokens::{TokenClaims, TokenService};

//! Authentication primitives
//!
//! - `context`: the request-scoped identity passed into services
//! - `password`: Argon2id hashing
//! - `token`: JWT issue/verify
//! - `blacklist`: tokens revoked before their expiry

pub mod blacklist;
pub mod context;
pub mod password;
pub mod token;

pub use blacklist::TokenBlacklist;
pub use context::{extract_bearer, AuthContext};
pub use token::{Claims, IssuedToken, TokenService};

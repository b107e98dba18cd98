//! # gatehouse-auth
//!
//! Credential and authorization primitives for Gatehouse.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and the minimum-length policy
//! - `jwt`: session token issuance and verification
//! - `rbac`: the authorization engine and the permission tree builder

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenSubject};
pub use password::{PasswordHasher, PasswordPolicy};
pub use rbac::{AuthorizationEngine, Decision, build_tree};

//! Account access: credentials, secret hashing and session tokens

pub mod credential;
pub mod hasher;
pub mod service;
pub mod token;

pub use credential::{AccountDescription, Credential, CredentialRules};
pub use hasher::{Argon2Hasher, SecretHasher, hash_blocking, matches_blocking};
pub use service::{AccessService, AccessServiceBuilder};
pub use token::{Claims, TokenIssuer};

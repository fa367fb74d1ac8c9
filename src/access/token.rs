//! Session tokens (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::credential::AccountDescription;
use crate::core_types::AccountId;
use crate::errors::BankError;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // account id
    pub tax_id: String,
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn account_id(&self) -> AccountId {
        AccountId::from(self.sub.as_str())
    }
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, description: &AccountDescription) -> Result<String, BankError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| BankError::Token("token expiry out of range".into()))?;

        let claims = Claims {
            sub: description.account_id.to_string(),
            tax_id: description.tax_id.clone(),
            name: description.name.clone(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| BankError::Token(e.to_string()))
    }

    /// Decode and check signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, BankError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                BankError::InvalidCredentials
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> AccountDescription {
        AccountDescription {
            account_id: AccountId::generate(),
            tax_id: "00000000003".into(),
            name: "Jon Due".into(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new(b"test-secret", 3600);
        let desc = description();
        let token = issuer.issue(&desc).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.account_id(), desc.account_id);
        assert_eq!(claims.tax_id, desc.tax_id);
        assert_eq!(claims.name, desc.name);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new(b"one", 3600).issue(&description()).unwrap();
        assert_eq!(
            TokenIssuer::new(b"two", 3600).verify(&token),
            Err(BankError::InvalidCredentials)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", 3600);
        assert_eq!(issuer.verify("abc.def.ghi"), Err(BankError::InvalidCredentials));
    }

    #[test]
    fn test_expired_rejected() {
        let issuer = TokenIssuer::new(b"test-secret", 3600);
        let past = Utc::now().timestamp() as usize - 10_000;
        let claims = Claims {
            sub: "x".into(),
            tax_id: "00000000003".into(),
            name: "n".into(),
            exp: past,
            iat: past - 10,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap();
        assert_eq!(issuer.verify(&token), Err(BankError::InvalidCredentials));
    }
}

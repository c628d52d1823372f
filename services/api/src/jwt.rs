//! JWT verification for the API service
//!
//! Tokens are issued by the external auth provider and verified here with the
//! RS256 public key only; this service never signs anything. The role claim
//! is numeric, but some issuers serialize it as a JSON string — that is
//! normalized once, inside the `Role` deserializer.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Role;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Public key for verifying tokens
    pub public_key: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PUBLIC_KEY`: Public key for verifying tokens (PEM format) or
    ///   path to a public key file
    pub fn from_env() -> Result<Self> {
        let public_key = std::env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

        // If the public key looks like a file path, read from file (try CWD, then project root)
        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig { public_key })
    }
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Account role; accepts a JSON number or a numeric string
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Verification-only token service
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Initialize a new token verifier
    pub fn new(config: &JwtConfig) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
        validation.validate_exp = true;

        Ok(TokenVerifier {
            decoding_key,
            validation,
        })
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_accept_numeric_string_role() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"8c2df548-1f9e-4f7b-a3e2-47fbd1f98e10","role":"1","iat":1,"exp":2}"#,
        )
        .unwrap();
        assert_eq!(claims.role, Role::Owner);

        let claims: Claims = serde_json::from_str(
            r#"{"sub":"8c2df548-1f9e-4f7b-a3e2-47fbd1f98e10","role":3,"iat":1,"exp":2}"#,
        )
        .unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_claims_reject_non_role_values() {
        let result = serde_json::from_str::<Claims>(
            r#"{"sub":"8c2df548-1f9e-4f7b-a3e2-47fbd1f98e10","role":"owner","iat":1,"exp":2}"#,
        );
        assert!(result.is_err());
    }
}

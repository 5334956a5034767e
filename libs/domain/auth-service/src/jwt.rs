// [libs/domain/auth-service/src/jwt.rs]
use crate::errors::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skyclaim_claim_models::{CustomerId, Role};
use std::str::FromStr;

const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: Role,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Firma y verifica el access token. El algoritmo se fija en HS256 en
/// ambas direcciones; `decode` nunca confía en un `alg` propuesto por el
/// encabezado del token entrante.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue_access_token(&self, customer_id: CustomerId, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: customer_id.0.to_string(),
            role,
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<(CustomerId, Role), AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        let decoded = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;
        if decoded.claims.token_type != "access" {
            return Err(AuthError::TokenInvalid);
        }
        let customer_id =
            CustomerId::from_str(&decoded.claims.sub).map_err(|_| AuthError::TokenInvalid)?;
        Ok((customer_id, decoded.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_issues_and_verifies() {
        let codec = JwtCodec::new(b"super-secret-test-key-at-least-32-bytes-long");
        let id = CustomerId::new();
        let token = codec.issue_access_token(id, Role::Customer).unwrap();
        let (recovered_id, role) = codec.verify_access_token(&token).unwrap();
        assert_eq!(recovered_id, id);
        assert_eq!(role, Role::Customer);
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let codec_a = JwtCodec::new(b"secret-a-is-at-least-thirty-two-bytes-long");
        let codec_b = JwtCodec::new(b"secret-b-is-at-least-thirty-two-bytes-long");
        let token = codec_a.issue_access_token(CustomerId::new(), Role::Customer).unwrap();
        assert!(codec_b.verify_access_token(&token).is_err());
    }
}

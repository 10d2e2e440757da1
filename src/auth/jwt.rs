use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{Claims, TOKEN_ISSUER};
use crate::database::schema::types::UserRole;
use crate::error::Result;
use uuid::Uuid;

/// HS256 token issuing and verification
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiration_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiration_secs,
        }
    }

    pub fn expiration_secs(&self) -> i64 {
        self.expiration_secs
    }

    pub fn encode_token(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Issue a token for a user with the configured lifetime
    pub fn issue(&self, user_id: Uuid, email: &str, role: UserRole) -> Result<String> {
        let claims = Claims::new(user_id, email.to_string(), role, self.expiration_secs);
        self.encode_token(&claims)
    }
}

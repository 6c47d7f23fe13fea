use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tokens are stateless: there is no server-side revocation list, so logout
/// is purely client-side and issued tokens stay valid until they expire.
const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub enum Error {
    Invalid(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Invalid(err)
    }
}

pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, Error> {
        let exp = (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp();
        Ok(encode(
            &Header::default(),
            &Claims { sub: user_id, exp },
            &self.encoding,
        )?)
    }

    /// Verifies signature and expiry, returning the embedded user id.
    pub fn resolve(&self, token: &str) -> Result<i64, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.sub)
    }
}

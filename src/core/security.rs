use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::{active_state::ActiveState, user::User},
    repository::access_token::get_access_token_by_token,
    settings::Config,
};

use super::{
    error::{ServiceError, ServiceResult},
    utils::date_to_string,
};

pub const TOKEN_COOKIE: &str = "token";
const REFRESH_TOKEN_LENGTH: usize = 100;

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Access token payload: the user without its password.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub birthdate: String,
    pub active: ActiveState,
    pub role_id: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, config: &Config) -> Self {
        let now = Local::now();
        let exp = (now + Duration::minutes(config.jwt_exp as i64)).timestamp();

        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            gender: user.gender.clone(),
            birthdate: date_to_string(user.birthdate),
            active: user.active,
            role_id: user.role_id.to_string(),
            // two tokens minted in the same second must still differ
            jti: Uuid::now_v7().to_string(),
            iat: now.timestamp(),
            exp,
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user, config);
    encode_token(&claims, &config.jwt_secret)
}

/// Opaque refresh token, its only proof of validity is the stored row.
pub fn generate_refresh_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Identity of the caller of a protected endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role_id: Uuid,
    pub claims: Claims,
}

/// Resolve the caller behind the `token` cookie.
///
/// The token must still be present in the token store (not logged out) and
/// carry a valid signature and expiry.
pub async fn authorize(
    tx: &mut Transaction<'_, Postgres>,
    config: &Config,
    token: Option<&str>,
) -> ServiceResult<AuthUser> {
    let token = match token {
        Some(val) if !val.is_empty() => val,
        _ => return Err(ServiceError::unauthorized()),
    };
    if get_access_token_by_token(tx, token).await?.is_none() {
        return Err(ServiceError::unauthorized());
    }
    let claims = match decode_token(token, &config.jwt_secret) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("reject access token: {}", err);
            return Err(ServiceError::invalid_token());
        }
    };
    let id = Uuid::parse_str(&claims.id).map_err(|_| ServiceError::invalid_token())?;
    let role_id = Uuid::parse_str(&claims.role_id).map_err(|_| ServiceError::invalid_token())?;
    Ok(AuthUser {
        id,
        role_id,
        claims,
    })
}

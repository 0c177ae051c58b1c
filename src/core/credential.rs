use sqlx::{Postgres, Transaction};

use crate::{model::user::User, repository::user::get_user_by_email};

use super::{
    error::{ServiceError, ServiceResult},
    security::verify_hash_password,
};

/// Check an email/password pair against the stored hash.
///
/// Unknown email and wrong password fail with the same error so a caller
/// cannot tell which accounts exist. An inactive account is refused before
/// the password is compared.
pub async fn verify_credentials(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    let user = match get_user_by_email(tx, email).await? {
        Some(val) => val,
        None => return Err(ServiceError::InvalidCredentials),
    };
    if !user.active.is_active() {
        return Err(ServiceError::AccountInactive);
    }
    let is_valid = verify_hash_password(password, &user.password)
        .map_err(|err| anyhow::anyhow!("verify password hash: {}", err))?;
    if !is_valid {
        return Err(ServiceError::InvalidCredentials);
    }
    Ok(user)
}

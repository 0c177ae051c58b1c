use chrono::{DateTime, Duration, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::{access_token::AccessToken, user::User},
    repository::{
        access_token::{
            create_access_token, delete_access_token_by_refresh_token,
            delete_access_token_by_token, delete_access_token_by_user,
            delete_access_token_older_than, get_access_token_by_refresh_token,
        },
        user::get_user_by_id,
    },
    settings::Config,
};

use super::{
    credential::verify_credentials,
    error::{ServiceError, ServiceResult},
    security::{generate_refresh_token, generate_token_from_user},
};

/// Token pair handed to a client together with the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Mint a new access/refresh pair for `user` and store it.
pub async fn issue_session(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
    config: &Config,
) -> ServiceResult<Session> {
    let token = generate_token_from_user(user, config)?;
    let refresh_token = generate_refresh_token();
    let access_token = AccessToken {
        id: Uuid::now_v7(),
        user_id: user.id,
        token,
        refresh_token,
        created_at: Local::now().fixed_offset(),
    };
    create_access_token(tx, &access_token).await?;
    tracing::debug!("issued session {} for user {}", access_token.id, user.id);
    Ok(Session {
        token: access_token.token,
        refresh_token: access_token.refresh_token,
        user: user.clone(),
    })
}

pub async fn login(
    tx: &mut Transaction<'_, Postgres>,
    config: &Config,
    email: &str,
    password: &str,
) -> ServiceResult<Session> {
    let user = verify_credentials(tx, email, password).await?;
    issue_session(tx, &user, config).await
}

fn is_expired(created_at: DateTime<FixedOffset>, ttl_days: Option<u32>) -> bool {
    match ttl_days {
        Some(days) => created_at + Duration::days(days as i64) < Local::now().fixed_offset(),
        None => false,
    }
}

/// Exchange a refresh token for a new pair.
///
/// The presented refresh token is deleted in the same transaction that
/// stores the new pair, so it can be exchanged only once.
pub async fn refresh(
    tx: &mut Transaction<'_, Postgres>,
    config: &Config,
    refresh_token: Option<&str>,
) -> ServiceResult<Session> {
    let refresh_token = match refresh_token {
        Some(val) if !val.is_empty() => val,
        _ => return Err(ServiceError::refresh_token_not_found()),
    };
    let access_token = match get_access_token_by_refresh_token(tx, refresh_token).await? {
        Some(val) => val,
        None => return Err(ServiceError::refresh_token_not_found()),
    };
    if is_expired(access_token.created_at, config.refresh_token_ttl_days) {
        return Err(ServiceError::refresh_token_not_found());
    }
    let user = match get_user_by_id(tx, &access_token.user_id).await? {
        Some(val) => val,
        None => return Err(ServiceError::refresh_token_not_found()),
    };
    let session = issue_session(tx, &user, config).await?;
    delete_access_token_by_refresh_token(tx, refresh_token).await?;
    Ok(session)
}

/// Revoke the session of an access token. Unknown tokens are ignored.
pub async fn logout(tx: &mut Transaction<'_, Postgres>, token: &str) -> ServiceResult<()> {
    let removed = delete_access_token_by_token(tx, token).await?;
    if removed == 0 {
        tracing::debug!("logout with unknown token");
    }
    Ok(())
}

/// Revoke every session of a user.
pub async fn revoke_user_sessions(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> ServiceResult<u64> {
    Ok(delete_access_token_by_user(tx, user_id).await?)
}

/// Delete sessions created more than `days` days ago.
pub async fn prune_sessions(tx: &mut Transaction<'_, Postgres>, days: u32) -> ServiceResult<u64> {
    let threshold = Local::now().fixed_offset() - Duration::days(days as i64);
    Ok(delete_access_token_older_than(tx, &threshold).await?)
}

use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::access_token::{AccessToken, TABLE_NAME},
};

pub async fn create_access_token(
    tx: &mut Transaction<'_, Postgres>,
    access_token: &AccessToken,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, token, refresh_token, created_at)
    VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(access_token.id)
    .bind(access_token.user_id)
    .bind(&access_token.token)
    .bind(&access_token.refresh_token)
    .bind(access_token.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get_access_token_by_token(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> anyhow::Result<Option<AccessToken>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(token.to_string())];
    let filters: Vec<String> = vec!["token = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<AccessToken>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_access_token_by_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: &str,
) -> anyhow::Result<Option<AccessToken>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(refresh_token.to_string())];
    let filters: Vec<String> = vec!["refresh_token = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<AccessToken>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn delete_access_token_by_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: &str,
) -> anyhow::Result<u64> {
    let res = sqlx::query(format!("DELETE FROM {} WHERE refresh_token = $1", TABLE_NAME).as_str())
        .bind(refresh_token)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_access_token_by_token(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> anyhow::Result<u64> {
    let res = sqlx::query(format!("DELETE FROM {} WHERE token = $1", TABLE_NAME).as_str())
        .bind(token)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_access_token_by_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<u64> {
    let res = sqlx::query(format!("DELETE FROM {} WHERE user_id = $1", TABLE_NAME).as_str())
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_access_token_older_than(
    tx: &mut Transaction<'_, Postgres>,
    threshold: &DateTime<FixedOffset>,
) -> anyhow::Result<u64> {
    let res = sqlx::query(format!("DELETE FROM {} WHERE created_at < $1", TABLE_NAME).as_str())
        .bind(threshold)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected())
}

use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, order_by_clause, query_builder, SqlxBinds},
    model::{
        active_state::ActiveState,
        user::{User, TABLE_NAME},
    },
};

pub const USER_ORDER_FIELDS: [&str; 6] = [
    "name",
    "email",
    "gender",
    "birthdate",
    "created_at",
    "updated_at",
];

pub async fn paginate_user(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    order_field: Option<String>,
    order_dir: Option<String>,
) -> anyhow::Result<(Vec<User>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(name ILIKE ${} OR email ILIKE ${})",
            binds.len(),
            binds.len()
        ));
    }

    let limit = page_size;
    let offset = (page - 1) * page_size;
    let order_by = order_by_clause(
        &USER_ORDER_FIELDS,
        order_field.as_deref(),
        order_dir.as_deref(),
        "created_at",
    );
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec![order_by, "id ASC".to_string()],
        Some(limit),
        Some(offset),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<User>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_user_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(email.to_string())];
    let filters: Vec<String> = vec!["email = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn count_user_by_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<i64> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*role_id)];
    let filters: Vec<String> = vec!["role_id = $1".to_string()];
    let stmt = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );
    let q = binds_query_as::<(i64,)>(&stmt, binds);
    let count = q.fetch_one(&mut **tx).await?;
    Ok(count.0)
}

pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, name, email, password, gender, birthdate, active, role_id,
        created_by, created_at, updated_by, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.gender)
    .bind(user.birthdate)
    .bind(user.active)
    .bind(user.role_id)
    .bind(user.created_by)
    .bind(user.created_at)
    .bind(user.updated_by)
    .bind(user.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn update_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    name: String,
    email: String,
    gender: String,
    birthdate: NaiveDate,
    role_id: Uuid,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.name = name;
    user.email = email;
    user.gender = gender;
    user.birthdate = birthdate;
    user.role_id = role_id;
    user.updated_by = Some(*request_user);
    user.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, email = $2, gender = $3, birthdate = $4, role_id = $5,
        updated_by = $6, updated_at = $7
        WHERE id = $8"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.gender)
    .bind(user.birthdate)
    .bind(user.role_id)
    .bind(user.updated_by)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_user_profile(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    name: String,
    gender: String,
    birthdate: NaiveDate,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.name = name;
    user.gender = gender;
    user.birthdate = birthdate;
    user.updated_by = Some(user.id);
    user.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, gender = $2, birthdate = $3, updated_by = $4, updated_at = $5
        WHERE id = $6"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.name)
    .bind(&user.gender)
    .bind(user.birthdate)
    .bind(user.updated_by)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Replace the password hash and deactivate the account.
pub async fn reset_user_password(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    password_hash: String,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.password = password_hash;
    user.active = ActiveState::Inactive;
    user.updated_by = Some(*request_user);
    user.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET password = $1, active = $2, updated_by = $3, updated_at = $4
        WHERE id = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.password)
    .bind(user.active)
    .bind(user.updated_by)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

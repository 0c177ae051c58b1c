use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, order_by_clause, query_builder, SqlxBinds},
    model::role::{Role, TABLE_NAME},
};

pub const ROLE_ORDER_FIELDS: [&str; 3] = ["name", "created_at", "updated_at"];

pub async fn paginate_role(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    order_field: Option<String>,
    order_dir: Option<String>,
) -> anyhow::Result<(Vec<Role>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("name ILIKE ${}", binds.len()));
    }

    let limit = page_size;
    let offset = (page - 1) * page_size;
    let order_by = order_by_clause(
        &ROLE_ORDER_FIELDS,
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

    let q = binds_query_as::<Role>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_role_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Role>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<Role>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<Option<Role>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(name.to_string())];
    let filters: Vec<String> = vec!["name = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<Role>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_role(
    tx: &mut Transaction<'_, Postgres>,
    name: String,
    request_user: Option<Uuid>,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<Role> {
    let new_role = Role {
        id: Uuid::now_v7(),
        name,
        created_by: request_user,
        created_at: *now,
        updated_by: request_user,
        updated_at: *now,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, created_by, created_at, updated_by, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_role.id)
    .bind(&new_role.name)
    .bind(new_role.created_by)
    .bind(new_role.created_at)
    .bind(new_role.updated_by)
    .bind(new_role.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_role)
}

pub async fn update_role(
    tx: &mut Transaction<'_, Postgres>,
    role: &mut Role,
    name: String,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    role.name = name;
    role.updated_by = Some(*request_user);
    role.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, updated_by = $2, updated_at = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&role.name)
    .bind(role.updated_by)
    .bind(role.updated_at)
    .bind(role.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete, the grants of the role go with it.
pub async fn delete_role(tx: &mut Transaction<'_, Postgres>, id: &Uuid) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        active_state::ActiveState,
        menu::{Menu, TABLE_NAME},
    },
};

fn menu_order() -> Vec<String> {
    vec!["order_number ASC".to_string(), "id ASC".to_string()]
}

/// Every menu ordered (order_number, id).
pub async fn get_all_menu(
    tx: &mut Transaction<'_, Postgres>,
    active_only: bool,
) -> anyhow::Result<Vec<Menu>> {
    let mut filters: Vec<String> = vec![];
    if active_only {
        filters.push("active = 'Active'".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, menu_order(), None, None);
    let q = binds_query_as::<Menu>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// Direct children of `parent_id`, the root group when `None`.
pub async fn get_menu_children(
    tx: &mut Transaction<'_, Postgres>,
    parent_id: Option<Uuid>,
    active_only: bool,
) -> anyhow::Result<Vec<Menu>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];
    match parent_id {
        Some(id) => {
            binds.push(SqlxBinds::Uuid(id));
            filters.push(format!("menu_id = ${}", binds.len()));
        }
        None => filters.push("menu_id IS NULL".to_string()),
    }
    if active_only {
        filters.push("active = 'Active'".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, menu_order(), None, None);
    let q = binds_query_as::<Menu>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_menu_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Menu>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<Menu>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_menu_by_key(
    tx: &mut Transaction<'_, Postgres>,
    key_menu: &str,
) -> anyhow::Result<Option<Menu>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(key_menu.to_string())];
    let filters: Vec<String> = vec!["key_menu = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<Menu>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_menus_by_ids(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> anyhow::Result<Vec<Menu>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["id = ANY($1)".to_string()],
        menu_order(),
        None,
        None,
    );
    let data: Vec<Menu> = sqlx::query_as(&stmt)
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

/// Highest `order_number` in the group under `parent_id`.
pub async fn get_last_order_number(
    tx: &mut Transaction<'_, Postgres>,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Option<i32>> {
    let stmt = query_builder(
        Some("MAX(order_number)".to_string()),
        TABLE_NAME,
        &["menu_id IS NOT DISTINCT FROM $1".to_string()],
        vec![],
        None,
        None,
    );
    let res: (Option<i32>,) = sqlx::query_as(&stmt)
        .bind(parent_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(res.0)
}

pub async fn create_menu(tx: &mut Transaction<'_, Postgres>, menu: &Menu) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, key_menu, name, url, menu_id, order_number, active,
    created_by, created_at, updated_by, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu.id)
    .bind(&menu.key_menu)
    .bind(&menu.name)
    .bind(&menu.url)
    .bind(menu.menu_id)
    .bind(menu.order_number)
    .bind(menu.active)
    .bind(menu.created_by)
    .bind(menu.created_at)
    .bind(menu.updated_by)
    .bind(menu.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_menu(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    key_menu: String,
    name: String,
    url: Option<String>,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu.key_menu = key_menu;
    menu.name = name;
    menu.url = url;
    menu.updated_by = Some(*request_user);
    menu.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET key_menu = $1, name = $2, url = $3, updated_by = $4, updated_at = $5
        WHERE id = $6"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&menu.key_menu)
    .bind(&menu.name)
    .bind(&menu.url)
    .bind(menu.updated_by)
    .bind(menu.updated_at)
    .bind(menu.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_menu_order_number(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    order_number: i32,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET order_number = $1, updated_by = $2, updated_at = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(order_number)
    .bind(request_user)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_menu_parent(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    parent_id: Option<Uuid>,
    order_number: i32,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu.menu_id = parent_id;
    menu.order_number = order_number;
    menu.updated_by = Some(*request_user);
    menu.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET menu_id = $1, order_number = $2, updated_by = $3, updated_at = $4
        WHERE id = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu.menu_id)
    .bind(menu.order_number)
    .bind(menu.updated_by)
    .bind(menu.updated_at)
    .bind(menu.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn set_menu_active(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    active: ActiveState,
    request_user: &Uuid,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    menu.active = active;
    menu.updated_by = Some(*request_user);
    menu.updated_at = *now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET active = $1, updated_by = $2, updated_at = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(menu.active)
    .bind(menu.updated_by)
    .bind(menu.updated_at)
    .bind(menu.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

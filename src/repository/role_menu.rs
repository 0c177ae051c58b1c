use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::role_menu::{RoleMenu, TABLE_NAME},
};

pub async fn get_role_menu(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    menu_id: &Uuid,
) -> anyhow::Result<Option<RoleMenu>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*role_id), SqlxBinds::Uuid(*menu_id)];
    let filters: Vec<String> = vec!["role_id = $1".to_string(), "menu_id = $2".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<RoleMenu>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_menu_by_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<Vec<RoleMenu>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*role_id)];
    let filters: Vec<String> = vec!["role_id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let q = binds_query_as::<RoleMenu>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// Insert the grant or overwrite every flag of the existing one.
pub async fn upsert_role_menu(
    tx: &mut Transaction<'_, Postgres>,
    role_menu: &RoleMenu,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (role_id, menu_id, access, "create", "update", "delete",
    approval, approval_2, approval_3)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (role_id, menu_id) DO UPDATE
    SET access = EXCLUDED.access, "create" = EXCLUDED."create",
    "update" = EXCLUDED."update", "delete" = EXCLUDED."delete",
    approval = EXCLUDED.approval, approval_2 = EXCLUDED.approval_2,
    approval_3 = EXCLUDED.approval_3"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_menu.role_id)
    .bind(role_menu.menu_id)
    .bind(role_menu.access)
    .bind(role_menu.create)
    .bind(role_menu.update)
    .bind(role_menu.delete)
    .bind(role_menu.approval)
    .bind(role_menu.approval_2)
    .bind(role_menu.approval_3)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

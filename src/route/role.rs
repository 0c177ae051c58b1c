use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{
    param::{Cookie, Path, Query},
    payload::Json,
    OpenApi, Tags,
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        error::ServiceError,
        security::authorize,
        utils::{datetime_to_string, parse_path_id},
    },
    model::role::Role,
    repository::{
        role::{
            create_role, delete_role, get_role_by_id, get_role_by_name, paginate_role, update_role,
        },
        user::{count_user_by_role, get_user_by_id},
    },
    schema::{
        common::{AuditUser, ErrorResponses, PaginateResponse},
        role::{
            PaginateRoleResponses, RoleCreateResponses, RoleDataResponse, RoleDeleteResponses,
            RoleDetailResponses, RoleRequest, RoleResponse, RoleUpdateResponses,
        },
    },
    AppState,
};

pub const ROLE_NOT_FOUND: &str = "The role does not exist!";
pub const ROLE_NAME_TAKEN: &str = "The name cannot be the same!";
pub const ROLE_IN_USE: &str = "The role couldn't be deleted, because this role is relation with user!";

#[derive(Tags)]
enum ApiRoleTags {
    Role,
}

pub struct ApiRole;

async fn audit_user(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
) -> Result<Option<AuditUser>, ErrorResponses> {
    let Some(id) = id else {
        return Ok(None);
    };
    let user = get_user_by_id(tx, &id).await?;
    Ok(user.map(|x| AuditUser {
        id: x.id.to_string(),
        name: x.name,
    }))
}

async fn role_response(
    tx: &mut Transaction<'_, Postgres>,
    role: Role,
) -> Result<RoleResponse, ErrorResponses> {
    let created_by = audit_user(tx, role.created_by).await?;
    let updated_by = audit_user(tx, role.updated_by).await?;
    Ok(RoleResponse {
        id: role.id.to_string(),
        name: role.name,
        created_by,
        created_at: datetime_to_string(role.created_at),
        updated_by,
        updated_at: datetime_to_string(role.updated_at),
    })
}

async fn find_role(tx: &mut Transaction<'_, Postgres>, id: &str) -> Result<Role, ErrorResponses> {
    let id = parse_path_id(id, ROLE_NOT_FOUND)?;
    match get_role_by_id(tx, &id).await? {
        Some(val) => Ok(val),
        None => Err(ServiceError::not_found(ROLE_NOT_FOUND).into()),
    }
}

#[OpenApi]
impl ApiRole {
    #[oai(path = "/role", method = "get", tag = "ApiRoleTags::Role")]
    async fn role_index(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(order_field): Query<Option<String>>,
        Query(order_dir): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<PaginateRoleResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_index", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(10).clamp(1, 100);
        let (data, counts, page_count) =
            paginate_role(&mut tx, page, page_size, search, order_field, order_dir).await?;

        let mut results: Vec<RoleResponse> = vec![];
        for item in data {
            results.push(role_response(&mut tx, item).await?);
        }

        Ok(PaginateRoleResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results,
        })))
    }

    #[oai(path = "/role/:id", method = "get", tag = "ApiRoleTags::Role")]
    async fn role_detail(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleDetailResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_detail", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role = find_role(&mut tx, &id).await?;
        Ok(RoleDetailResponses::Ok(Json(
            role_response(&mut tx, role).await?,
        )))
    }

    #[oai(path = "/role", method = "post", tag = "ApiRoleTags::Role")]
    async fn role_store(
        &self,
        json: Json<RoleRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleCreateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_store", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let name = json.validate().map_err(ErrorResponses::bad_request)?;
        if get_role_by_name(&mut tx, &name).await?.is_some() {
            return Err(ServiceError::conflict(ROLE_NAME_TAKEN).into());
        }
        let now = Local::now().fixed_offset();
        let role = create_role(&mut tx, name, Some(request_user.id), &now).await?;
        let data = role_response(&mut tx, role).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_store", "commit transaction", &err)
        })?;
        Ok(RoleCreateResponses::Ok(Json(RoleDataResponse {
            message: "Success to add data role.".to_string(),
            data,
        })))
    }

    #[oai(path = "/role/:id", method = "patch", tag = "ApiRoleTags::Role")]
    async fn role_update(
        &self,
        Path(id): Path<String>,
        json: Json<RoleRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_update", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut role = find_role(&mut tx, &id).await?;
        let name = json.validate().map_err(ErrorResponses::bad_request)?;
        if let Some(other) = get_role_by_name(&mut tx, &name).await? {
            if other.id != role.id {
                return Err(ServiceError::conflict(ROLE_NAME_TAKEN).into());
            }
        }
        let now = Local::now().fixed_offset();
        update_role(&mut tx, &mut role, name, &request_user.id, &now).await?;
        let data = role_response(&mut tx, role).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_update", "commit transaction", &err)
        })?;
        Ok(RoleUpdateResponses::Ok(Json(RoleDataResponse {
            message: "Success to update data role.".to_string(),
            data,
        })))
    }

    #[oai(path = "/role/:id", method = "delete", tag = "ApiRoleTags::Role")]
    async fn role_delete(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleDeleteResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_delete", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role = find_role(&mut tx, &id).await?;
        if count_user_by_role(&mut tx, &role.id).await? > 0 {
            return Err(ServiceError::conflict(ROLE_IN_USE).into());
        }
        let role_id = role.id;
        let data = role_response(&mut tx, role).await?;
        delete_role(&mut tx, &role_id).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.role", "role_delete", "commit transaction", &err)
        })?;
        Ok(RoleDeleteResponses::Ok(Json(RoleDataResponse {
            message: "Success to delete data role.".to_string(),
            data,
        })))
    }
}

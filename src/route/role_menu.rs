use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Cookie, Path},
    payload::Json,
    OpenApi, Tags,
};

use crate::{
    core::{
        permission::{resolve_children, resolve_permission, store_grants, ROLE_OR_MENU_NOT_FOUND},
        security::authorize,
        utils::parse_path_id,
    },
    schema::{
        common::{ErrorResponses, MessageResponse},
        role_menu::{
            validate_grants, RoleMenuDetailResponse, RoleMenuDetailResponses,
            RoleMenuListResponse, RoleMenuListResponses, RoleMenuRequest, RoleMenuResponse,
            RoleMenuStoreResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRoleMenuTags {
    RoleMenu,
}

pub struct ApiRoleMenu;

#[OpenApi]
impl ApiRoleMenu {
    /// Root menus with the role's flags.
    #[oai(path = "/role-menu/:role_id", method = "get", tag = "ApiRoleMenuTags::RoleMenu")]
    async fn role_menu_root(
        &self,
        Path(role_id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleMenuListResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role_menu", "role_menu_root", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role_id = parse_path_id(&role_id, ROLE_OR_MENU_NOT_FOUND)?;
        let data = resolve_children(&mut tx, &role_id, None).await?;
        Ok(RoleMenuListResponses::Ok(Json(RoleMenuListResponse {
            data: data.iter().map(RoleMenuResponse::from).collect(),
        })))
    }

    /// Direct children of `menu_id` with the role's flags.
    #[oai(
        path = "/role-menu/:role_id/:menu_id",
        method = "get",
        tag = "ApiRoleMenuTags::RoleMenu"
    )]
    async fn role_menu_children(
        &self,
        Path(role_id): Path<String>,
        Path(menu_id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleMenuListResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal(
                "route.role_menu",
                "role_menu_children",
                "begin transaction",
                &err,
            )
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role_id = parse_path_id(&role_id, ROLE_OR_MENU_NOT_FOUND)?;
        let menu_id = parse_path_id(&menu_id, ROLE_OR_MENU_NOT_FOUND)?;
        let data = resolve_children(&mut tx, &role_id, Some(menu_id)).await?;
        Ok(RoleMenuListResponses::Ok(Json(RoleMenuListResponse {
            data: data.iter().map(RoleMenuResponse::from).collect(),
        })))
    }

    #[oai(
        path = "/role-menu/:role_id/:menu_id/detail",
        method = "get",
        tag = "ApiRoleMenuTags::RoleMenu"
    )]
    async fn role_menu_detail(
        &self,
        Path(role_id): Path<String>,
        Path(menu_id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleMenuDetailResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal(
                "route.role_menu",
                "role_menu_detail",
                "begin transaction",
                &err,
            )
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role_id = parse_path_id(&role_id, ROLE_OR_MENU_NOT_FOUND)?;
        let menu_id = parse_path_id(&menu_id, ROLE_OR_MENU_NOT_FOUND)?;
        let permissions = resolve_permission(&mut tx, &role_id, &menu_id).await?;
        Ok(RoleMenuDetailResponses::Ok(Json(RoleMenuDetailResponse {
            data: permissions.into(),
        })))
    }

    /// Bulk upsert. A bad entry rejects the whole batch.
    #[oai(path = "/role-menu/:role_id", method = "post", tag = "ApiRoleMenuTags::RoleMenu")]
    async fn role_menu_store(
        &self,
        Path(role_id): Path<String>,
        json: Json<Vec<RoleMenuRequest>>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<RoleMenuStoreResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.role_menu", "role_menu_store", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let role_id = parse_path_id(&role_id, ROLE_OR_MENU_NOT_FOUND)?;
        let grants = validate_grants(&json.0).map_err(ErrorResponses::bad_request)?;
        store_grants(&mut tx, &role_id, &grants).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal(
                "route.role_menu",
                "role_menu_store",
                "commit transaction",
                &err,
            )
        })?;
        Ok(RoleMenuStoreResponses::Ok(Json(MessageResponse {
            message: "Success to save role menu.".to_string(),
        })))
    }
}

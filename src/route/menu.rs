use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{
    param::{Cookie, Path},
    payload::Json,
    OpenApi, Tags,
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        error::ServiceError,
        menu_tree::build_tree,
        ordering::{insert_position, reparent_menu, sort_menus, MENU_NOT_FOUND, PARENT_MENU_NOT_FOUND},
        security::authorize,
        utils::parse_path_id,
    },
    model::{active_state::ActiveState, menu::Menu},
    repository::menu::{
        create_menu, get_all_menu, get_menu_by_id, get_menu_by_key, get_menu_children,
        set_menu_active, update_menu,
    },
    schema::{
        common::{ErrorResponses, MessageResponse},
        menu::{
            MenuChangeParentRequest, MenuDataResponse, MenuDetailResponse, MenuDetailResponses,
            MenuRequest, MenuResponse, MenuSortRequest, MenuSortResponses, MenuStoreResponses,
            MenuTreeListResponse, MenuTreeResponses, MenuUpdateResponses,
        },
    },
    AppState,
};

pub const MENU_KEY_TAKEN: &str = "The key menu cannot be the same!";

#[derive(Tags)]
enum ApiMenuTags {
    Menu,
}

pub struct ApiMenu;

async fn find_menu(tx: &mut Transaction<'_, Postgres>, id: &str) -> Result<Menu, ErrorResponses> {
    let id = parse_path_id(id, MENU_NOT_FOUND)?;
    match get_menu_by_id(tx, &id).await? {
        Some(val) => Ok(val),
        None => Err(ServiceError::not_found(MENU_NOT_FOUND).into()),
    }
}

/// `key_menu` must stay unique, `menu_id` is the menu being edited.
async fn ensure_key_free(
    tx: &mut Transaction<'_, Postgres>,
    key_menu: &str,
    menu_id: Option<Uuid>,
) -> Result<(), ErrorResponses> {
    if let Some(other) = get_menu_by_key(tx, key_menu).await? {
        if Some(other.id) != menu_id {
            return Err(ServiceError::conflict(MENU_KEY_TAKEN).into());
        }
    }
    Ok(())
}

#[OpenApi]
impl ApiMenu {
    /// Every menu as a forest, active or not.
    #[oai(path = "/menu", method = "get", tag = "ApiMenuTags::Menu")]
    async fn menu_index(
        &self,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuTreeResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_index", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let menus = get_all_menu(&mut tx, false).await?;
        Ok(MenuTreeResponses::Ok(Json(MenuTreeListResponse {
            data: build_tree(&menus, None).into_iter().map(Into::into).collect(),
        })))
    }

    #[oai(path = "/menu/:id", method = "get", tag = "ApiMenuTags::Menu")]
    async fn menu_subtree(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuTreeResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_subtree", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let menu = find_menu(&mut tx, &id).await?;
        let menus = get_all_menu(&mut tx, false).await?;
        Ok(MenuTreeResponses::Ok(Json(MenuTreeListResponse {
            data: build_tree(&menus, Some(menu.id))
                .into_iter()
                .map(Into::into)
                .collect(),
        })))
    }

    #[oai(path = "/menu/:id/detail", method = "get", tag = "ApiMenuTags::Menu")]
    async fn menu_detail(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuDetailResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_detail", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let menu = find_menu(&mut tx, &id).await?;
        let children = get_menu_children(&mut tx, Some(menu.id), false).await?;
        Ok(MenuDetailResponses::Ok(Json(MenuDetailResponse {
            data: MenuResponse::from(&menu),
            children: children.iter().map(MenuResponse::from).collect(),
        })))
    }

    /// New menus go to the end of their sibling group.
    #[oai(path = "/menu", method = "post", tag = "ApiMenuTags::Menu")]
    async fn menu_store(
        &self,
        json: Json<MenuRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuStoreResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_store", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let req = json.validate().map_err(ErrorResponses::bad_request)?;
        ensure_key_free(&mut tx, &req.key_menu, None).await?;
        if let Some(parent_id) = req.menu_id {
            if get_menu_by_id(&mut tx, &parent_id).await?.is_none() {
                return Err(ServiceError::not_found(PARENT_MENU_NOT_FOUND).into());
            }
        }
        let order_number = insert_position(&mut tx, req.menu_id).await?;
        let now = Local::now().fixed_offset();
        let menu = Menu {
            id: Uuid::now_v7(),
            key_menu: req.key_menu,
            name: req.name,
            url: req.url,
            menu_id: req.menu_id,
            order_number,
            active: ActiveState::Active,
            created_by: Some(request_user.id),
            created_at: now,
            updated_by: Some(request_user.id),
            updated_at: now,
        };
        create_menu(&mut tx, &menu).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_store", "commit transaction", &err)
        })?;
        Ok(MenuStoreResponses::Ok(Json(MenuDataResponse {
            message: "Success to add data menu.".to_string(),
            data: MenuResponse::from(&menu),
        })))
    }

    /// Key, name and url only. Parent and position have their own endpoints.
    #[oai(path = "/menu/:id", method = "patch", tag = "ApiMenuTags::Menu")]
    async fn menu_update(
        &self,
        Path(id): Path<String>,
        json: Json<MenuRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_update", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut menu = find_menu(&mut tx, &id).await?;
        let req = json.validate().map_err(ErrorResponses::bad_request)?;
        ensure_key_free(&mut tx, &req.key_menu, Some(menu.id)).await?;
        let now = Local::now().fixed_offset();
        update_menu(
            &mut tx,
            &mut menu,
            req.key_menu,
            req.name,
            req.url,
            &request_user.id,
            &now,
        )
        .await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_update", "commit transaction", &err)
        })?;
        Ok(MenuUpdateResponses::Ok(Json(MenuDataResponse {
            message: "Success to update data menu.".to_string(),
            data: MenuResponse::from(&menu),
        })))
    }

    #[oai(path = "/menu/sort", method = "post", tag = "ApiMenuTags::Menu")]
    async fn menu_sort(
        &self,
        json: Json<MenuSortRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuSortResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_sort", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let ids = json.validate().map_err(ErrorResponses::bad_request)?;
        sort_menus(&mut tx, &ids, &request_user.id).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_sort", "commit transaction", &err)
        })?;
        Ok(MenuSortResponses::Ok(Json(MessageResponse {
            message: "Success to sort menu.".to_string(),
        })))
    }

    #[oai(path = "/menu/change-parent/:id", method = "post", tag = "ApiMenuTags::Menu")]
    async fn menu_change_parent(
        &self,
        Path(id): Path<String>,
        json: Json<MenuChangeParentRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_change_parent", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut menu = find_menu(&mut tx, &id).await?;
        let parent_id = json.validate().map_err(ErrorResponses::bad_request)?;
        reparent_menu(&mut tx, &mut menu, parent_id, &request_user.id).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_change_parent", "commit transaction", &err)
        })?;
        Ok(MenuUpdateResponses::Ok(Json(MenuDataResponse {
            message: "Success to change parent menu.".to_string(),
            data: MenuResponse::from(&menu),
        })))
    }

    /// Soft delete, the row and its grants stay.
    #[oai(path = "/menu/:id", method = "delete", tag = "ApiMenuTags::Menu")]
    async fn menu_delete(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_delete", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut menu = find_menu(&mut tx, &id).await?;
        let now = Local::now().fixed_offset();
        set_menu_active(&mut tx, &mut menu, ActiveState::Inactive, &request_user.id, &now).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_delete", "commit transaction", &err)
        })?;
        Ok(MenuUpdateResponses::Ok(Json(MenuDataResponse {
            message: "Success to delete data menu.".to_string(),
            data: MenuResponse::from(&menu),
        })))
    }

    #[oai(path = "/menu/:id/active", method = "post", tag = "ApiMenuTags::Menu")]
    async fn menu_activate(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<MenuUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_activate", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut menu = find_menu(&mut tx, &id).await?;
        let now = Local::now().fixed_offset();
        set_menu_active(&mut tx, &mut menu, ActiveState::Active, &request_user.id, &now).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.menu", "menu_activate", "commit transaction", &err)
        })?;
        Ok(MenuUpdateResponses::Ok(Json(MenuDataResponse {
            message: "Success to activate data menu.".to_string(),
            data: MenuResponse::from(&menu),
        })))
    }
}

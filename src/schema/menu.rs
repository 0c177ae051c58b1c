use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::{
        menu_tree::TreeNode,
        ordering::LIST_MENU_EMPTY,
        utils::{datetime_to_string, non_blank},
    },
    model::{active_state::ActiveState, menu::Menu},
};

use super::common::MessageResponse;

const MENU_FORMAT_INVALID: &str = "The menu format is invalid!";

#[derive(Object, Deserialize, Serialize, Clone)]
pub struct MenuResponse {
    pub id: String,
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    pub menu_id: Option<String>,
    pub order_number: i32,
    pub active: ActiveState,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

impl From<&Menu> for MenuResponse {
    fn from(menu: &Menu) -> Self {
        Self {
            id: menu.id.to_string(),
            key_menu: menu.key_menu.clone(),
            name: menu.name.clone(),
            url: menu.url.clone(),
            menu_id: menu.menu_id.map(|x| x.to_string()),
            order_number: menu.order_number,
            active: menu.active,
            created_by: menu.created_by.map(|x| x.to_string()),
            created_at: datetime_to_string(menu.created_at),
            updated_by: menu.updated_by.map(|x| x.to_string()),
            updated_at: datetime_to_string(menu.updated_at),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct MenuTreeResponse {
    pub id: String,
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    pub menu_id: Option<String>,
    pub order_number: i32,
    pub active: ActiveState,
    pub children: Vec<MenuTreeResponse>,
}

impl From<TreeNode<Menu>> for MenuTreeResponse {
    fn from(node: TreeNode<Menu>) -> Self {
        let menu = node.item;
        Self {
            id: menu.id.to_string(),
            key_menu: menu.key_menu,
            name: menu.name,
            url: menu.url,
            menu_id: menu.menu_id.map(|x| x.to_string()),
            order_number: menu.order_number,
            active: menu.active,
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct MenuTreeListResponse {
    pub data: Vec<MenuTreeResponse>,
}

#[derive(ApiResponse)]
pub enum MenuTreeResponses {
    #[oai(status = 200)]
    Ok(Json<MenuTreeListResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct MenuDetailResponse {
    pub data: MenuResponse,
    pub children: Vec<MenuResponse>,
}

#[derive(ApiResponse)]
pub enum MenuDetailResponses {
    #[oai(status = 200)]
    Ok(Json<MenuDetailResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct MenuDataResponse {
    pub message: String,
    pub data: MenuResponse,
}

#[derive(ApiResponse)]
pub enum MenuStoreResponses {
    #[oai(status = 200)]
    Ok(Json<MenuDataResponse>),
}

#[derive(ApiResponse)]
pub enum MenuUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<MenuDataResponse>),
}

#[derive(ApiResponse)]
pub enum MenuSortResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct MenuRequest {
    pub key_menu: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// parent, only read on store
    pub menu_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidMenuRequest {
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    pub menu_id: Option<Uuid>,
}

impl MenuRequest {
    pub fn validate(&self) -> Result<ValidMenuRequest, Vec<String>> {
        let mut errors: Vec<String> = vec![];
        let key_menu = non_blank(&self.key_menu).map(str::to_lowercase);
        if key_menu.is_none() {
            errors.push("The key menu is required!".to_string());
        }
        let name = non_blank(&self.name).map(str::to_string);
        if name.is_none() {
            errors.push("The name is required!".to_string());
        }
        let menu_id = match parse_optional_id(&self.menu_id) {
            Ok(val) => val,
            Err(err) => {
                errors.push(err);
                None
            }
        };
        match (key_menu, name) {
            (Some(key_menu), Some(name)) if errors.is_empty() => Ok(ValidMenuRequest {
                key_menu,
                name,
                url: non_blank(&self.url).map(str::to_string),
                menu_id,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_optional_id(value: &Option<String>) -> Result<Option<Uuid>, String> {
    match non_blank(value) {
        None => Ok(None),
        Some(val) => Uuid::parse_str(val)
            .map(Some)
            .map_err(|_| MENU_FORMAT_INVALID.to_string()),
    }
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct MenuSortItem {
    pub id: Option<String>,
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct MenuSortRequest {
    pub list_menu: Option<Vec<MenuSortItem>>,
}

impl MenuSortRequest {
    pub fn validate(&self) -> Result<Vec<Uuid>, Vec<String>> {
        let items = match &self.list_menu {
            Some(items) if !items.is_empty() => items,
            _ => return Err(vec![LIST_MENU_EMPTY.to_string()]),
        };
        let mut ids: Vec<Uuid> = vec![];
        for item in items {
            match parse_optional_id(&item.id) {
                Ok(Some(id)) => ids.push(id),
                _ => return Err(vec![MENU_FORMAT_INVALID.to_string()]),
            }
        }
        Ok(ids)
    }
}

/// `menu_id` null or absent moves the menu to the root group.
#[derive(Object, Deserialize, Serialize, Default)]
pub struct MenuChangeParentRequest {
    pub menu_id: Option<String>,
}

impl MenuChangeParentRequest {
    pub fn validate(&self) -> Result<Option<Uuid>, Vec<String>> {
        parse_optional_id(&self.menu_id).map_err(|err| vec![err])
    }
}

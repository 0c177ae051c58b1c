use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{
    permission::{Grant, MenuPermission, PermissionMatrix},
    utils::non_blank,
};

use super::common::MessageResponse;

#[derive(Object, Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PermissionResponse {
    pub access: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub approval: bool,
    pub approval_2: bool,
    pub approval_3: bool,
}

impl From<PermissionMatrix> for PermissionResponse {
    fn from(x: PermissionMatrix) -> Self {
        Self {
            access: x.access,
            create: x.create,
            update: x.update,
            delete: x.delete,
            approval: x.approval,
            approval_2: x.approval_2,
            approval_3: x.approval_3,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleMenuResponse {
    pub id: String,
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    pub order_number: i32,
    pub permissions: PermissionResponse,
}

impl From<&MenuPermission> for RoleMenuResponse {
    fn from(x: &MenuPermission) -> Self {
        Self {
            id: x.menu.id.to_string(),
            key_menu: x.menu.key_menu.clone(),
            name: x.menu.name.clone(),
            url: x.menu.url.clone(),
            order_number: x.menu.order_number,
            permissions: x.permissions.into(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleMenuListResponse {
    pub data: Vec<RoleMenuResponse>,
}

#[derive(ApiResponse)]
pub enum RoleMenuListResponses {
    #[oai(status = 200)]
    Ok(Json<RoleMenuListResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleMenuDetailResponse {
    pub data: PermissionResponse,
}

#[derive(ApiResponse)]
pub enum RoleMenuDetailResponses {
    #[oai(status = 200)]
    Ok(Json<RoleMenuDetailResponse>),
}

#[derive(ApiResponse)]
pub enum RoleMenuStoreResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

/// One grant of the bulk store. Omitted flags are stored as false.
#[derive(Object, Deserialize, Serialize, Default)]
pub struct RoleMenuRequest {
    pub menu_id: Option<String>,
    pub access: Option<bool>,
    pub create: Option<bool>,
    pub update: Option<bool>,
    pub delete: Option<bool>,
    pub approval: Option<bool>,
    pub approval_2: Option<bool>,
    pub approval_3: Option<bool>,
}

impl RoleMenuRequest {
    fn permissions(&self) -> PermissionMatrix {
        PermissionMatrix {
            access: self.access.unwrap_or(false),
            create: self.create.unwrap_or(false),
            update: self.update.unwrap_or(false),
            delete: self.delete.unwrap_or(false),
            approval: self.approval.unwrap_or(false),
            approval_2: self.approval_2.unwrap_or(false),
            approval_3: self.approval_3.unwrap_or(false),
        }
    }
}

pub fn validate_grants(items: &[RoleMenuRequest]) -> Result<Vec<Grant>, Vec<String>> {
    if items.is_empty() {
        return Err(vec!["The list role menu must contain at least 1 item!".to_string()]);
    }
    let mut errors: Vec<String> = vec![];
    let mut grants: Vec<Grant> = vec![];
    for item in items {
        match non_blank(&item.menu_id).map(Uuid::parse_str) {
            None => errors.push("The menu is required!".to_string()),
            Some(Err(_)) => errors.push("The menu format is invalid!".to_string()),
            Some(Ok(menu_id)) => grants.push(Grant {
                menu_id,
                permissions: item.permissions(),
            }),
        }
    }
    if !errors.is_empty() {
        errors.dedup();
        return Err(errors);
    }
    Ok(grants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_flags_are_false() {
        let menu_id = Uuid::now_v7();
        let grants = validate_grants(&[RoleMenuRequest {
            menu_id: Some(menu_id.to_string()),
            access: Some(true),
            approval_2: Some(true),
            ..Default::default()
        }])
        .unwrap();
        assert_eq!(grants[0].menu_id, menu_id);
        assert_eq!(
            grants[0].permissions,
            PermissionMatrix {
                access: true,
                approval_2: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_validate_grants_rejects_bad_input() {
        assert!(validate_grants(&[]).is_err());
        let errors = validate_grants(&[
            RoleMenuRequest::default(),
            RoleMenuRequest {
                menu_id: Some("abc".to_string()),
                ..Default::default()
            },
        ])
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "The menu is required!".to_string(),
                "The menu format is invalid!".to_string()
            ]
        );
    }
}

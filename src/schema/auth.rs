use chrono::NaiveDate;
use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        menu_tree::TreeNode,
        permission::MenuPermission,
        security::Claims,
        utils::{is_valid_email, non_blank},
    },
    model::active_state::ActiveState,
};

use super::{
    common::MessageResponse,
    role_menu::PermissionResponse,
    user::{required, validate_birthdate, UserResponse},
};

#[derive(Object, Deserialize, Serialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Email and password, or the list of what is wrong with them.
    pub fn validate(&self) -> Result<(String, String), Vec<String>> {
        let mut errors: Vec<String> = vec![];
        // matched against the stored email exactly as typed
        let email = match non_blank(&self.email) {
            None => {
                errors.push("Email is required".to_string());
                None
            }
            Some(val) if !is_valid_email(val) => {
                errors.push("Invalid email".to_string());
                None
            }
            Some(val) => Some(val.to_string()),
        };
        // passwords are taken as typed
        let password = match self.password.as_deref() {
            Some(val) if !val.is_empty() => Some(val.to_string()),
            _ => {
                errors.push("Password is required".to_string());
                None
            }
        };
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(errors),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>, #[oai(header = "Set-Cookie")] String),
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProfileUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub birthdate: String,
    pub active: ActiveState,
    pub role_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for ProfileUserResponse {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            name: claims.name,
            email: claims.email,
            gender: claims.gender,
            birthdate: claims.birthdate,
            active: claims.active,
            role_id: claims.role_id,
            iat: claims.iat,
            exp: claims.exp,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProfileMenuResponse {
    pub id: String,
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    pub order_number: i32,
    pub permissions: PermissionResponse,
    pub children: Vec<ProfileMenuResponse>,
}

impl From<TreeNode<MenuPermission>> for ProfileMenuResponse {
    fn from(node: TreeNode<MenuPermission>) -> Self {
        let MenuPermission { menu, permissions } = node.item;
        Self {
            id: menu.id.to_string(),
            key_menu: menu.key_menu,
            name: menu.name,
            url: menu.url,
            order_number: menu.order_number,
            permissions: permissions.into(),
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub profile: ProfileUserResponse,
    pub menu: Vec<ProfileMenuResponse>,
}

#[derive(ApiResponse)]
pub enum ProfileResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct EditProfileRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
}

impl EditProfileRequest {
    pub fn validate(&self) -> Result<(String, String, NaiveDate), Vec<String>> {
        let mut errors: Vec<String> = vec![];
        let name = required(&self.name, "The name is required!", &mut errors);
        let gender = required(&self.gender, "The gender is required!", &mut errors);
        let birthdate = validate_birthdate(&self.birthdate, &mut errors);
        match (name, gender, birthdate) {
            (Some(name), Some(gender), Some(birthdate)) => Ok((name, gender, birthdate)),
            _ => Err(errors),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct EditProfileResponse {
    pub message: String,
    pub data: UserResponse,
}

#[derive(ApiResponse)]
pub enum EditProfileResponses {
    #[oai(status = 200)]
    Ok(Json<EditProfileResponse>),
}

#[derive(ApiResponse)]
pub enum LogoutResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>, #[oai(header = "Set-Cookie")] String),
}

use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::core::utils::non_blank;

use super::common::{AuditUser, PaginateResponse};

pub const ROLE_NAME_REQUIRED: &str = "The name is required!";

#[derive(Object, Deserialize, Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub created_by: Option<AuditUser>,
    pub created_at: String,
    pub updated_by: Option<AuditUser>,
    pub updated_at: String,
}

#[derive(ApiResponse)]
pub enum PaginateRoleResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<RoleResponse>>),
}

#[derive(ApiResponse)]
pub enum RoleDetailResponses {
    #[oai(status = 200)]
    Ok(Json<RoleResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleDataResponse {
    pub message: String,
    pub data: RoleResponse,
}

#[derive(ApiResponse)]
pub enum RoleCreateResponses {
    #[oai(status = 201)]
    Ok(Json<RoleDataResponse>),
}

#[derive(ApiResponse)]
pub enum RoleUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<RoleDataResponse>),
}

#[derive(ApiResponse)]
pub enum RoleDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<RoleDataResponse>),
}

#[derive(Object, Deserialize, Serialize, Default)]
pub struct RoleRequest {
    pub name: Option<String>,
}

impl RoleRequest {
    pub fn validate(&self) -> Result<String, Vec<String>> {
        match non_blank(&self.name) {
            Some(val) => Ok(val.to_string()),
            None => Err(vec![ROLE_NAME_REQUIRED.to_string()]),
        }
    }
}

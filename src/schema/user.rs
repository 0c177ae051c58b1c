use chrono::NaiveDate;
use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::utils::{
        date_to_string, datetime_to_string, is_valid_email, non_blank, parse_date,
    },
    model::{active_state::ActiveState, user::User},
};

use super::common::{MessageResponse, PaginateResponse};

/// User without its password hash.
#[derive(Object, Deserialize, Serialize, Clone)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub birthdate: String,
    pub active: ActiveState,
    pub role_id: String,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            gender: user.gender.clone(),
            birthdate: date_to_string(user.birthdate),
            active: user.active,
            role_id: user.role_id.to_string(),
            created_by: user.created_by.map(|x| x.to_string()),
            created_at: datetime_to_string(user.created_at),
            updated_by: user.updated_by.map(|x| x.to_string()),
            updated_at: datetime_to_string(user.updated_at),
        }
    }
}

#[derive(ApiResponse)]
pub enum PaginateUserResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<UserResponse>>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserDataResponse {
    pub message: String,
    pub data: UserResponse,
}

#[derive(ApiResponse)]
pub enum UserDetailResponses {
    #[oai(status = 200)]
    Ok(Json<UserResponse>),
}

#[derive(ApiResponse)]
pub enum UserCreateResponses {
    #[oai(status = 201)]
    Ok(Json<UserDataResponse>),
}

#[derive(ApiResponse)]
pub enum UserUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<UserDataResponse>),
}

#[derive(ApiResponse)]
pub enum UserResetPasswordResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

/// Body of user create and update.
#[derive(Object, Deserialize, Default)]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub role_id: Option<String>,
}

/// [`UserRequest`] once every field passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidUserRequest {
    pub name: String,
    pub email: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub role_id: Uuid,
}

pub fn validate_birthdate(value: &Option<String>, errors: &mut Vec<String>) -> Option<NaiveDate> {
    match non_blank(value) {
        None => {
            errors.push("The birthdate is required!".to_string());
            None
        }
        Some(val) => {
            let date = parse_date(val);
            if date.is_none() {
                errors.push("The birthdate format must be: YYYY-MM-DD!".to_string());
            }
            date
        }
    }
}

pub fn required(value: &Option<String>, message: &str, errors: &mut Vec<String>) -> Option<String> {
    let val = non_blank(value).map(str::to_string);
    if val.is_none() {
        errors.push(message.to_string());
    }
    val
}

impl UserRequest {
    pub fn validate(&self) -> Result<ValidUserRequest, Vec<String>> {
        let mut errors: Vec<String> = vec![];
        let name = required(&self.name, "The name is required!", &mut errors);
        let email = required(&self.email, "The email is required!", &mut errors)
            .map(|x| x.to_lowercase());
        if let Some(val) = &email {
            if !is_valid_email(val) {
                errors.push("The email format is invalid!".to_string());
            }
        }
        let gender = required(&self.gender, "The gender is required!", &mut errors);
        let birthdate = validate_birthdate(&self.birthdate, &mut errors);
        let role_id = match non_blank(&self.role_id) {
            None => {
                errors.push("The role is required!".to_string());
                None
            }
            Some(val) => {
                let id = Uuid::parse_str(val).ok();
                if id.is_none() {
                    errors.push("The role format is invalid!".to_string());
                }
                id
            }
        };
        match (name, email, gender, birthdate, role_id) {
            (Some(name), Some(email), Some(gender), Some(birthdate), Some(role_id))
                if errors.is_empty() =>
            {
                Ok(ValidUserRequest {
                    name,
                    email,
                    gender,
                    birthdate,
                    role_id,
                })
            }
            _ => Err(errors),
        }
    }
}

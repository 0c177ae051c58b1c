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
        security::{authorize, hash_password},
        session::revoke_user_sessions,
        utils::parse_path_id,
    },
    model::{active_state::ActiveState, user::User},
    repository::{
        role::get_role_by_id,
        user::{create_user, get_user_by_email, get_user_by_id, paginate_user, reset_user_password, update_user},
    },
    schema::{
        common::{ErrorResponses, MessageResponse, PaginateResponse},
        user::{
            PaginateUserResponses, UserCreateResponses, UserDataResponse, UserDetailResponses,
            UserRequest, UserResetPasswordResponses, UserResponse, UserUpdateResponses,
            ValidUserRequest,
        },
    },
    AppState,
};

use super::role::ROLE_NOT_FOUND;

pub const USER_NOT_FOUND: &str = "The user does not exist!";
pub const EMAIL_TAKEN: &str = "The email cannot be the same!";

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

async fn find_user(tx: &mut Transaction<'_, Postgres>, id: &str) -> Result<User, ErrorResponses> {
    let id = parse_path_id(id, USER_NOT_FOUND)?;
    match get_user_by_id(tx, &id).await? {
        Some(val) => Ok(val),
        None => Err(ServiceError::not_found(USER_NOT_FOUND).into()),
    }
}

/// Email free for `user_id` (`None` on create) and role present.
async fn check_user_request(
    tx: &mut Transaction<'_, Postgres>,
    req: &ValidUserRequest,
    user_id: Option<Uuid>,
) -> Result<(), ErrorResponses> {
    if let Some(other) = get_user_by_email(tx, &req.email).await? {
        if Some(other.id) != user_id {
            return Err(ServiceError::conflict(EMAIL_TAKEN).into());
        }
    }
    if get_role_by_id(tx, &req.role_id).await?.is_none() {
        return Err(ServiceError::not_found(ROLE_NOT_FOUND).into());
    }
    Ok(())
}

fn default_password_hash(password: &str) -> anyhow::Result<String> {
    hash_password(password).map_err(|err| anyhow::anyhow!("hash default password: {}", err))
}

#[OpenApi]
impl ApiUser {
    #[oai(path = "/user", method = "get", tag = "ApiUserTags::User")]
    async fn user_index(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(order_field): Query<Option<String>>,
        Query(order_dir): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<PaginateUserResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_index", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(10).clamp(1, 100);
        let (data, counts, page_count) =
            paginate_user(&mut tx, page, page_size, search, order_field, order_dir).await?;

        Ok(PaginateUserResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results: data.iter().map(UserResponse::from).collect(),
        })))
    }

    #[oai(path = "/user/:id", method = "get", tag = "ApiUserTags::User")]
    async fn user_detail(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<UserDetailResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_detail", "begin transaction", &err)
        })?;

        // Validate user token
        authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let user = find_user(&mut tx, &id).await?;
        Ok(UserDetailResponses::Ok(Json(UserResponse::from(&user))))
    }

    #[oai(path = "/user", method = "post", tag = "ApiUserTags::User")]
    async fn user_store(
        &self,
        json: Json<UserRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<UserCreateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_store", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let req = json.validate().map_err(ErrorResponses::bad_request)?;
        check_user_request(&mut tx, &req, None).await?;
        let now = Local::now().fixed_offset();
        let user = User {
            id: Uuid::now_v7(),
            name: req.name,
            email: req.email,
            password: default_password_hash(&state.config.default_password)?,
            gender: req.gender,
            birthdate: req.birthdate,
            active: ActiveState::Active,
            role_id: req.role_id,
            created_by: Some(request_user.id),
            created_at: now,
            updated_by: Some(request_user.id),
            updated_at: now,
        };
        create_user(&mut tx, &user).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_store", "commit transaction", &err)
        })?;
        tracing::info!("user {} created by {}", user.id, request_user.id);
        Ok(UserCreateResponses::Ok(Json(UserDataResponse {
            message: "Success to add data user.".to_string(),
            data: UserResponse::from(&user),
        })))
    }

    #[oai(path = "/user/:id", method = "patch", tag = "ApiUserTags::User")]
    async fn user_update(
        &self,
        Path(id): Path<String>,
        json: Json<UserRequest>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<UserUpdateResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_update", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut user = find_user(&mut tx, &id).await?;
        let req = json.validate().map_err(ErrorResponses::bad_request)?;
        check_user_request(&mut tx, &req, Some(user.id)).await?;
        let now = Local::now().fixed_offset();
        update_user(
            &mut tx,
            &mut user,
            req.name,
            req.email,
            req.gender,
            req.birthdate,
            req.role_id,
            &request_user.id,
            &now,
        )
        .await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_update", "commit transaction", &err)
        })?;
        Ok(UserUpdateResponses::Ok(Json(UserDataResponse {
            message: "Success to update data user.".to_string(),
            data: UserResponse::from(&user),
        })))
    }

    /// Set the configured default password, deactivate the account and end
    /// its sessions.
    #[oai(path = "/user/reset-password/:id", method = "post", tag = "ApiUserTags::User")]
    async fn user_reset_password(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        token: Cookie<Option<String>>,
    ) -> Result<UserResetPasswordResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.user", "user_reset_password", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let mut user = find_user(&mut tx, &id).await?;
        let password = default_password_hash(&state.config.default_password)?;
        let now = Local::now().fixed_offset();
        reset_user_password(&mut tx, &mut user, password, &request_user.id, &now).await?;
        let revoked = revoke_user_sessions(&mut tx, &user.id).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal(
                "route.user",
                "user_reset_password",
                "commit transaction",
                &err,
            )
        })?;
        tracing::info!("password of user {} reset, {} sessions revoked", user.id, revoked);
        Ok(UserResetPasswordResponses::Ok(Json(MessageResponse {
            message: "Success to reset password user.".to_string(),
        })))
    }
}

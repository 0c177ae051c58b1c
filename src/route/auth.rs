use std::{sync::Arc, time::Duration};

use poem::web::{
    cookie::{Cookie, SameSite},
    Data,
};
use poem_openapi::{param::Cookie as CookieParam, payload::Json, OpenApi, Tags};

use crate::{
    core::{
        error::ServiceError,
        permission::profile_menu,
        security::{authorize, TOKEN_COOKIE},
        session::{login, logout, refresh, Session},
    },
    repository::user::{get_user_by_id, update_user_profile},
    schema::{
        auth::{
            EditProfileRequest, EditProfileResponse, EditProfileResponses, LoginRequest,
            LoginResponse, LoginResponses, LogoutResponses, ProfileResponse, ProfileResponses,
            RefreshTokenRequest,
        },
        common::{ErrorResponses, MessageResponse},
        user::UserResponse,
    },
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

/// `Set-Cookie` value carrying the access token. `max_age` of zero clears it.
pub fn token_cookie(token: &str, max_age: u64) -> String {
    let mut cookie = Cookie::new_with_str(TOKEN_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::None);
    cookie.set_max_age(Duration::from_secs(max_age));
    cookie.to_string()
}

fn session_response(session: Session, jwt_exp: u16) -> LoginResponses {
    let cookie = token_cookie(&session.token, jwt_exp as u64 * 60);
    LoginResponses::Ok(
        Json(LoginResponse {
            message: "Login successful".to_string(),
            refresh_token: session.refresh_token,
            user: UserResponse::from(&session.user),
        }),
        cookie,
    )
}

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> Result<LoginResponses, ErrorResponses> {
        let (email, password) = json.validate().map_err(ErrorResponses::bad_request)?;

        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_login", "begin transaction", &err)
        })?;

        let session = login(&mut tx, &state.config, &email, &password).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_login", "commit transaction", &err)
        })?;
        tracing::info!("user {} logged in", session.user.id);
        Ok(session_response(session, state.config.jwt_exp))
    }

    /// Trade a refresh token for a new pair. Each refresh token works once.
    #[oai(path = "/refresh-token", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> Result<LoginResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_refresh_token", "begin transaction", &err)
        })?;

        let session = refresh(&mut tx, &state.config, json.refresh_token.as_deref()).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_refresh_token", "commit transaction", &err)
        })?;
        Ok(session_response(session, state.config.jwt_exp))
    }

    #[oai(path = "/profile", method = "get", tag = "ApiAuthTags::Auth")]
    async fn auth_profile(
        &self,
        state: Data<&Arc<AppState>>,
        token: CookieParam<Option<String>>,
    ) -> Result<ProfileResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_profile", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let menu = profile_menu(&mut tx, &request_user.role_id).await?;
        Ok(ProfileResponses::Ok(Json(ProfileResponse {
            message: "Profile retrieved successfully".to_string(),
            profile: request_user.claims.into(),
            menu: menu.into_iter().map(Into::into).collect(),
        })))
    }

    /// Claims of tokens already handed out keep the old values until refresh.
    #[oai(path = "/edit-profile", method = "patch", tag = "ApiAuthTags::Auth")]
    async fn auth_edit_profile(
        &self,
        json: Json<EditProfileRequest>,
        state: Data<&Arc<AppState>>,
        token: CookieParam<Option<String>>,
    ) -> Result<EditProfileResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_edit_profile", "begin transaction", &err)
        })?;

        // Validate user token
        let request_user = authorize(&mut tx, &state.config, token.0.as_deref()).await?;

        let (name, gender, birthdate) = json.validate().map_err(ErrorResponses::bad_request)?;
        let mut user = match get_user_by_id(&mut tx, &request_user.id).await? {
            Some(val) => val,
            None => return Err(ServiceError::unauthorized().into()),
        };
        let now = chrono::Local::now().fixed_offset();
        update_user_profile(&mut tx, &mut user, name, gender, birthdate, &now).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_edit_profile", "commit transaction", &err)
        })?;
        Ok(EditProfileResponses::Ok(Json(EditProfileResponse {
            message: "Profile updated successfully".to_string(),
            data: UserResponse::from(&user),
        })))
    }

    #[oai(path = "/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        token: CookieParam<Option<String>>,
    ) -> Result<LogoutResponses, ErrorResponses> {
        // Begin db transaction
        let mut tx = state.db.begin().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_logout", "begin transaction", &err)
        })?;

        // Validate user token
        let token = token.0.unwrap_or_default();
        let request_user = authorize(&mut tx, &state.config, Some(&token)).await?;
        logout(&mut tx, &token).await?;

        tx.commit().await.map_err(|err| {
            ErrorResponses::internal("route.auth", "auth_logout", "commit transaction", &err)
        })?;
        tracing::info!("user {} logged out", request_user.id);
        Ok(LogoutResponses::Ok(
            Json(MessageResponse {
                message: "Logout successful".to_string(),
            }),
            token_cookie("", 0),
        ))
    }
}

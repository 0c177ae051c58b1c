use chrono::{Duration, Local};
use poem::{
    http::{header, StatusCode},
    test::{TestClient, TestResponse},
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::{
        error::{
            ACCOUNT_INACTIVE, INVALID_CREDENTIALS, INVALID_TOKEN, REFRESH_TOKEN_NOT_FOUND,
            UNAUTHORIZED,
        },
        security::{encode_token, generate_refresh_token, Claims},
        test_utils::{auth_cookie, generate_test_user, test_app_state, test_config},
    },
    factory::{
        menu::MenuFactory,
        role::RoleFactory,
        user::{UserFactory, FACTORY_PASSWORD},
    },
    init_openapi_route,
    model::{access_token::AccessToken, active_state::ActiveState, menu::Menu, user::User},
    repository::access_token::create_access_token,
};

fn set_cookie(resp: &TestResponse) -> String {
    resp.0
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|x| x.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[sqlx::test]
async fn test_login_then_logout(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When login
    let resp = cli
        .post("/api/login")
        .body_json(&json!({
            "email": "budi@gmail.com",
            "password": "password"
        }))
        .send()
        .await;

    // Expect login
    resp.assert_status_is_ok();
    let cookie = set_cookie(&resp);
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Max-Age=900"));
    let token = cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("message").assert_string("Login successful");
    assert_eq!(body.get("refresh_token").string().len(), 100);
    body.get("user")
        .object()
        .get("email")
        .assert_string("budi@gmail.com");
    assert!(body.get("user").object().get_opt("password").is_none());

    // When profile
    let resp = cli
        .get("/api/profile")
        .header("cookie", auth_cookie(&token))
        .send()
        .await;

    // Expect profile
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("message")
        .assert_string("Profile retrieved successfully");
    body.get("profile")
        .object()
        .get("email")
        .assert_string("budi@gmail.com");
    body.get("menu").array().assert_len(0);

    // When logout
    let resp = cli
        .post("/api/logout")
        .header("cookie", auth_cookie(&token))
        .send()
        .await;

    // Expect logout
    resp.assert_status_is_ok();
    assert!(set_cookie(&resp).contains("Max-Age=0"));
    resp.assert_json(&json!({"message": "Logout successful"}))
        .await;
    let resp = cli
        .get("/api/profile")
        .header("cookie", auth_cookie(&token))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
async fn test_login_failures(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let role = RoleFactory::new().generate_one(&app_state.db, ()).await?;
    let mut user_factory = UserFactory::<Uuid>::new();
    user_factory.modified_one(|data, role_id| User {
        email: "inactive@gmail.com".to_string(),
        active: ActiveState::Inactive,
        role_id,
        ..data.clone()
    });
    user_factory.generate_one(&app_state.db, role.id).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // unknown email, other letter case and wrong password are indistinguishable
    for (email, password) in [
        ("nobody@gmail.com", "password"),
        ("Budi@Gmail.com", "password"),
        ("budi@gmail.com", "wrongpassword"),
    ] {
        let resp = cli
            .post("/api/login")
            .body_json(&json!({"email": email, "password": password}))
            .send()
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_json(&json!({"errors": [INVALID_CREDENTIALS]}))
            .await;
    }

    // inactive account
    let resp = cli
        .post("/api/login")
        .body_json(&json!({"email": "inactive@gmail.com", "password": FACTORY_PASSWORD}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": [ACCOUNT_INACTIVE]}))
        .await;

    // missing fields
    let resp = cli.post("/api/login").body_json(&json!({})).send().await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": ["Email is required", "Password is required"]}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_refresh_token_is_single_use(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/refresh-token")
        .body_json(&json!({"refresh_token": test_user.refresh_token}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    assert!(set_cookie(&resp).starts_with("token="));
    let json = resp.json().await;
    let new_refresh_token = json.value().object().get("refresh_token").string().to_string();
    assert_ne!(new_refresh_token, test_user.refresh_token);

    // the old pair is gone
    let resp = cli
        .post("/api/refresh-token")
        .body_json(&json!({"refresh_token": test_user.refresh_token}))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    resp.assert_json(&json!({"errors": [REFRESH_TOKEN_NOT_FOUND]}))
        .await;
    let resp = cli
        .get("/api/profile")
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    // the new one still works once
    let resp = cli
        .post("/api/refresh-token")
        .body_json(&json!({"refresh_token": new_refresh_token}))
        .send()
        .await;
    resp.assert_status_is_ok();

    // missing refresh token
    let resp = cli
        .post("/api/refresh-token")
        .body_json(&json!({}))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[sqlx::test]
async fn test_protected_route_rejects_bad_token(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // no cookie
    for path in ["/api/profile", "/api/menu", "/api/role"] {
        let resp = cli.get(path).send().await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_json(&json!({"errors": [UNAUTHORIZED]})).await;
    }
    let resp = cli.post("/api/logout").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    resp.assert_json(&json!({"errors": [UNAUTHORIZED]})).await;

    // unknown token
    let resp = cli
        .get("/api/profile")
        .header("cookie", auth_cookie("not-a-token"))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    resp.assert_json(&json!({"errors": [UNAUTHORIZED]})).await;
    Ok(())
}

#[sqlx::test]
async fn test_stored_token_failing_verification(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let hour_ago = Local::now() - Duration::hours(1);
    let expired = Claims {
        iat: (hour_ago - Duration::minutes(15)).timestamp(),
        exp: hour_ago.timestamp(),
        ..Claims::new(&test_user.user, &config)
    };
    let expired = encode_token(&expired, &config.jwt_secret)?;
    let forged = encode_token(&Claims::new(&test_user.user, &config), "another secret")?;
    let mut tx = app_state.db.begin().await?;
    for token in [&expired, &forged] {
        create_access_token(
            &mut tx,
            &AccessToken {
                id: Uuid::now_v7(),
                user_id: test_user.user.id,
                token: token.clone(),
                refresh_token: generate_refresh_token(),
                created_at: Local::now().fixed_offset(),
            },
        )
        .await?;
    }
    tx.commit().await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    for token in [&expired, &forged] {
        // When
        let resp = cli
            .get("/api/profile")
            .header("cookie", auth_cookie(token))
            .send()
            .await;

        // Expect
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_json(&json!({"errors": [INVALID_TOKEN]})).await;
    }
    Ok(())
}

#[sqlx::test]
async fn test_profile_menu_follows_access(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let parent = MenuFactory::new().generate_one(&app_state.db, ()).await?;
    let mut menu_factory = MenuFactory::<Uuid>::new();
    menu_factory.modified_many(|data, _, parent_id| Menu {
        menu_id: Some(parent_id),
        ..data.clone()
    });
    let children = menu_factory
        .generate_many(&app_state.db, 2, parent.id)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post(format!("/api/role-menu/{}", test_user.role.id))
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!([
            {"menu_id": parent.id.to_string(), "access": true},
            {"menu_id": children[0].id.to_string(), "access": true, "create": true},
            {"menu_id": children[1].id.to_string(), "access": false},
        ]))
        .send()
        .await;
    resp.assert_status_is_ok();

    // When
    let resp = cli
        .get("/api/profile")
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let menu = json.value().object().get("menu").array();
    menu.assert_len(1);
    let root = menu.get(0).object();
    root.get("id").assert_string(&parent.id.to_string());
    let root_children = root.get("children").array();
    root_children.assert_len(1);
    let child = root_children.get(0).object();
    child.get("id").assert_string(&children[0].id.to_string());
    child
        .get("permissions")
        .object()
        .get("create")
        .assert_bool(true);
    Ok(())
}

#[sqlx::test]
async fn test_edit_profile(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .patch("/api/edit-profile")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({
            "name": "Budi Santoso",
            "gender": "Male",
            "birthdate": "1995-04-24"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().object().get("data").object();
    data.get("name").assert_string("Budi Santoso");
    data.get("birthdate").assert_string("1995-04-24");
    let res: (String,) = sqlx::query_as("SELECT name FROM public.user WHERE id = $1")
        .bind(test_user.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, "Budi Santoso");

    // invalid birthdate
    let resp = cli
        .patch("/api/edit-profile")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({
            "name": "Budi",
            "gender": "Male",
            "birthdate": "24-04-1995"
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

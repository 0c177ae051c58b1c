use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::{
        ordering::{LIST_MENU_EMPTY, MENU_CYCLE, MENU_NOT_FOUND, PARENT_MENU_NOT_FOUND},
        test_utils::{auth_cookie, generate_test_user, test_app_state, test_config},
    },
    factory::menu::MenuFactory,
    init_openapi_route,
    model::{active_state::ActiveState, menu::Menu},
    route::menu::MENU_KEY_TAKEN,
};

async fn menu_row(pool: &PgPool, id: &Uuid) -> anyhow::Result<(Option<Uuid>, i32, ActiveState)> {
    let res = sqlx::query_as("SELECT menu_id, order_number, active FROM public.menu WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(res)
}

#[sqlx::test]
async fn test_store_then_sort_menu(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When store two root menus
    let mut ids: Vec<String> = vec![];
    for (key, order_number) in [("Menu-A", 1), ("Menu-B", 2)] {
        let resp = cli
            .post("/api/menu")
            .header("cookie", auth_cookie(&test_user.token))
            .body_json(&json!({"key_menu": key, "name": key, "url": "/a"}))
            .send()
            .await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let body = json.value().object();
        body.get("message").assert_string("Success to add data menu.");
        let data = body.get("data").object();
        data.get("key_menu").assert_string(&key.to_lowercase());
        data.get("order_number").assert_i64(order_number);
        data.get("menu_id").assert_null();
        ids.push(data.get("id").string().to_string());
    }

    // When sort [B, A]
    let resp = cli
        .post("/api/menu/sort")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"list_menu": [{"id": ids[1]}, {"id": ids[0]}]}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    for (id, order_number) in [(&ids[0], 2), (&ids[1], 1)] {
        let resp = cli
            .get(format!("/api/menu/{}/detail", id))
            .header("cookie", auth_cookie(&test_user.token))
            .send()
            .await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        json.value()
            .object()
            .get("data")
            .object()
            .get("order_number")
            .assert_i64(order_number);
    }
    Ok(())
}

#[sqlx::test]
async fn test_sort_menu_rejects_unknown_id(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let menus = MenuFactory::new().generate_many(&app_state.db, 2, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/menu/sort")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"list_menu": [
            {"id": menus[1].id.to_string()},
            {"id": Uuid::now_v7().to_string()},
            {"id": menus[0].id.to_string()}
        ]}))
        .send()
        .await;

    // Expect nothing moved
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"errors": [MENU_NOT_FOUND]})).await;
    assert_eq!(menu_row(&app_state.db, &menus[0].id).await?.1, 1);
    assert_eq!(menu_row(&app_state.db, &menus[1].id).await?.1, 2);

    // empty list
    let resp = cli
        .post("/api/menu/sort")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"list_menu": []}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": [LIST_MENU_EMPTY]})).await;
    Ok(())
}

#[sqlx::test]
async fn test_store_menu_validation(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let mut menu_factory = MenuFactory::<()>::new();
    menu_factory.modified_one(|data, _| Menu {
        key_menu: "dashboard".to_string(),
        ..data.clone()
    });
    let dashboard = menu_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // key already used, compared lowercased
    let resp = cli
        .post("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"key_menu": "Dashboard", "name": "Dashboard"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": [MENU_KEY_TAKEN]})).await;

    // unknown parent
    let resp = cli
        .post("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({
            "key_menu": "report",
            "name": "Report",
            "menu_id": Uuid::now_v7().to_string()
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"errors": [PARENT_MENU_NOT_FOUND]}))
        .await;

    // missing fields
    let resp = cli
        .post("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": ["The key menu is required!", "The name is required!"]}))
        .await;

    // child goes to the end of its own group
    let resp = cli
        .post("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({
            "key_menu": "report",
            "name": "Report",
            "menu_id": dashboard.id.to_string()
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().object().get("data").object();
    data.get("order_number").assert_i64(1);
    data.get("menu_id").assert_string(&dashboard.id.to_string());
    Ok(())
}

#[sqlx::test]
async fn test_menu_tree_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let roots = MenuFactory::new().generate_many(&app_state.db, 2, ()).await?;
    let mut child_factory = MenuFactory::<Uuid>::new();
    child_factory.modified_many(|data, _, parent_id| Menu {
        menu_id: Some(parent_id),
        ..data.clone()
    });
    let children = child_factory
        .generate_many(&app_state.db, 3, roots[0].id)
        .await?;
    let grandchild = child_factory
        .generate_many(&app_state.db, 1, children[2].id)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When full forest
    let resp = cli
        .get("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().object().get("data").array();
    data.assert_len(2);
    let first = data.get(0).object();
    first.get("id").assert_string(&roots[0].id.to_string());
    let first_children = first.get("children").array();
    first_children.assert_len(3);
    for (idx, child) in children.iter().enumerate() {
        first_children
            .get(idx)
            .object()
            .get("id")
            .assert_string(&child.id.to_string());
    }
    first_children
        .get(2)
        .object()
        .get("children")
        .array()
        .get(0)
        .object()
        .get("id")
        .assert_string(&grandchild[0].id.to_string());
    data.get(1).object().get("children").array().assert_len(0);

    // When subtree
    let resp = cli
        .get(format!("/api/menu/{}", roots[0].id))
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("data").array().assert_len(3);

    // When detail
    let resp = cli
        .get(format!("/api/menu/{}/detail", roots[0].id))
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect only direct children
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("data")
        .object()
        .get("id")
        .assert_string(&roots[0].id.to_string());
    body.get("children").array().assert_len(3);

    let resp = cli
        .get(format!("/api/menu/{}/detail", Uuid::now_v7()))
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"errors": [MENU_NOT_FOUND]})).await;
    Ok(())
}

#[sqlx::test]
async fn test_update_menu_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let menus = MenuFactory::new().generate_many(&app_state.db, 2, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // key of the other menu
    let resp = cli
        .patch(format!("/api/menu/{}", menus[0].id))
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"key_menu": menus[1].key_menu, "name": "Menu"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": [MENU_KEY_TAKEN]})).await;

    // When
    let resp = cli
        .patch(format!("/api/menu/{}", menus[0].id))
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"key_menu": "Setting", "name": "Setting", "url": "/setting"}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("message").assert_string("Success to update data menu.");
    let data = body.get("data").object();
    data.get("key_menu").assert_string("setting");
    data.get("url").assert_string("/setting");
    data.get("order_number").assert_i64(1);
    Ok(())
}

#[sqlx::test]
async fn test_change_parent_menu_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let menus = MenuFactory::new().generate_many(&app_state.db, 3, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When move menu 1 and 2 below menu 0
    for menu in &menus[1..] {
        let resp = cli
            .post(format!("/api/menu/change-parent/{}", menu.id))
            .header("cookie", auth_cookie(&test_user.token))
            .body_json(&json!({"menu_id": menus[0].id.to_string()}))
            .send()
            .await;
        resp.assert_status_is_ok();
    }

    // Expect appended in move order
    assert_eq!(
        menu_row(&app_state.db, &menus[1].id).await?,
        (Some(menus[0].id), 1, ActiveState::Active)
    );
    assert_eq!(
        menu_row(&app_state.db, &menus[2].id).await?,
        (Some(menus[0].id), 2, ActiveState::Active)
    );

    // a menu cannot go below its own descendant
    let resp = cli
        .post(format!("/api/menu/change-parent/{}", menus[0].id))
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"menu_id": menus[2].id.to_string()}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"errors": [MENU_CYCLE]})).await;

    // back to the root group, after menu 0
    let resp = cli
        .post(format!("/api/menu/change-parent/{}", menus[2].id))
        .header("cookie", auth_cookie(&test_user.token))
        .body_json(&json!({"menu_id": null}))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(
        menu_row(&app_state.db, &menus[2].id).await?,
        (None, 2, ActiveState::Active)
    );
    Ok(())
}

#[sqlx::test]
async fn test_delete_then_activate_menu_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let test_user =
        generate_test_user(&app_state.db, &config, "budi@gmail.com", "password").await?;
    let menu = MenuFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .delete(format!("/api/menu/{}", menu.id))
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect soft delete
    resp.assert_status_is_ok();
    assert_eq!(menu_row(&app_state.db, &menu.id).await?.2, ActiveState::Inactive);
    let resp = cli
        .get("/api/menu")
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;
    let json = resp.json().await;
    let data = json.value().object().get("data").array();
    data.assert_len(1);
    data.get(0).object().get("active").assert_string("Inactive");

    // When
    let resp = cli
        .post(format!("/api/menu/{}/active", menu.id))
        .header("cookie", auth_cookie(&test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    assert_eq!(menu_row(&app_state.db, &menu.id).await?.2, ActiveState::Active);
    Ok(())
}

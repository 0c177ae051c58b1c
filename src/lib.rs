use std::sync::Arc;

use poem::{
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    EndpointExt, Route,
};
use poem_openapi::OpenApiService;
use r2d2::Pool as r2d2Pool;
use redis::Client;
use route::{auth::ApiAuth, menu::ApiMenu, role::ApiRole, role_menu::ApiRoleMenu, user::ApiUser};
use settings::Config;
use sqlx::{Pool, Postgres};

use crate::core::rate_limit::{RateLimit, RateLimitEndpoint};

pub mod cli;
pub mod core;
pub mod factory;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod settings;

pub struct AppState {
    pub db: Pool<Postgres>,
    /// rate limiter counters
    pub redis_conn: r2d2Pool<Client>,
    pub config: Config,
}

pub type AppEndpoint = CorsEndpoint<RateLimitEndpoint<AddDataEndpoint<Route, Arc<AppState>>>>;

pub fn init_openapi_route(app_state: Arc<AppState>, config: &Config) -> AppEndpoint {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route = OpenApiService::new(
        (ApiAuth, ApiUser, ApiRole, ApiMenu, ApiRoleMenu),
        "Back Office Core",
        "1.0",
    )
    .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    let rate_limit = RateLimit::new(app_state.redis_conn.clone(), config);
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(rate_limit)
        .with(Cors::new())
}

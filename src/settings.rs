use std::env;

use serde::Deserialize;
use tracing::info;

fn default_jwt_exp() -> u16 {
    15
}

fn default_rate_limit_max() -> u32 {
    60
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    /// access token lifetime in minutes, also used as the cookie max-age
    #[serde(default = "default_jwt_exp")]
    pub jwt_exp: u16,
    /// refresh tokens never expire unless this is set
    pub refresh_token_ttl_days: Option<u32>,
    pub redis_url: String,
    /// 0 disables the limiter
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window: u64,
    /// key the limiter on `X-Forwarded-For`, only behind a trusted proxy
    #[serde(default)]
    pub trust_proxy: bool,
    pub default_password: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    Ok(envy::from_env::<Config>()?)
}

pub mod auth;
pub mod common;
pub mod menu;
pub mod role;
pub mod role_menu;
pub mod user;

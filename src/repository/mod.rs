pub mod access_token;
pub mod menu;
pub mod role;
pub mod role_menu;
pub mod user;

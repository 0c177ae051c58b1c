pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod menu;
#[cfg(test)]
mod menu_test;
pub mod role;
pub mod role_menu;
pub mod user;

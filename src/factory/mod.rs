pub mod menu;
pub mod role;
pub mod user;

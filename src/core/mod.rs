pub mod credential;
pub mod db;
pub mod error;
pub mod menu_tree;
pub mod ordering;
pub mod permission;
pub mod rate_limit;
pub mod security;
pub mod session;
pub mod sqlx_utils;
#[cfg(test)]
pub mod test_utils;
pub mod utils;

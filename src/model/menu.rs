use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::active_state::ActiveState;

pub const TABLE_NAME: &str = "public.menu";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Menu {
    pub id: Uuid,
    pub key_menu: String,
    pub name: String,
    pub url: Option<String>,
    /// parent menu, `None` for the root group
    pub menu_id: Option<Uuid>,
    pub order_number: i32,
    pub active: ActiveState,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<FixedOffset>,
}

use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.role_menu";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct RoleMenu {
    pub role_id: Uuid,
    pub menu_id: Uuid,
    pub access: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub approval: bool,
    pub approval_2: bool,
    pub approval_3: bool,
}

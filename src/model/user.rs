use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

use super::active_state::ActiveState;

pub const TABLE_NAME: &str = "public.user";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub active: ActiveState,
    pub role_id: Uuid,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<FixedOffset>,
}

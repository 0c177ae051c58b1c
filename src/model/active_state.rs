use fake::Dummy;
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Dummy, Enum, sqlx::Type,
)]
#[oai(rename_all = "PascalCase")]
#[sqlx(type_name = "active_state")]
pub enum ActiveState {
    #[default]
    Active,
    Inactive,
}

impl ActiveState {
    pub fn is_active(&self) -> bool {
        matches!(self, ActiveState::Active)
    }
}

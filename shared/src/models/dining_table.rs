//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    Active,
    Available,
    Occupied,
    Inactive,
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    pub status: TableStatus,
}

impl DiningTable {
    /// Whether new orders may be placed on (or moved to) this table
    pub fn accepts_orders(&self) -> bool {
        self.status != TableStatus::Inactive
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condominium is the tenant boundary for every other record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condominium {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCondominiumRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_condominium_status")]
    pub status: String,
}

fn default_condominium_status() -> String { "active".to_string() }

/// Canonical condominium status values
pub mod condominium_status {
    pub const ACTIVE: &str = "active";
    pub const INACTIVE: &str = "inactive";

    pub fn is_valid(status: &str) -> bool {
        status == ACTIVE || status == INACTIVE
    }
}

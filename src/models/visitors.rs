use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationType {
    Permanent,
    Recurring,
    Temporary,
    Extended,
    Manual,
}

impl AuthorizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationType::Permanent => "permanent",
            AuthorizationType::Recurring => "recurring",
            AuthorizationType::Temporary => "temporary",
            AuthorizationType::Extended => "extended",
            AuthorizationType::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "permanent" => Some(AuthorizationType::Permanent),
            "recurring" => Some(AuthorizationType::Recurring),
            "temporary" => Some(AuthorizationType::Temporary),
            "extended" => Some(AuthorizationType::Extended),
            "manual" => Some(AuthorizationType::Manual),
            _ => None,
        }
    }

    /// Badge color the gate screen shows for this kind of pass
    pub fn color_code(&self) -> &'static str {
        match self {
            AuthorizationType::Permanent => "green",
            AuthorizationType::Recurring => "blue",
            AuthorizationType::Temporary => "yellow",
            AuthorizationType::Extended => "purple",
            AuthorizationType::Manual => "gray",
        }
    }

    /// Consumed by the first check-in
    pub fn is_single_use(&self) -> bool {
        matches!(self, AuthorizationType::Temporary | AuthorizationType::Manual)
    }
}

/// VisitorAuthorization is a pre-approved pass a guard can check a visitor in against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorAuthorization {
    pub id: i64,
    pub condominium_id: i64,
    pub resident_id: i64,
    pub visitor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_plate: Option<String>,
    pub authorization_type: AuthorizationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub recurring_days: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_from: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_until: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authorization as returned by the API, with derived fields filled in
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationView {
    #[serde(flatten)]
    pub authorization: VisitorAuthorization,
    pub color_code: &'static str,
    pub is_currently_valid: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorizationRequest {
    pub visitor_name: String,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
    pub authorization_type: AuthorizationType,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurring_days: Vec<u8>,
    #[serde(default)]
    pub daily_from: Option<NaiveTime>,
    #[serde(default)]
    pub daily_until: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Admins and guards may issue passes on behalf of a resident
    #[serde(default)]
    pub resident_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationSearchQuery {
    #[serde(default)]
    pub q: String,
}

/// VisitorEntry is one row of the gate log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorEntry {
    pub id: i64,
    pub condominium_id: i64,
    pub visitor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_plate: Option<String>,
    pub destination: String,
    pub entry_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<i64>,
    pub is_authorized: bool,
    pub registered_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Guard's check-in submission; `authorization_id` absent means a walk-in
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub authorization_id: Option<i64>,
    #[serde(default)]
    pub visitor_name: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
    #[serde(default)]
    pub destination: String,
}

/// Fields written for a new gate log row
#[derive(Debug, Clone)]
pub struct NewVisitorEntry {
    pub visitor_name: String,
    pub identification_number: Option<String>,
    pub vehicle_plate: Option<String>,
    pub destination: String,
    pub authorization_id: Option<i64>,
    pub is_authorized: bool,
    pub registered_by: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryListQuery {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

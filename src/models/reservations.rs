use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "approved" => Some(ReservationStatus::Approved),
            "rejected" => Some(ReservationStatus::Rejected),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Pending and approved reservations hold their time range
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Approved)
    }
}

/// Reservation of a common area by a resident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub condominium_id: i64,
    pub area_id: i64,
    pub resident_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub guests_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}

/// Request body for booking an area. `end_time` is auto-filled when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub area_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default = "default_guests")]
    pub guests_count: i32,
    #[serde(default)]
    pub purpose: Option<String>,
    /// Admins may book on behalf of a resident
    #[serde(default)]
    pub resident_id: Option<i64>,
}

fn default_guests() -> i32 {
    1
}

/// Optional reason attached to reject/cancel transitions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationListQuery {
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Filter passed down to the repository
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub resident_id: Option<i64>,
    pub status: Option<ReservationStatus>,
    pub area_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

/// Availability state of a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Limited,
    Full,
    Unavailable,
    Past,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
    pub occupied: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i32>,
    pub is_mine: bool,
}

/// Availability of one area on one date
#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub area_id: i64,
    pub date: NaiveDate,
    pub behavior: super::AreaBehavior,
    pub open: bool,
    pub bookable: bool,
    pub slots: Vec<Slot>,
}

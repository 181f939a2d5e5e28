use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// CondominiumSettings is the per-tenant configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondominiumSettings {
    /// IANA zone used for every "now" comparison in this condominium
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub reservations: ReservationSettings,
    #[serde(default)]
    pub visits: VisitSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for CondominiumSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            working_hours: WorkingHours::default(),
            reservations: ReservationSettings::default(),
            visits: VisitSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Active reservations one resident may hold for a single area on a single
    /// date. Bookings in other areas are counted separately. 0 disables the cap.
    #[serde(default = "default_max_per_user_per_day")]
    pub max_per_user_per_day: u32,
    #[serde(default = "default_slot_minutes")]
    pub default_slot_minutes: u32,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_per_user_per_day: default_max_per_user_per_day(),
            default_slot_minutes: default_slot_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_checkin_dedup_seconds")]
    pub checkin_dedup_seconds: u64,
    #[serde(default = "default_true")]
    pub allow_manual_entries: bool,
}

impl Default for VisitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            checkin_dedup_seconds: default_checkin_dedup_seconds(),
            allow_manual_entries: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default)]
    pub push_enabled: bool,
}

fn default_true() -> bool { true }
fn default_max_per_user_per_day() -> u32 { 1 }
fn default_slot_minutes() -> u32 { 60 }
fn default_checkin_dedup_seconds() -> u64 { 5 }

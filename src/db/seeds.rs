//! Default data written on first boot.

use chrono::NaiveTime;

use crate::models::*;

pub const DEFAULT_CONDOMINIUM: &str = "Default Condominium";
pub const SUPERADMIN_USERNAME: &str = "superadmin";
pub const ADMIN_USERNAME: &str = "admin";

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Sample areas for the default condominium, one per behavior
pub fn seed_area_params() -> Vec<CreateAreaRequest> {
    vec![
        CreateAreaRequest {
            name: "Event Hall".to_string(),
            area_type: "hall".to_string(),
            capacity: 60,
            behavior: AreaBehavior::Exclusive,
            allowed_days: vec![0, 1, 2, 3, 4, 5, 6],
            available_from: hm(10, 0),
            available_until: hm(23, 0),
            slot_minutes: Some(60),
            requires_approval: true,
            max_hours_per_reservation: Some(6),
            rules: Some("Music must stop at 22:00. Cleaning is the host's responsibility.".to_string()),
            is_active: true,
        },
        CreateAreaRequest {
            name: "Pool".to_string(),
            area_type: "pool".to_string(),
            capacity: 8,
            behavior: AreaBehavior::Capacity,
            allowed_days: vec![0, 2, 3, 4, 5, 6],
            available_from: hm(8, 0),
            available_until: hm(20, 0),
            slot_minutes: Some(60),
            requires_approval: false,
            max_hours_per_reservation: Some(2),
            rules: None,
            is_active: true,
        },
        CreateAreaRequest {
            name: "Tennis Court".to_string(),
            area_type: "court".to_string(),
            capacity: 4,
            behavior: AreaBehavior::SlotBased,
            allowed_days: vec![0, 1, 2, 3, 4, 5, 6],
            available_from: hm(7, 0),
            available_until: hm(21, 0),
            slot_minutes: Some(90),
            requires_approval: false,
            max_hours_per_reservation: None,
            rules: None,
            is_active: true,
        },
        CreateAreaRequest {
            name: "Gym".to_string(),
            area_type: "gym".to_string(),
            capacity: 0,
            behavior: AreaBehavior::FreeAccess,
            allowed_days: vec![0, 1, 2, 3, 4, 5, 6],
            available_from: hm(5, 0),
            available_until: hm(23, 0),
            slot_minutes: None,
            requires_approval: false,
            max_hours_per_reservation: None,
            rules: None,
            is_active: true,
        },
    ]
}

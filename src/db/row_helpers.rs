use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None; optional text columns store '' rather than NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Decode a JSON array column of weekday numbers
fn weekdays(row: &SqliteRow, column: &str) -> Vec<u8> {
    let json: String = row.get(column);
    serde_json::from_str(&json).unwrap_or_default()
}

/// Decode a text enum column, falling back (with a warning) on values this build does not know
fn parse_column<T>(row: &SqliteRow, column: &str, parse: fn(&str) -> Option<T>, fallback: T) -> T {
    let value: String = row.get(column);
    parse(&value).unwrap_or_else(|| {
        let id: i64 = row.try_get("id").unwrap_or_default();
        tracing::warn!("Row {}: unknown {} '{}', using the default", id, column, value);
        fallback
    })
}

/// Map a SQLite row to a User struct
pub fn map_user_row(row: &SqliteRow) -> User {
    let enabled: i32 = row.get("enabled");
    User {
        id: row.get("id"),
        condominium_id: row.try_get::<Option<i64>, _>("condominium_id").ok().flatten(),
        username: row.get("username"),
        full_name: row.get("full_name"),
        role: parse_column(row, "role", Role::parse, Role::Resident),
        unit: none_if_empty(row.get("unit")),
        password_hash: row.get("password_hash"),
        enabled: enabled == 1,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a Condominium struct
pub fn map_condominium_row(row: &SqliteRow) -> Condominium {
    Condominium {
        id: row.get("id"),
        name: row.get("name"),
        address: none_if_empty(row.get("address")),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a ReservationArea struct
pub fn map_area_row(row: &SqliteRow) -> ReservationArea {
    let requires_approval: i32 = row.get("requires_approval");
    let is_active: i32 = row.get("is_active");
    let slot_minutes: i64 = row.get("slot_minutes");
    ReservationArea {
        id: row.get("id"),
        condominium_id: row.get("condominium_id"),
        name: row.get("name"),
        area_type: row.get("area_type"),
        capacity: row.get("capacity"),
        behavior: parse_column(row, "behavior", AreaBehavior::parse, AreaBehavior::Exclusive),
        allowed_days: weekdays(row, "allowed_days"),
        available_from: row.get("available_from"),
        available_until: row.get("available_until"),
        slot_minutes: slot_minutes.max(0) as u32,
        requires_approval: requires_approval == 1,
        max_hours_per_reservation: row
            .try_get::<Option<i64>, _>("max_hours_per_reservation")
            .ok()
            .flatten()
            .map(|h| h.max(0) as u32),
        rules: none_if_empty(row.get("rules")),
        is_active: is_active == 1,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a Reservation struct
pub fn map_reservation_row(row: &SqliteRow) -> Reservation {
    Reservation {
        id: row.get("id"),
        condominium_id: row.get("condominium_id"),
        area_id: row.get("area_id"),
        resident_id: row.get("resident_id"),
        date: row.get("date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        guests_count: row.get("guests_count"),
        purpose: none_if_empty(row.get("purpose")),
        status: parse_column(row, "status", ReservationStatus::parse, ReservationStatus::Pending),
        cancellation_reason: none_if_empty(row.get("cancellation_reason")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a VisitorAuthorization struct
pub fn map_authorization_row(row: &SqliteRow) -> VisitorAuthorization {
    let is_active: i32 = row.get("is_active");
    VisitorAuthorization {
        id: row.get("id"),
        condominium_id: row.get("condominium_id"),
        resident_id: row.get("resident_id"),
        visitor_name: row.get("visitor_name"),
        identification_number: none_if_empty(row.get("identification_number")),
        vehicle_plate: none_if_empty(row.get("vehicle_plate")),
        authorization_type: parse_column(row, "authorization_type", AuthorizationType::parse, AuthorizationType::Manual),
        valid_from: row.get("valid_from"),
        valid_until: row.get("valid_until"),
        recurring_days: weekdays(row, "recurring_days"),
        daily_from: row.get("daily_from"),
        daily_until: row.get("daily_until"),
        notes: none_if_empty(row.get("notes")),
        used_at: row.get("used_at"),
        is_active: is_active == 1,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a VisitorEntry struct
pub fn map_entry_row(row: &SqliteRow) -> VisitorEntry {
    let is_authorized: i32 = row.get("is_authorized");
    VisitorEntry {
        id: row.get("id"),
        condominium_id: row.get("condominium_id"),
        visitor_name: row.get("visitor_name"),
        identification_number: none_if_empty(row.get("identification_number")),
        vehicle_plate: none_if_empty(row.get("vehicle_plate")),
        destination: row.get("destination"),
        entry_at: row.get("entry_at"),
        exit_at: row.get("exit_at"),
        authorization_id: row.try_get::<Option<i64>, _>("authorization_id").ok().flatten(),
        is_authorized: is_authorized == 1,
        registered_by: row.get("registered_by"),
        created_at: row.get("created_at"),
    }
}

//! Booking rules: what a resident may reserve, and which status moves are legal.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use super::{add_minutes_clamped, clip_to_hours, is_open_on, overlaps, slot_bounds, slot_width};
use crate::models::*;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("area is not active")]
    AreaInactive,
    #[error("area does not take reservations")]
    FreeAccess,
    #[error("reservations are disabled for this condominium")]
    ReservationsDisabled,
    #[error("area is closed on the requested date")]
    DayNotAllowed,
    #[error("reservation must be within operating hours ({from} - {until})")]
    OutsideHours { from: NaiveTime, until: NaiveTime },
    #[error("end time must be after start time")]
    InvalidRange,
    #[error("reservation must start in the future")]
    InPast,
    #[error("reservation exceeds the maximum of {0} hours")]
    TooLong(u32),
    #[error("reservation must cover exactly one slot")]
    NotSlotAligned,
    #[error("guests count must be between 1 and {0}")]
    InvalidGuests(i32),
    #[error("daily reservation limit of {0} reached for this area")]
    DailyLimitReached(u32),
    #[error("time range overlaps an existing reservation")]
    Conflict,
    #[error("area is at full capacity for the requested time")]
    Full,
    #[error("reservation cannot be cancelled after it has started")]
    AlreadyStarted,
    #[error("cannot {action} a {status} reservation")]
    InvalidTransition { action: &'static str, status: &'static str },
}

impl BookingError {
    /// Violations caused by competing state rather than a malformed request
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BookingError::DailyLimitReached(_)
                | BookingError::Conflict
                | BookingError::Full
                | BookingError::AlreadyStarted
                | BookingError::InvalidTransition { .. }
        )
    }
}

/// A fully resolved booking attempt
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub resident_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub guests_count: i32,
}

/// Fill in or clip the end time the way the booking form does.
///
/// Without an explicit end: one slot for `slot_based` areas, otherwise the
/// area's maximum duration (or one slot when unlimited). Always clipped to
/// closing time.
pub fn resolve_end_time(area: &ReservationArea, start: NaiveTime, requested: Option<NaiveTime>) -> NaiveTime {
    if let Some(end) = requested {
        return end.min(area.available_until);
    }
    let minutes = match (area.behavior, area.max_hours_per_reservation) {
        (AreaBehavior::SlotBased, _) | (_, None) => slot_width(area) as i64,
        (_, Some(hours)) => hours as i64 * 60,
    };
    add_minutes_clamped(start, minutes, area.available_until)
}

/// Highest number of reservations held at the same instant inside `[start, end)`
pub fn peak_occupancy(others: &[Reservation], start: NaiveTime, end: NaiveTime) -> u32 {
    let mut events: Vec<(NaiveTime, i32)> = Vec::new();
    for r in others.iter().filter(|r| r.status.is_active()) {
        if overlaps(start, end, r.start_time, r.end_time) {
            events.push((r.start_time.max(start), 1));
            events.push((r.end_time.min(end), -1));
        }
    }
    // releases sort before acquisitions at the same instant
    events.sort();

    let mut current = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    peak as u32
}

/// Check a time range against the other active reservations of the same area and date
pub fn check_occupancy(
    area: &ReservationArea,
    others: &[Reservation],
    start: NaiveTime,
    end: NaiveTime,
) -> Result<(), BookingError> {
    let clipped: Vec<Reservation> = others
        .iter()
        .filter(|r| r.status.is_active())
        .filter_map(|r| {
            clip_to_hours(area, r.start_time, r.end_time).map(|(s, e)| Reservation {
                start_time: s,
                end_time: e,
                ..r.clone()
            })
        })
        .collect();

    match area.behavior {
        AreaBehavior::Capacity => {
            if peak_occupancy(&clipped, start, end) as i32 >= area.capacity {
                return Err(BookingError::Full);
            }
        }
        AreaBehavior::Exclusive | AreaBehavior::SlotBased => {
            if clipped.iter().any(|r| overlaps(start, end, r.start_time, r.end_time)) {
                return Err(BookingError::Conflict);
            }
        }
        AreaBehavior::FreeAccess => return Err(BookingError::FreeAccess),
    }
    Ok(())
}

/// Validate a booking against the area, the condominium settings and the
/// day's existing active reservations for that area. `now` is local time.
pub fn validate_booking(
    area: &ReservationArea,
    settings: &CondominiumSettings,
    existing: &[Reservation],
    req: &BookingRequest,
    now: NaiveDateTime,
) -> Result<(), BookingError> {
    if area.behavior == AreaBehavior::FreeAccess {
        return Err(BookingError::FreeAccess);
    }
    if !area.is_active {
        return Err(BookingError::AreaInactive);
    }
    if !settings.reservations.enabled {
        return Err(BookingError::ReservationsDisabled);
    }
    if !is_open_on(area, req.date) {
        return Err(BookingError::DayNotAllowed);
    }
    if req.end_time <= req.start_time {
        return Err(BookingError::InvalidRange);
    }
    if req.start_time < area.available_from || req.end_time > area.available_until {
        return Err(BookingError::OutsideHours {
            from: area.available_from,
            until: area.available_until,
        });
    }
    if req.date.and_time(req.start_time) <= now {
        return Err(BookingError::InPast);
    }
    if let Some(max_hours) = area.max_hours_per_reservation {
        if (req.end_time - req.start_time).num_minutes() > max_hours as i64 * 60 {
            return Err(BookingError::TooLong(max_hours));
        }
    }
    if area.behavior == AreaBehavior::SlotBased
        && !slot_bounds(area).contains(&(req.start_time, req.end_time))
    {
        return Err(BookingError::NotSlotAligned);
    }

    let guest_cap = match area.behavior {
        AreaBehavior::Exclusive | AreaBehavior::SlotBased if area.capacity > 0 => area.capacity,
        _ => i32::MAX,
    };
    if req.guests_count < 1 || req.guests_count > guest_cap {
        return Err(BookingError::InvalidGuests(guest_cap));
    }

    let same_day: Vec<Reservation> = existing
        .iter()
        .filter(|r| r.area_id == area.id && r.date == req.date && r.status.is_active())
        .cloned()
        .collect();

    let limit = settings.reservations.max_per_user_per_day;
    if limit > 0 {
        let mine = same_day.iter().filter(|r| r.resident_id == req.resident_id).count() as u32;
        if mine >= limit {
            return Err(BookingError::DailyLimitReached(limit));
        }
    }

    check_occupancy(area, &same_day, req.start_time, req.end_time)
}

/// pending -> approved
pub fn check_approve(reservation: &Reservation) -> Result<(), BookingError> {
    match reservation.status {
        ReservationStatus::Pending => Ok(()),
        other => Err(BookingError::InvalidTransition { action: "approve", status: other.as_str() }),
    }
}

/// pending -> rejected
pub fn check_reject(reservation: &Reservation) -> Result<(), BookingError> {
    match reservation.status {
        ReservationStatus::Pending => Ok(()),
        other => Err(BookingError::InvalidTransition { action: "reject", status: other.as_str() }),
    }
}

/// pending|approved -> cancelled, only before the reservation starts
pub fn check_cancel(reservation: &Reservation, now: NaiveDateTime) -> Result<(), BookingError> {
    if !reservation.status.is_active() {
        return Err(BookingError::InvalidTransition {
            action: "cancel",
            status: reservation.status.as_str(),
        });
    }
    if now >= reservation.starts_at() {
        return Err(BookingError::AlreadyStarted);
    }
    Ok(())
}

//! Slot computation for reservable areas.
//!
//! An area's operating window is cut into fixed-width slots and each slot is
//! scored against the active reservations of the day. How a slot is scored
//! depends on the area's [`AreaBehavior`].

pub mod rules;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::*;
use crate::utils::weekday_number;

const FALLBACK_SLOT_MINUTES: u32 = 60;

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// Add minutes to a time of day, saturating at `limit` instead of wrapping past midnight
pub fn add_minutes_clamped(start: NaiveTime, minutes: i64, limit: NaiveTime) -> NaiveTime {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(minutes));
    if wrapped != 0 || end > limit {
        limit
    } else {
        end
    }
}

pub fn slot_width(area: &ReservationArea) -> u32 {
    if area.slot_minutes == 0 {
        FALLBACK_SLOT_MINUTES
    } else {
        area.slot_minutes
    }
}

/// Partition the operating window into slots; the last slot is clipped to closing time
pub fn slot_bounds(area: &ReservationArea) -> Vec<(NaiveTime, NaiveTime)> {
    let width = slot_width(area) as i64;
    let mut slots = Vec::new();
    let mut cursor = area.available_from;
    while cursor < area.available_until {
        let end = add_minutes_clamped(cursor, width, area.available_until);
        slots.push((cursor, end));
        cursor = end;
    }
    slots
}

/// Whether the area opens on the given date
pub fn is_open_on(area: &ReservationArea, date: NaiveDate) -> bool {
    area.allowed_days.contains(&weekday_number(date))
}

/// Clip a reservation to the operating window. `None` when nothing is left.
pub fn clip_to_hours(area: &ReservationArea, start: NaiveTime, end: NaiveTime) -> Option<(NaiveTime, NaiveTime)> {
    let start = start.max(area.available_from);
    let end = end.min(area.available_until);
    (start < end).then_some((start, end))
}

fn capacity_status(capacity: i32, occupied: u32) -> (SlotStatus, i32) {
    let remaining = capacity - occupied as i32;
    let low_water = (capacity / 4).max(1);
    let status = if remaining <= 0 {
        SlotStatus::Full
    } else if remaining <= low_water {
        SlotStatus::Limited
    } else {
        SlotStatus::Available
    };
    (status, remaining.max(0))
}

/// Compute slot availability for one area on one date.
///
/// `reservations` may contain rows for other areas, dates or inactive
/// statuses; they are ignored. `now` is the condominium's local time.
pub fn compute_day(
    area: &ReservationArea,
    date: NaiveDate,
    reservations: &[Reservation],
    now: NaiveDateTime,
    viewer: Option<i64>,
) -> DayAvailability {
    let open = is_open_on(area, date);
    let mut day = DayAvailability {
        area_id: area.id,
        date,
        behavior: area.behavior,
        open,
        bookable: open && area.is_active && area.behavior != AreaBehavior::FreeAccess,
        slots: Vec::new(),
    };

    if area.behavior == AreaBehavior::FreeAccess || !open {
        return day;
    }

    let held: Vec<(NaiveTime, NaiveTime, i64)> = reservations
        .iter()
        .filter(|r| r.area_id == area.id && r.date == date && r.status.is_active())
        .filter_map(|r| clip_to_hours(area, r.start_time, r.end_time).map(|(s, e)| (s, e, r.resident_id)))
        .collect();

    for (start, end) in slot_bounds(area) {
        let overlapping: Vec<&(NaiveTime, NaiveTime, i64)> = held
            .iter()
            .filter(|(s, e, _)| overlaps(start, end, *s, *e))
            .collect();
        let occupied = overlapping.len() as u32;
        let is_mine = viewer.is_some_and(|v| overlapping.iter().any(|(_, _, owner)| *owner == v));

        let (status, remaining) = match area.behavior {
            AreaBehavior::Capacity => {
                let (status, remaining) = capacity_status(area.capacity, occupied);
                (status, Some(remaining))
            }
            _ if occupied > 0 => (SlotStatus::Unavailable, None),
            _ => (SlotStatus::Available, None),
        };

        let is_past = date < now.date() || (date == now.date() && start <= now.time());

        day.slots.push(Slot {
            start_time: start,
            end_time: end,
            status: if is_past { SlotStatus::Past } else { status },
            occupied,
            remaining,
            is_mine,
        });
    }

    day
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// A Monday
    pub(crate) fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    pub(crate) fn area(behavior: AreaBehavior) -> ReservationArea {
        ReservationArea {
            id: 1,
            condominium_id: 1,
            name: "Pool".into(),
            area_type: "pool".into(),
            capacity: 4,
            behavior,
            allowed_days: vec![1, 2, 3, 4, 5],
            available_from: t(8, 0),
            available_until: t(12, 0),
            slot_minutes: 60,
            requires_approval: false,
            max_hours_per_reservation: Some(2),
            rules: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn reservation(id: i64, resident: i64, start: NaiveTime, end: NaiveTime) -> Reservation {
        Reservation {
            id,
            condominium_id: 1,
            area_id: 1,
            resident_id: resident,
            date: monday(),
            start_time: start,
            end_time: end,
            guests_count: 1,
            purpose: None,
            status: ReservationStatus::Approved,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn early_morning() -> NaiveDateTime {
        monday().and_time(t(6, 0))
    }

    #[test]
    fn test_slot_bounds_clips_last_slot() {
        let mut a = area(AreaBehavior::Exclusive);
        a.slot_minutes = 90;
        let slots = slot_bounds(&a);
        assert_eq!(slots, vec![(t(8, 0), t(9, 30)), (t(9, 30), t(11, 0)), (t(11, 0), t(12, 0))]);
    }

    #[test]
    fn test_slot_bounds_does_not_wrap_midnight() {
        let mut a = area(AreaBehavior::Exclusive);
        a.available_from = t(22, 0);
        a.available_until = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        let slots = slot_bounds(&a);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].1, a.available_until);
    }

    #[test]
    fn test_exclusive_marks_overlapping_slots() {
        let a = area(AreaBehavior::Exclusive);
        let existing = vec![reservation(1, 7, t(9, 30), t(10, 30))];
        let day = compute_day(&a, monday(), &existing, early_morning(), Some(7));

        let statuses: Vec<SlotStatus> = day.slots.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![SlotStatus::Available, SlotStatus::Unavailable, SlotStatus::Unavailable, SlotStatus::Available]
        );
        assert!(day.slots[1].is_mine);
        assert!(!day.slots[0].is_mine);
        assert!(day.bookable);
    }

    #[test]
    fn test_capacity_counts_remaining() {
        let a = area(AreaBehavior::Capacity);
        let existing = vec![
            reservation(1, 2, t(8, 0), t(10, 0)),
            reservation(2, 3, t(8, 0), t(9, 0)),
            reservation(3, 4, t(8, 0), t(9, 0)),
            reservation(4, 5, t(8, 0), t(9, 0)),
        ];
        let day = compute_day(&a, monday(), &existing, early_morning(), None);

        assert_eq!(day.slots[0].status, SlotStatus::Full);
        assert_eq!(day.slots[0].remaining, Some(0));
        // capacity 4, one left is the low-water mark
        assert_eq!(day.slots[1].status, SlotStatus::Available);
        assert_eq!(day.slots[1].remaining, Some(3));
        assert_eq!(day.slots[2].status, SlotStatus::Available);
    }

    #[test]
    fn test_capacity_limited_threshold() {
        let a = area(AreaBehavior::Capacity);
        let existing = vec![
            reservation(1, 2, t(8, 0), t(9, 0)),
            reservation(2, 3, t(8, 0), t(9, 0)),
            reservation(3, 4, t(8, 0), t(9, 0)),
        ];
        let day = compute_day(&a, monday(), &existing, early_morning(), None);
        assert_eq!(day.slots[0].status, SlotStatus::Limited);
        assert_eq!(day.slots[0].remaining, Some(1));
    }

    #[test]
    fn test_inactive_reservations_ignored() {
        let a = area(AreaBehavior::Exclusive);
        let mut cancelled = reservation(1, 2, t(8, 0), t(9, 0));
        cancelled.status = ReservationStatus::Cancelled;
        let mut other_area = reservation(2, 2, t(9, 0), t(10, 0));
        other_area.area_id = 99;
        let day = compute_day(&a, monday(), &[cancelled, other_area], early_morning(), None);
        assert!(day.slots.iter().all(|s| s.status == SlotStatus::Available));
    }

    #[test]
    fn test_reservation_past_closing_is_clipped() {
        let a = area(AreaBehavior::Exclusive);
        let existing = vec![reservation(1, 2, t(11, 30), t(14, 0))];
        let day = compute_day(&a, monday(), &existing, early_morning(), None);
        assert_eq!(day.slots.len(), 4);
        assert_eq!(day.slots[3].status, SlotStatus::Unavailable);
        assert_eq!(day.slots[3].occupied, 1);
    }

    #[test]
    fn test_closed_day_has_no_slots() {
        let a = area(AreaBehavior::Exclusive);
        let sunday = monday() - Duration::days(1);
        let day = compute_day(&a, sunday, &[], early_morning(), None);
        assert!(!day.open);
        assert!(!day.bookable);
        assert!(day.slots.is_empty());
    }

    #[test]
    fn test_free_access_has_no_slots() {
        let a = area(AreaBehavior::FreeAccess);
        let day = compute_day(&a, monday(), &[], early_morning(), None);
        assert!(day.open);
        assert!(!day.bookable);
        assert!(day.slots.is_empty());
    }

    #[test]
    fn test_past_slots_today() {
        let a = area(AreaBehavior::SlotBased);
        let now = monday().and_time(t(9, 15));
        let day = compute_day(&a, monday(), &[], now, None);
        let statuses: Vec<SlotStatus> = day.slots.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![SlotStatus::Past, SlotStatus::Past, SlotStatus::Available, SlotStatus::Available]
        );
    }

    #[test]
    fn test_add_minutes_clamped() {
        assert_eq!(add_minutes_clamped(t(10, 0), 90, t(12, 0)), t(11, 30));
        assert_eq!(add_minutes_clamped(t(11, 0), 90, t(12, 0)), t(12, 0));
        assert_eq!(add_minutes_clamped(t(23, 0), 120, t(23, 30)), t(23, 30));
    }
}

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::models::CondominiumSettings;

/// Normalize a vehicle plate: uppercase, alphanumerics only ("abc-123" -> "ABC123")
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize an identification number: drop separators, uppercase check letters
pub fn normalize_identification(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Lowercase and strip common Latin diacritics so "José Peña" matches "jose pena"
pub fn fold_text(s: &str) -> String {
    s.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim and drop blank optional strings
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Weekday number with 0 = Sunday, matching `allowed_days` and `recurring_days`
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Parse an IANA zone name such as "America/Santiago"
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// The condominium's zone, UTC when the stored name is unknown
pub fn condominium_tz(settings: &CondominiumSettings) -> Tz {
    parse_timezone(&settings.timezone).unwrap_or_else(|| {
        tracing::warn!("Unknown timezone '{}', using UTC", settings.timezone);
        Tz::UTC
    })
}

/// Condominium wall-clock time for a UTC instant
pub fn to_local(settings: &CondominiumSettings, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&condominium_tz(settings)).naive_local()
}

/// Condominium wall-clock time right now
pub fn local_now(settings: &CondominiumSettings) -> NaiveDateTime {
    to_local(settings, Utc::now())
}

/// First instant of a local date. Zones that skip midnight for DST start the
/// day at the first wall-clock hour that exists.
fn local_day_start(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..3)
        .find_map(|h| (midnight + Duration::hours(h)).and_local_timezone(tz).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Start and end (exclusive) of a local calendar day, expressed in UTC
pub fn local_day_bounds(settings: &CondominiumSettings, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = condominium_tz(settings);
    let next = date.succ_opt().unwrap_or(date);
    (local_day_start(date, tz), local_day_start(next, tz))
}

/// Valid weekday numbers are 0..=6
pub fn valid_weekdays(days: &[u8]) -> bool {
    days.iter().all(|d| *d <= 6)
}

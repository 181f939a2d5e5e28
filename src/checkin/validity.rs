use chrono::{DateTime, Utc};

use crate::models::*;
use crate::utils::{to_local, weekday_number};

fn within_bounds(auth: &VisitorAuthorization, now: DateTime<Utc>) -> bool {
    auth.valid_from.map_or(true, |from| now >= from) && auth.valid_until.map_or(true, |until| now <= until)
}

/// Whether a guard may check a visitor in against this authorization right now
pub fn is_currently_valid(auth: &VisitorAuthorization, settings: &CondominiumSettings, now: DateTime<Utc>) -> bool {
    if !auth.is_active {
        return false;
    }

    match auth.authorization_type {
        AuthorizationType::Permanent => true,
        AuthorizationType::Temporary | AuthorizationType::Manual => {
            auth.used_at.is_none() && within_bounds(auth, now)
        }
        AuthorizationType::Extended => within_bounds(auth, now),
        AuthorizationType::Recurring => {
            if !within_bounds(auth, now) {
                return false;
            }
            let local = to_local(settings, now);
            if !auth.recurring_days.contains(&weekday_number(local.date())) {
                return false;
            }
            let time = local.time();
            auth.daily_from.map_or(true, |from| time >= from)
                && auth.daily_until.map_or(true, |until| time <= until)
        }
    }
}

/// Attach the derived fields the API exposes
pub fn view(auth: VisitorAuthorization, settings: &CondominiumSettings, now: DateTime<Utc>) -> AuthorizationView {
    let is_currently_valid = is_currently_valid(&auth, settings, now);
    AuthorizationView {
        color_code: auth.authorization_type.color_code(),
        is_currently_valid,
        authorization: auth,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, TimeZone};

    pub(crate) fn authorization(kind: AuthorizationType) -> VisitorAuthorization {
        VisitorAuthorization {
            id: 1,
            condominium_id: 1,
            resident_id: 10,
            visitor_name: "José Peña".into(),
            identification_number: Some("12345678K".into()),
            vehicle_plate: Some("ABC123".into()),
            authorization_type: kind,
            valid_from: None,
            valid_until: None,
            recurring_days: vec![],
            daily_from: None,
            daily_until: None,
            notes: None,
            used_at: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Monday 2026-10-19 15:00 UTC
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_permanent_until_revoked() {
        let settings = CondominiumSettings::default();
        let mut a = authorization(AuthorizationType::Permanent);
        a.used_at = Some(now());
        assert!(is_currently_valid(&a, &settings, now()));
        a.is_active = false;
        assert!(!is_currently_valid(&a, &settings, now()));
    }

    #[test]
    fn test_temporary_single_use_window() {
        let settings = CondominiumSettings::default();
        let mut a = authorization(AuthorizationType::Temporary);
        a.valid_from = Some(now() - Duration::hours(1));
        a.valid_until = Some(now() + Duration::hours(1));
        assert!(is_currently_valid(&a, &settings, now()));

        assert!(!is_currently_valid(&a, &settings, now() + Duration::hours(2)));

        a.used_at = Some(now());
        assert!(!is_currently_valid(&a, &settings, now()));
    }

    #[test]
    fn test_extended_is_reusable() {
        let settings = CondominiumSettings::default();
        let mut a = authorization(AuthorizationType::Extended);
        a.valid_from = Some(now() - Duration::days(2));
        a.valid_until = Some(now() + Duration::days(2));
        a.used_at = Some(now() - Duration::days(1));
        assert!(is_currently_valid(&a, &settings, now()));
    }

    #[test]
    fn test_recurring_days_and_window() {
        let settings = CondominiumSettings::default();
        let mut a = authorization(AuthorizationType::Recurring);
        a.recurring_days = vec![1, 3];
        a.daily_from = NaiveTime::from_hms_opt(9, 0, 0);
        a.daily_until = NaiveTime::from_hms_opt(17, 0, 0);
        assert!(is_currently_valid(&a, &settings, now()));
        assert!(!is_currently_valid(&a, &settings, now() + Duration::hours(3)));
        assert!(!is_currently_valid(&a, &settings, now() + Duration::days(1)));
    }

    #[test]
    fn test_recurring_uses_local_weekday() {
        // 02:00 UTC Tuesday is still Monday evening in Bogota
        let settings = CondominiumSettings {
            timezone: "America/Bogota".into(),
            ..Default::default()
        };
        let mut a = authorization(AuthorizationType::Recurring);
        a.recurring_days = vec![1];
        let late = Utc.with_ymd_and_hms(2026, 10, 20, 2, 0, 0).unwrap();
        assert!(is_currently_valid(&a, &settings, late));
        assert!(!is_currently_valid(&a, &CondominiumSettings::default(), late));
    }

    #[test]
    fn test_view_colors() {
        let settings = CondominiumSettings::default();
        let v = view(authorization(AuthorizationType::Extended), &settings, now());
        assert_eq!(v.color_code, "purple");
        assert!(v.is_currently_valid);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["color_code"], "purple");
        assert_eq!(json["visitor_name"], "José Peña");
    }
}

use chrono::{DateTime, Utc};

use super::validity::{is_currently_valid, view};
use crate::models::*;
use crate::utils::{fold_text, normalize_identification, normalize_plate};

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_RESULTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    ExactDocument,
    NamePrefix,
    Partial,
}

fn rank(auth: &VisitorAuthorization, folded_query: &str, id_query: &str, plate_query: &str) -> Option<MatchRank> {
    let id = auth.identification_number.as_deref().map(normalize_identification).unwrap_or_default();
    let plate = auth.vehicle_plate.as_deref().map(normalize_plate).unwrap_or_default();

    if (!id_query.is_empty() && id == id_query) || (!plate_query.is_empty() && plate == plate_query) {
        return Some(MatchRank::ExactDocument);
    }

    let name = fold_text(&auth.visitor_name);
    if name.starts_with(folded_query) || name.split(' ').any(|word| word.starts_with(folded_query)) {
        return Some(MatchRank::NamePrefix);
    }
    if name.contains(folded_query) {
        return Some(MatchRank::Partial);
    }
    if id_query.len() >= 3 && id.contains(id_query) {
        return Some(MatchRank::Partial);
    }
    if plate_query.len() >= 3 && plate.contains(plate_query) {
        return Some(MatchRank::Partial);
    }
    None
}

/// Find authorizations a guard can check in against, best matches first.
///
/// Only currently valid passes are returned, so a consumed single-use pass
/// drops out of the results as soon as its check-in lands.
pub fn search(
    authorizations: Vec<VisitorAuthorization>,
    query: &str,
    settings: &CondominiumSettings,
    now: DateTime<Utc>,
) -> Vec<AuthorizationView> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let folded_query = fold_text(query);
    let id_query = normalize_identification(query);
    let plate_query = normalize_plate(query);

    let mut ranked: Vec<(MatchRank, String, VisitorAuthorization)> = authorizations
        .into_iter()
        .filter(|a| is_currently_valid(a, settings, now))
        .filter_map(|a| {
            rank(&a, &folded_query, &id_query, &plate_query).map(|r| (r, fold_text(&a.visitor_name), a))
        })
        .collect();

    ranked.sort_by(|a, b| (a.0, &a.1, a.2.id).cmp(&(b.0, &b.1, b.2.id)));

    ranked
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, _, a)| view(a, settings, now))
        .collect()
}

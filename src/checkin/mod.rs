pub mod matching;
pub mod validity;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::*;
use crate::utils::{fold_text, normalize_identification};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckinError {
    #[error("check-in already in progress")]
    InProgress,
    #[error("authorization already used")]
    AlreadyUsed,
    #[error("authorization is not valid at this time")]
    NotValid,
    #[error("visitor check-in is disabled for this condominium")]
    VisitsDisabled,
    #[error("manual entries are disabled for this condominium")]
    ManualEntriesDisabled,
    #[error("visitor_name is required")]
    MissingVisitor,
    #[error("visitor already checked out")]
    AlreadyCheckedOut,
}

impl CheckinError {
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CheckinError::InProgress | CheckinError::AlreadyUsed | CheckinError::AlreadyCheckedOut
        )
    }
}

/// Gate-side rules for checking a visitor in against an authorization
pub fn check_authorization(
    auth: &VisitorAuthorization,
    settings: &CondominiumSettings,
    now: DateTime<Utc>,
) -> Result<(), CheckinError> {
    if auth.authorization_type.is_single_use() && auth.used_at.is_some() {
        return Err(CheckinError::AlreadyUsed);
    }
    if !validity::is_currently_valid(auth, settings, now) {
        return Err(CheckinError::NotValid);
    }
    Ok(())
}

/// Guard key for a check-in against a stored authorization
pub fn authorization_key(condominium_id: i64, authorization_id: i64) -> String {
    format!("{}:auth:{}", condominium_id, authorization_id)
}

/// Guard key for a walk-in: the document number, or the visitor's name when absent
pub fn walk_in_key(condominium_id: i64, visitor_name: &str, identification: Option<&str>) -> String {
    let who = identification
        .map(normalize_identification)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fold_text(visitor_name));
    format!("{}:walkin:{}", condominium_id, who)
}

/// Longest a single claim is held, whatever the configured window
pub const MAX_CLAIM_TTL: Duration = Duration::from_secs(3600);

/// Short-lived record of check-ins being processed, so a double-tapped
/// submit does not create two gate entries.
pub struct RecentCheckins {
    entries: Mutex<HashMap<String, Instant>>,
}

impl RecentCheckins {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim `key` for `ttl`. Returns false while an earlier claim is still live.
    pub fn try_claim(&self, key: &str, ttl: Duration) -> bool {
        self.try_claim_at(key, ttl, Instant::now())
    }

    fn try_claim_at(&self, key: &str, ttl: Duration, now: Instant) -> bool {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(expires_at) if *expires_at > now => false,
            _ => {
                let expires_at = now.checked_add(ttl.min(MAX_CLAIM_TTL)).unwrap_or(now);
                entries.insert(key.to_string(), expires_at);
                true
            }
        }
    }

    /// Drop a claim early, e.g. when the check-in it guarded failed
    pub fn release(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Remove expired claims, returning how many were dropped
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

impl Default for RecentCheckins {
    fn default() -> Self {
        Self::new()
    }
}

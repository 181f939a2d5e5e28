use chrono::{Duration as ChronoDuration, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::availability::rules;
use crate::checkin::RecentCheckins;
use crate::db::Store;
use crate::models::*;
use crate::utils::to_local;

/// Reason recorded on pending reservations nobody reviewed in time
pub const STALE_PENDING_REASON: &str = "not reviewed before start time";

/// Periodic housekeeping: expires check-in claims, closes stale pending
/// reservations and purges dead refresh tokens.
pub struct Maintenance {
    store: Store,
    recent_checkins: Arc<RecentCheckins>,
    interval_secs: u64,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Maintenance {
    pub fn new(store: Store, recent_checkins: Arc<RecentCheckins>, interval_secs: u64) -> Self {
        Self {
            store,
            recent_checkins,
            interval_secs: interval_secs.max(1),
            stop_tx: None,
        }
    }

    /// Start the sweeper
    pub fn start(&mut self) {
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let store = self.store.clone();
        let recent_checkins = self.recent_checkins.clone();
        let interval_secs = self.interval_secs;

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let pruned = recent_checkins.prune();
                        if pruned > 0 {
                            tracing::debug!("Pruned {} expired check-in claims", pruned);
                        }
                        if let Err(e) = reject_stale_pending(&store).await {
                            tracing::warn!("Error closing stale reservations: {}", e);
                        }
                        if let Err(e) = purge_refresh_tokens(&store).await {
                            tracing::warn!("Error purging refresh tokens: {}", e);
                        }
                    }
                    _ = &mut stop_rx => {
                        tracing::info!("Maintenance stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Stop the sweeper
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Reject pending reservations whose start has passed in their condominium's local time
pub async fn reject_stale_pending(store: &Store) -> anyhow::Result<usize> {
    let now = Utc::now();
    // the furthest-ahead timezone is at most a day past UTC
    let horizon = (now + ChronoDuration::days(1)).date_naive();
    let pending = store.list_pending_reservations_through(horizon).await?;

    let mut settings_cache: HashMap<i64, CondominiumSettings> = HashMap::new();
    let mut rejected = 0;
    for reservation in pending {
        let settings = match settings_cache.get(&reservation.condominium_id) {
            Some(s) => s.clone(),
            None => {
                let s = store.get_settings(reservation.condominium_id).await?;
                settings_cache.insert(reservation.condominium_id, s.clone());
                s
            }
        };
        let local_now = to_local(&settings, now);
        if !has_started(&reservation, local_now) {
            continue;
        }

        let result = store
            .transition_reservation(
                reservation.condominium_id,
                reservation.id,
                ReservationStatus::Rejected,
                Some(STALE_PENDING_REASON),
                rules::check_reject,
            )
            .await;
        match result {
            Ok(_) => {
                rejected += 1;
                tracing::info!("Reservation {} rejected: {}", reservation.id, STALE_PENDING_REASON);
            }
            // an admin acted on it in the meantime
            Err(e) if e.downcast_ref::<rules::BookingError>().is_some() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(rejected)
}

fn has_started(reservation: &Reservation, local_now: NaiveDateTime) -> bool {
    local_now >= reservation.starts_at()
}

/// Delete refresh tokens that expired more than a day ago
pub async fn purge_refresh_tokens(store: &Store) -> anyhow::Result<u64> {
    let purged = store
        .purge_refresh_tokens_before(Utc::now() - ChronoDuration::days(1))
        .await?;
    if purged > 0 {
        tracing::info!("Purged {} expired refresh tokens", purged);
    }
    Ok(purged)
}

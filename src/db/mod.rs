mod areas;
mod condominiums;
mod reservations;
pub(crate) mod row_helpers;
pub mod seeds;
mod settings;
mod users;
mod visitors;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::availability::rules::{self, BookingError, BookingRequest};
use crate::checkin::CheckinError;
use crate::models::*;

use areas::AreaRepo;
use condominiums::CondominiumRepo;
use reservations::ReservationRepo;
use settings::SettingsRepo;
use users::{RefreshTokenRepo, UserRepo};
use visitors::{AuthorizationRepo, EntryRepo};

/// Typed error for "resource not found", downcast by the API error handler
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
    /// Serializes reservation check-then-write sequences
    booking_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Fresh private database for tests; a single connection keeps it alive
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            booking_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Seed the default condominium, its sample areas and the bootstrap accounts
    pub async fn seed_defaults(&self, admin_password: &str) -> Result<()> {
        if UserRepo::count(&self.pool).await? > 0 {
            return Ok(());
        }

        let condominium = match self.get_condominium_by_name(seeds::DEFAULT_CONDOMINIUM).await? {
            Some(c) => c,
            None => {
                self.create_condominium(&CreateCondominiumRequest {
                    name: seeds::DEFAULT_CONDOMINIUM.to_string(),
                    address: None,
                    status: condominium_status::ACTIVE.to_string(),
                })
                .await?
            }
        };

        let password_hash = bcrypt::hash(admin_password, bcrypt::DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash default password: {}", e))?;

        for (username, role, condominium_id) in [
            (seeds::SUPERADMIN_USERNAME, Role::Superadmin, None),
            (seeds::ADMIN_USERNAME, Role::Admin, Some(condominium.id)),
        ] {
            let req = CreateUserRequest {
                username: username.to_string(),
                password: String::new(),
                full_name: username.to_string(),
                role,
                unit: None,
                condominium_id,
                enabled: true,
            };
            UserRepo::create(&self.pool, condominium_id, &req, &password_hash).await?;
            tracing::info!("Created default {} user (username: {})", role.as_str(), username);
        }

        for area in seeds::seed_area_params() {
            let slot_minutes = area.slot_minutes.unwrap_or(60);
            AreaRepo::create(&self.pool, condominium.id, &area, slot_minutes).await?;
        }
        tracing::info!("Seeded sample areas for '{}'", condominium.name);

        Ok(())
    }

    // ========== Condominium Operations ==========

    pub async fn list_condominiums(&self) -> Result<Vec<Condominium>> {
        CondominiumRepo::list(&self.pool).await
    }

    pub async fn get_condominium(&self, id: i64) -> Result<Option<Condominium>> {
        CondominiumRepo::get(&self.pool, id).await
    }

    pub async fn get_condominium_by_name(&self, name: &str) -> Result<Option<Condominium>> {
        CondominiumRepo::get_by_name(&self.pool, name).await
    }

    /// Create a condominium together with its settings document
    pub async fn create_condominium(&self, req: &CreateCondominiumRequest) -> Result<Condominium> {
        let condominium = CondominiumRepo::create(&self.pool, req).await?;
        SettingsRepo::update(&self.pool, condominium.id, &CondominiumSettings::default()).await?;
        Ok(condominium)
    }

    pub async fn update_condominium(&self, id: i64, req: &CreateCondominiumRequest) -> Result<Condominium> {
        CondominiumRepo::update(&self.pool, id, req).await
    }

    pub async fn delete_condominium(&self, id: i64) -> Result<()> {
        CondominiumRepo::delete(&self.pool, id).await
    }

    // ========== User Operations ==========

    pub async fn list_users(&self, scope: Option<i64>) -> Result<Vec<User>> {
        UserRepo::list(&self.pool, scope).await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        UserRepo::get(&self.pool, id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserRepo::get_by_username(&self.pool, username).await
    }

    pub async fn create_user(&self, condominium_id: Option<i64>, req: &CreateUserRequest) -> Result<User> {
        let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        UserRepo::create(&self.pool, condominium_id, req, &password_hash).await
    }

    pub async fn update_user(&self, id: i64, req: &UpdateUserRequest) -> Result<User> {
        let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(
                bcrypt::hash(password, bcrypt::DEFAULT_COST)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?,
            ),
            None => None,
        };
        UserRepo::update(&self.pool, id, req, password_hash.as_deref()).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        UserRepo::delete(&self.pool, id).await
    }

    // ========== Refresh Token Operations ==========

    pub async fn create_refresh_token(&self, token: &str, user_id: i64, expires_at: DateTime<Utc>) -> Result<()> {
        RefreshTokenRepo::create(&self.pool, token, user_id, expires_at).await
    }

    pub async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        RefreshTokenRepo::get(&self.pool, token).await
    }

    pub async fn revoke_refresh_token(&self, token: &str) -> Result<bool> {
        RefreshTokenRepo::revoke(&self.pool, token).await
    }

    pub async fn purge_refresh_tokens_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        RefreshTokenRepo::delete_expired_before(&self.pool, cutoff).await
    }

    // ========== Settings Operations ==========

    pub async fn get_settings(&self, condominium_id: i64) -> Result<CondominiumSettings> {
        SettingsRepo::get(&self.pool, condominium_id).await
    }

    pub async fn update_settings(&self, condominium_id: i64, settings: &CondominiumSettings) -> Result<()> {
        SettingsRepo::update(&self.pool, condominium_id, settings).await
    }

    // ========== Area Operations ==========

    pub async fn list_areas(&self, condominium_id: i64, include_inactive: bool) -> Result<Vec<ReservationArea>> {
        AreaRepo::list(&self.pool, condominium_id, include_inactive).await
    }

    pub async fn get_area(&self, condominium_id: i64, id: i64) -> Result<Option<ReservationArea>> {
        AreaRepo::get(&self.pool, condominium_id, id).await
    }

    pub async fn create_area(&self, condominium_id: i64, req: &CreateAreaRequest, slot_minutes: u32) -> Result<ReservationArea> {
        AreaRepo::create(&self.pool, condominium_id, req, slot_minutes).await
    }

    pub async fn update_area(
        &self,
        condominium_id: i64,
        id: i64,
        req: &CreateAreaRequest,
        slot_minutes: u32,
    ) -> Result<ReservationArea> {
        AreaRepo::update(&self.pool, condominium_id, id, req, slot_minutes).await
    }

    pub async fn deactivate_area(&self, condominium_id: i64, id: i64) -> Result<()> {
        AreaRepo::deactivate(&self.pool, condominium_id, id).await
    }

    // ========== Reservation Operations ==========

    pub async fn list_reservations(
        &self,
        condominium_id: i64,
        filter: &ReservationFilter,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<Reservation>> {
        ReservationRepo::list(&self.pool, condominium_id, filter, limit, offset).await
    }

    pub async fn get_reservation(&self, condominium_id: i64, id: i64) -> Result<Option<Reservation>> {
        ReservationRepo::get(&self.pool, condominium_id, id).await
    }

    pub async fn list_active_reservations(&self, area_id: i64, date: NaiveDate) -> Result<Vec<Reservation>> {
        ReservationRepo::list_active_for_area_date(&self.pool, area_id, date).await
    }

    pub async fn list_pending_reservations_through(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        ReservationRepo::list_pending_through(&self.pool, date).await
    }

    /// Validate and insert a reservation atomically with respect to other bookings.
    ///
    /// Rule violations surface as a [`BookingError`] inside the returned error.
    pub async fn book_reservation(
        &self,
        area: &ReservationArea,
        settings: &CondominiumSettings,
        booking: &BookingRequest,
        purpose: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Reservation> {
        let _guard = self.booking_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let existing = ReservationRepo::list_active_for_area_date(&mut *tx, area.id, booking.date).await?;
        rules::validate_booking(area, settings, &existing, booking, now)?;

        let status = if area.requires_approval {
            ReservationStatus::Pending
        } else {
            ReservationStatus::Approved
        };
        let id = ReservationRepo::insert(&mut *tx, area.condominium_id, area.id, booking, purpose, status).await?;
        let reservation = ReservationRepo::get(&mut *tx, area.condominium_id, id)
            .await?
            .context("Reservation not found after creation")?;

        tx.commit().await?;
        Ok(reservation)
    }

    /// pending -> approved, re-checking occupancy against the other active bookings
    pub async fn approve_reservation(&self, area: &ReservationArea, id: i64) -> Result<Reservation> {
        let _guard = self.booking_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let reservation = ReservationRepo::get(&mut *tx, area.condominium_id, id)
            .await?
            .ok_or_else(|| NotFoundError::new("Reservation", &id.to_string()))?;
        rules::check_approve(&reservation)?;

        let others: Vec<Reservation> =
            ReservationRepo::list_active_for_area_date(&mut *tx, area.id, reservation.date)
                .await?
                .into_iter()
                .filter(|r| r.id != reservation.id)
                .collect();
        rules::check_occupancy(area, &others, reservation.start_time, reservation.end_time)?;

        ReservationRepo::set_status(&mut *tx, area.condominium_id, id, ReservationStatus::Approved, None).await?;
        tx.commit().await?;

        ReservationRepo::get_required(&self.pool, area.condominium_id, id).await
    }

    /// Move a reservation to `target` if `check` allows it from the current state
    pub async fn transition_reservation<F>(
        &self,
        condominium_id: i64,
        id: i64,
        target: ReservationStatus,
        reason: Option<&str>,
        check: F,
    ) -> Result<Reservation>
    where
        F: FnOnce(&Reservation) -> std::result::Result<(), BookingError>,
    {
        let _guard = self.booking_lock.lock().await;

        let reservation = ReservationRepo::get(&self.pool, condominium_id, id)
            .await?
            .ok_or_else(|| NotFoundError::new("Reservation", &id.to_string()))?;
        check(&reservation)?;

        ReservationRepo::set_status(&self.pool, condominium_id, id, target, reason).await?;
        ReservationRepo::get_required(&self.pool, condominium_id, id).await
    }

    // ========== Visitor Operations ==========

    pub async fn list_authorizations(
        &self,
        condominium_id: i64,
        resident_id: Option<i64>,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<VisitorAuthorization>> {
        AuthorizationRepo::list(&self.pool, condominium_id, resident_id, limit, offset).await
    }

    pub async fn list_active_authorizations(&self, condominium_id: i64) -> Result<Vec<VisitorAuthorization>> {
        AuthorizationRepo::list_active(&self.pool, condominium_id).await
    }

    pub async fn get_authorization(&self, condominium_id: i64, id: i64) -> Result<Option<VisitorAuthorization>> {
        AuthorizationRepo::get(&self.pool, condominium_id, id).await
    }

    pub async fn create_authorization(
        &self,
        condominium_id: i64,
        resident_id: i64,
        req: &CreateAuthorizationRequest,
    ) -> Result<VisitorAuthorization> {
        AuthorizationRepo::create(&self.pool, condominium_id, resident_id, req).await
    }

    pub async fn revoke_authorization(&self, condominium_id: i64, id: i64) -> Result<()> {
        AuthorizationRepo::revoke(&self.pool, condominium_id, id).await
    }

    /// Write a gate entry, consuming the authorization when it is single-use.
    ///
    /// Losing the race to consume a single-use pass yields [`CheckinError::AlreadyUsed`].
    pub async fn record_check_in(
        &self,
        condominium_id: i64,
        authorization: Option<&VisitorAuthorization>,
        entry: &NewVisitorEntry,
        at: DateTime<Utc>,
    ) -> Result<VisitorEntry> {
        let mut tx = self.pool.begin().await?;

        if let Some(auth) = authorization {
            if auth.authorization_type.is_single_use() && !AuthorizationRepo::mark_used(&mut *tx, auth.id, at).await? {
                return Err(CheckinError::AlreadyUsed.into());
            }
        }
        let id = EntryRepo::insert(&mut *tx, condominium_id, entry, at).await?;
        tx.commit().await?;

        EntryRepo::get(&self.pool, condominium_id, id)
            .await?
            .context("Entry not found after creation")
    }

    pub async fn list_entries(
        &self,
        condominium_id: i64,
        active: Option<bool>,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<VisitorEntry>> {
        EntryRepo::list(&self.pool, condominium_id, active, window, limit, offset).await
    }

    /// Stamp the exit of a visitor still inside
    pub async fn check_out_entry(&self, condominium_id: i64, id: i64, at: DateTime<Utc>) -> Result<VisitorEntry> {
        let entry = EntryRepo::get(&self.pool, condominium_id, id)
            .await?
            .ok_or_else(|| NotFoundError::new("Entry", &id.to_string()))?;
        if entry.exit_at.is_some() || !EntryRepo::check_out(&self.pool, condominium_id, id, at).await? {
            return Err(CheckinError::AlreadyCheckedOut.into());
        }
        EntryRepo::get(&self.pool, condominium_id, id)
            .await?
            .context("Entry not found after check-out")
    }
}

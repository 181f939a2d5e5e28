use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        // Condominium routes
        .route(
            "/api/condominiums",
            get(handlers::condominiums::list_condominiums).post(handlers::condominiums::create_condominium),
        )
        .route(
            "/api/condominiums/:id",
            get(handlers::condominiums::get_condominium)
                .put(handlers::condominiums::update_condominium)
                .delete(handlers::condominiums::delete_condominium),
        )
        // User routes
        .route("/api/users", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/api/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // Settings routes
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Area routes
        .route("/api/areas", get(handlers::areas::list_areas).post(handlers::areas::create_area))
        .route(
            "/api/areas/:id",
            get(handlers::areas::get_area)
                .put(handlers::areas::update_area)
                .delete(handlers::areas::delete_area),
        )
        .route("/api/areas/:id/availability", get(handlers::areas::get_availability))
        // Reservation routes
        .route(
            "/api/reservations",
            get(handlers::reservations::list_reservations).post(handlers::reservations::create_reservation),
        )
        .route("/api/reservations/:id", get(handlers::reservations::get_reservation))
        .route("/api/reservations/:id/approve", post(handlers::reservations::approve_reservation))
        .route("/api/reservations/:id/reject", post(handlers::reservations::reject_reservation))
        .route("/api/reservations/:id/cancel", post(handlers::reservations::cancel_reservation))
        // Visitor routes
        .route(
            "/api/visitors/authorizations",
            get(handlers::visitors::list_authorizations).post(handlers::visitors::create_authorization),
        )
        .route("/api/visitors/authorizations/search", get(handlers::visitors::search_authorizations))
        .route(
            "/api/visitors/authorizations/:id",
            get(handlers::visitors::get_authorization).delete(handlers::visitors::revoke_authorization),
        )
        .route("/api/visitors/check-in", post(handlers::visitors::check_in))
        .route("/api/visitors/entries", get(handlers::visitors::list_entries))
        .route("/api/visitors/entries/:id/check-out", post(handlers::visitors::check_out))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::RecentCheckins;
    use crate::config::Config;
    use crate::db::Store;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        store: Store,
    }

    impl TestApp {
        async fn new() -> Self {
            let store = Store::in_memory().await.unwrap();
            store.seed_defaults("admin").await.unwrap();
            let state = Arc::new(AppState {
                store: store.clone(),
                config: Config::for_tests(),
                recent_checkins: Arc::new(RecentCheckins::new()),
            });
            Self { router: build(state), store }
        }

        async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req.header("authorization", format!("Bearer {}", token));
            }
            let body = match body {
                Some(v) => {
                    req = req.header("content-type", "application/json");
                    Body::from(v.to_string())
                }
                None => Body::empty(),
            };
            let resp = self.router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn login(&self, username: &str, password: &str) -> String {
            let (status, body) = self
                .send("POST", "/api/auth/login", None, Some(json!({"username": username, "password": password})))
                .await;
            assert_eq!(status, StatusCode::OK, "login failed: {}", body);
            body["access_token"].as_str().unwrap().to_string()
        }

        async fn create_user(&self, admin: &str, username: &str, role: &str, unit: Option<&str>) -> i64 {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/users",
                    Some(admin),
                    Some(json!({"username": username, "password": "pw", "role": role, "unit": unit})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["id"].as_i64().unwrap()
        }

        async fn area_id(&self, name: &str) -> i64 {
            let condo = self
                .store
                .get_condominium_by_name(crate::db::seeds::DEFAULT_CONDOMINIUM)
                .await
                .unwrap()
                .unwrap();
            self.store
                .list_areas(condo.id, false)
                .await
                .unwrap()
                .into_iter()
                .find(|a| a.name == name)
                .unwrap()
                .id
        }
    }

    /// Next date the Pool (closed on Mondays) is open, at least two days out
    fn future_open_date() -> String {
        let mut date = Utc::now().date_naive() + Duration::days(2);
        while crate::utils::weekday_number(date) == 1 {
            date += Duration::days(1);
        }
        date.to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new().await;
        let (status, body) = app.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "condodesk");
    }

    #[tokio::test]
    async fn test_auth_flow() {
        let app = TestApp::new().await;

        let (status, _) = app.send("GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send("POST", "/api/auth/login", None, Some(json!({"username": "admin", "password": "nope"})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .send("POST", "/api/auth/login", None, Some(json!({"username": "admin", "password": "admin"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["user"].get("password_hash").is_none());
        let access = body["access_token"].as_str().unwrap().to_string();
        let refresh = body["refresh_token"].as_str().unwrap().to_string();

        let (status, me) = app.send("GET", "/api/auth/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["role"], "admin");

        let (status, rotated) = app
            .send("POST", "/api/auth/refresh", None, Some(json!({"refresh_token": refresh})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(rotated["refresh_token"], refresh.as_str());

        // the old refresh token is single-use
        let (status, _) = app
            .send("POST", "/api/auth/refresh", None, Some(json!({"refresh_token": refresh})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_roles_are_enforced() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        app.create_user(&admin, "vecino", "resident", Some("12A")).await;
        let resident = app.login("vecino", "pw").await;

        let (status, _) = app.send("GET", "/api/users", Some(&resident), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send("GET", "/api/condominiums", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let root = app.login("superadmin", "admin").await;
        let (status, condos) = app.send("GET", "/api/condominiums", Some(&root), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(condos.as_array().unwrap().len(), 1);
        // superadmins have no tenant
        let (status, _) = app.send("GET", "/api/areas", Some(&root), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_reservation_lifecycle() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        app.create_user(&admin, "ana", "resident", Some("3C")).await;
        app.create_user(&admin, "beto", "resident", Some("5D")).await;
        let ana = app.login("ana", "pw").await;
        let beto = app.login("beto", "pw").await;

        let hall = app.area_id("Event Hall").await;
        let date = future_open_date();

        // end time omitted: filled from the area's six-hour maximum
        let (status, first) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&ana),
                Some(json!({"area_id": hall, "date": date, "start_time": "12:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", first);
        assert_eq!(first["status"], "pending");
        assert_eq!(first["end_time"], "18:00:00");
        let id = first["id"].as_i64().unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&beto),
                Some(json!({"area_id": hall, "date": date, "start_time": "17:00:00", "end_time": "19:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, availability) = app
            .send("GET", &format!("/api/areas/{}/availability?date={}", hall, date), Some(&ana), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let slots = availability["slots"].as_array().unwrap();
        let noon = slots.iter().find(|s| s["start_time"] == "12:00:00").unwrap();
        assert_eq!(noon["status"], "unavailable");
        assert_eq!(noon["is_mine"], true);

        // residents cannot approve, and cannot see others' reservations
        let (status, _) = app
            .send("POST", &format!("/api/reservations/{}/approve", id), Some(&ana), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send("GET", &format!("/api/reservations/{}", id), Some(&beto), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, approved) = app
            .send("POST", &format!("/api/reservations/{}/approve", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        let (status, _) = app
            .send(
                "POST",
                &format!("/api/reservations/{}/reject", id),
                Some(&admin),
                Some(json!({"reason": "too late"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, cancelled) = app
            .send(
                "POST",
                &format!("/api/reservations/{}/cancel", id),
                Some(&ana),
                Some(json!({"reason": "plans changed"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
        assert_eq!(cancelled["cancellation_reason"], "plans changed");

        let (status, mine) = app.send("GET", "/api/reservations", Some(&ana), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine.as_array().unwrap().len(), 1);
        let (_, theirs) = app.send("GET", "/api/reservations", Some(&beto), None).await;
        assert!(theirs.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_area_and_bad_requests() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        app.create_user(&admin, "ana", "resident", None).await;
        let ana = app.login("ana", "pw").await;
        let pool = app.area_id("Pool").await;
        let gym = app.area_id("Gym").await;
        let date = future_open_date();

        let (status, body) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&ana),
                Some(json!({"area_id": gym, "date": date, "start_time": "10:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "area does not take reservations");

        let (status, _) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&ana),
                Some(json!({"area_id": pool, "date": date, "start_time": "10:00:00", "end_time": "13:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&ana),
                Some(json!({"area_id": pool, "date": date, "start_time": "10:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        // default daily cap is one per area
        let (status, _) = app
            .send(
                "POST",
                "/api/reservations",
                Some(&ana),
                Some(json!({"area_id": pool, "date": date, "start_time": "14:00:00"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, availability) = app
            .send("GET", &format!("/api/areas/{}/availability?date={}", pool, date), Some(&ana), None)
            .await;
        let ten = availability["slots"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["start_time"] == "10:00:00")
            .unwrap()
            .clone();
        assert_eq!(ten["occupied"], 1);
        assert_eq!(ten["remaining"], 7);
        assert_eq!(ten["status"], "available");
    }

    #[tokio::test]
    async fn test_visitor_check_in_flow() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        app.create_user(&admin, "ana", "resident", Some("3C")).await;
        app.create_user(&admin, "porter", "guard", None).await;
        let ana = app.login("ana", "pw").await;
        let guard = app.login("porter", "pw").await;

        let (status, pass) = app
            .send(
                "POST",
                "/api/visitors/authorizations",
                Some(&ana),
                Some(json!({
                    "visitor_name": "María José Núñez",
                    "identification_number": "15.222.333-4",
                    "vehicle_plate": "hk-ts 21",
                    "authorization_type": "temporary",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", pass);
        assert_eq!(pass["color_code"], "yellow");
        assert_eq!(pass["is_currently_valid"], true);
        let pass_id = pass["id"].as_i64().unwrap();

        let (status, _) = app
            .send("GET", "/api/visitors/authorizations/search?q=maria", Some(&ana), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, found) = app
            .send("GET", "/api/visitors/authorizations/search?q=HKTS21", Some(&guard), None)
            .await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        let (_, found) = app
            .send("GET", "/api/visitors/authorizations/search?q=nunez", Some(&guard), None)
            .await;
        assert_eq!(found[0]["id"], pass_id);
        let (_, found) = app
            .send("GET", "/api/visitors/authorizations/search?q=m", Some(&guard), None)
            .await;
        assert!(found.as_array().unwrap().is_empty());

        let (status, entry) = app
            .send("POST", "/api/visitors/check-in", Some(&guard), Some(json!({"authorization_id": pass_id})))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", entry);
        assert_eq!(entry["is_authorized"], true);
        assert_eq!(entry["destination"], "3C");

        // double tap inside the dedup window
        let (status, body) = app
            .send("POST", "/api/visitors/check-in", Some(&guard), Some(json!({"authorization_id": pass_id})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "check-in already in progress");

        let (_, found) = app
            .send("GET", "/api/visitors/authorizations/search?q=nunez", Some(&guard), None)
            .await;
        assert!(found.as_array().unwrap().is_empty());

        let (status, walk_in) = app
            .send(
                "POST",
                "/api/visitors/check-in",
                Some(&guard),
                Some(json!({"visitor_name": "Delivery", "destination": "lobby"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(walk_in["is_authorized"], false);

        let (status, inside) = app
            .send("GET", "/api/visitors/entries?active=true", Some(&guard), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inside.as_array().unwrap().len(), 2);

        let entry_id = entry["id"].as_i64().unwrap();
        let uri = format!("/api/visitors/entries/{}/check-out", entry_id);
        let (status, out) = app.send("POST", &uri, Some(&guard), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(out["exit_at"].is_string());
        let (status, _) = app.send("POST", &uri, Some(&guard), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_failed_check_in_releases_claim() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        let resident_id = app.create_user(&admin, "ana", "resident", None).await;
        let guard_id = app.create_user(&admin, "porter", "guard", None).await;
        let guard = app.login("porter", "pw").await;
        assert_ne!(resident_id, guard_id);

        // a pass that only opens tomorrow
        let (status, pass) = app
            .send(
                "POST",
                "/api/visitors/authorizations",
                Some(&admin),
                Some(json!({
                    "visitor_name": "Tomás",
                    "authorization_type": "extended",
                    "valid_from": (Utc::now() + Duration::days(1)).to_rfc3339(),
                    "valid_until": (Utc::now() + Duration::days(3)).to_rfc3339(),
                    "resident_id": resident_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", pass);
        assert_eq!(pass["is_currently_valid"], false);
        let body = json!({"authorization_id": pass["id"]});

        let (status, _) = app.send("POST", "/api/visitors/check-in", Some(&guard), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        // not blocked as "in progress" since the first attempt failed
        let (status, _) = app.send("POST", "/api/visitors/check-in", Some(&guard), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send("POST", "/api/visitors/check-in", Some(&guard), Some(json!({"authorization_id": 9999})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let app = TestApp::new().await;
        let root = app.login("superadmin", "admin").await;
        let (status, other) = app
            .send("POST", "/api/condominiums", Some(&root), Some(json!({"name": "Edificio Sur"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app
            .send(
                "POST",
                "/api/users",
                Some(&root),
                Some(json!({"username": "sur-admin", "password": "pw", "role": "admin", "condominium_id": other["id"]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let sur = app.login("sur-admin", "pw").await;

        let (status, areas) = app.send("GET", "/api/areas", Some(&sur), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(areas.as_array().unwrap().is_empty());

        let hall = app.area_id("Event Hall").await;
        let (status, _) = app.send("GET", &format!("/api/areas/{}", hall), Some(&sur), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, settings) = app.send("GET", "/api/settings", Some(&sur), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["reservations"]["max_per_user_per_day"], 1);
    }

    #[tokio::test]
    async fn test_area_validation() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        let (status, _) = app
            .send(
                "POST",
                "/api/areas",
                Some(&admin),
                Some(json!({
                    "name": "Sauna",
                    "behavior": "capacity",
                    "available_from": "10:00:00",
                    "available_until": "09:00:00",
                    "capacity": 4,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, area) = app
            .send(
                "POST",
                "/api/areas",
                Some(&admin),
                Some(json!({
                    "name": "Sauna",
                    "type": "spa",
                    "behavior": "capacity",
                    "available_from": "09:00:00",
                    "available_until": "21:00:00",
                    "capacity": 4,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(area["slot_minutes"], 60);
        assert_eq!(area["type"], "spa");

        let uri = format!("/api/areas/{}", area["id"]);
        let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, listed) = app.send("GET", "/api/areas?include_inactive=true", Some(&admin), None).await;
        assert_eq!(listed.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_settings_validation() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        let (status, base) = app.send("GET", "/api/settings", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(base["timezone"], "UTC");

        let rejected: Vec<(&str, Value)> = vec![
            ("/timezone", json!("Mars/Olympus")),
            ("/working_hours/start", json!("19:00:00")),
            ("/reservations/default_slot_minutes", json!(0)),
            ("/visits/checkin_dedup_seconds", json!(0)),
            ("/visits/checkin_dedup_seconds", json!(3601)),
            ("/visits/checkin_dedup_seconds", json!(u64::MAX)),
        ];
        for (pointer, value) in rejected {
            let mut body = base.clone();
            *body.pointer_mut(pointer).unwrap() = value.clone();
            let (status, err) = app.send("PUT", "/api/settings", Some(&admin), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} = {}: {}", pointer, value, err);
        }

        let mut body = base.clone();
        body["timezone"] = json!("America/Santiago");
        body["visits"]["checkin_dedup_seconds"] = json!(3600);
        let (status, saved) = app.send("PUT", "/api/settings", Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["timezone"], "America/Santiago");

        // the widest accepted window still blocks a repeat without failing the first
        let walk_in = json!({"visitor_name": "Walk In", "destination": "1A"});
        let (status, _) = app.send("POST", "/api/visitors/check-in", Some(&admin), Some(walk_in.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app.send("POST", "/api/visitors/check-in", Some(&admin), Some(walk_in)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        app.create_user(&admin, "vecino", "resident", Some("2B")).await;
        let resident = app.login("vecino", "pw").await;
        let (status, _) = app.send("PUT", "/api/settings", Some(&resident), Some(base)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_area_validation_rejects_bad_input() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin").await;
        let base = json!({
            "name": "Sauna",
            "behavior": "capacity",
            "available_from": "09:00:00",
            "available_until": "21:00:00",
            "capacity": 4,
        });

        let rejected: Vec<(&str, Value)> = vec![
            ("name", json!("   ")),
            ("allowed_days", json!([1, 7])),
            ("capacity", json!(-1)),
            ("capacity", json!(0)),
            ("max_hours_per_reservation", json!(0)),
            ("slot_minutes", json!(0)),
        ];
        for (field, value) in &rejected {
            let mut body = base.clone();
            body[*field] = value.clone();
            let (status, err) = app.send("POST", "/api/areas", Some(&admin), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} = {}: {}", field, value, err);
        }

        // exclusive areas may leave capacity unset
        let mut hall = base.clone();
        hall["behavior"] = json!("exclusive");
        hall["capacity"] = json!(0);
        let (status, _) = app.send("POST", "/api/areas", Some(&admin), Some(hall)).await;
        assert_eq!(status, StatusCode::CREATED);

        let gym = app.area_id("Gym").await;
        let mut body = base.clone();
        body["capacity"] = json!(-1);
        let (status, _) = app
            .send("PUT", &format!("/api/areas/{}", gym), Some(&admin), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

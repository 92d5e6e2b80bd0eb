pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Dashboard data
        .route("/api/translations/{lang}", get(handlers::get_translations))
        .route("/api/lakes", get(handlers::get_lakes))
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/contacts", get(handlers::list_contacts))
        // Alerting
        .route("/alert", post(handlers::quick_alert))
        .route("/api/alerts", get(handlers::list_alerts).post(handlers::create_alert))
        .route("/api/alerts/all-clear", post(handlers::all_clear))
        .route("/api/alerts/offline", get(handlers::list_offline))
        .route("/api/alerts/offline/flush", post(handlers::flush_offline))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::LakeCatalog;
    use crate::config::{DataConfig, OpenWeatherConfig};
    use crate::notify::dispatch::tests::{harness, Harness};
    use crate::weather::WeatherClient;

    fn app(h: &Harness) -> Router {
        let state = AppState {
            catalog: LakeCatalog::new(&DataConfig {
                lakes_csv: "/nonexistent/lakes.csv".to_string(),
                events_csv: "/nonexistent/glof_events.csv".to_string(),
                regions: vec!["Sikkim".to_string()],
            }),
            weather: WeatherClient::new(&OpenWeatherConfig {
                api_key: String::new(),
                base_url: "http://127.0.0.1:9".to_string(),
                cache_ttl_seconds: 60,
                cache_capacity: 10,
                timeout_seconds: 1,
            })
            .unwrap(),
            dispatcher: h.dispatcher.clone(),
        };
        create_router().with_state(state)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(false);
        let (status, body) = call(app(&h), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["online"], true);
        assert_eq!(body["queued_alerts"], 0);
    }

    #[tokio::test]
    async fn test_translations_fall_back_to_english() {
        let h = harness(false);
        let (status, body) = call(app(&h), get("/api/translations/xx")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dashboard"], "Dashboard");

        let (_, body) = call(app(&h), get("/api/translations/gu")).await;
        assert_eq!(body["dashboard"], "ડેશબોર્ડ");
    }

    #[tokio::test]
    async fn test_weather_requires_coordinates() {
        let h = harness(false);
        let (status, body) = call(app(&h), get("/api/weather?lat=27.9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing coordinates");
        assert_eq!(body["code"], "MISSING_COORDINATES");
    }

    #[tokio::test]
    async fn test_lakes_missing_files_is_server_error() {
        let h = harness(false);
        let (status, body) = call(app(&h), get("/api/lakes")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CATALOG_ERROR");
    }

    #[tokio::test]
    async fn test_quick_alert_classifies_score() {
        let h = harness(false);
        let (status, body) = call(
            app(&h),
            post_json("/alert", json!({"lake_name": "Pangong Tso", "risk_score": 85})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let sent = h.sms.sent.lock().unwrap();
        assert!(sent[0].1.starts_with("⚠️ *[CRITICAL GLOF ALERT]*"));
        assert!(sent[0].1.contains("*Additional Info:* Automated alert: Risk score 85%"));
    }

    #[tokio::test]
    async fn test_quick_alert_reports_failure() {
        let h = harness(false);
        h.sms.failing.store(true, Ordering::Relaxed);
        let (status, body) = call(app(&h), post_json("/alert", json!({"risk_score": 50}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
    }

    #[tokio::test]
    async fn test_create_alert_with_user_types() {
        let h = harness(false);
        let (status, body) = call(
            app(&h),
            post_json(
                "/api/alerts",
                json!({
                    "lake_name": "Pangong Tso",
                    "risk_level": "HIGH",
                    "target_user_types": ["ADMIN", "EMERGENCY_TEAM"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["alert_status"], "SENT");
        assert_eq!(body["recipients"].as_array().unwrap().len(), 2);

        let (_, history) = call(app(&h), get("/api/alerts?limit=5")).await;
        assert_eq!(history["count"], 1);
        assert_eq!(history["alerts"][0]["glacial_lake"], "Pangong Tso");
    }

    #[tokio::test]
    async fn test_create_alert_rejects_unknown_level() {
        let h = harness(false);
        let (status, body) = call(
            app(&h),
            post_json("/api/alerts", json!({"lake_name": "X", "risk_level": "apocalyptic"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");
    }

    #[tokio::test]
    async fn test_malformed_requests_get_error_body() {
        let h = harness(false);

        let request = Request::post("/api/alerts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(app(&h), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");

        let request = Request::post("/alert").body(Body::empty()).unwrap();
        let (status, body) = call(app(&h), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");

        let (status, body) = call(app(&h), get("/api/alerts?limit=lots")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid parameter"));
    }

    #[tokio::test]
    async fn test_offline_queue_and_flush_endpoints() {
        let h = harness(false);
        h.sms.failing.store(true, Ordering::Relaxed);
        h.probe.set(false);

        let (_, body) = call(app(&h), post_json("/alert", json!({"lake_name": "Pangong Tso"}))).await;
        assert_eq!(body["status"], "success");

        let (_, queue) = call(app(&h), get("/api/alerts/offline")).await;
        assert_eq!(queue["online"], false);
        assert_eq!(queue["count"], 1);
        assert_eq!(queue["alerts"][0]["status"], "OFFLINE_QUEUED");

        h.sms.failing.store(false, Ordering::Relaxed);
        h.probe.set(true);
        let (status, report) = call(app(&h), post_json("/api/alerts/offline/flush", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["delivered"], 1);

        let (_, queue) = call(app(&h), get("/api/alerts/offline")).await;
        assert_eq!(queue["count"], 0);
    }

    #[tokio::test]
    async fn test_all_clear_endpoint() {
        let h = harness(false);
        let (status, body) = call(
            app(&h),
            post_json("/api/alerts/all-clear", json!({"lake_name": "South Lhonak"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["recipients"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_contacts_endpoint() {
        let h = harness(false);
        let (status, body) = call(app(&h), get("/api/contacts")).await;
        assert_eq!(status, StatusCode::OK);
        let contacts = body["contacts"].as_array().unwrap();
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0]["user_type"], "ADMIN");
    }
}

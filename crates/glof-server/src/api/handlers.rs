use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use glof_core::{i18n, RiskLevel};

use super::dto::*;
use crate::catalog::CatalogSnapshot;
use crate::error::{AppError, AppResult};
use crate::notify::FlushReport;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    tracing::debug!("Processing health check request");

    let offline = state.dispatcher.offline();
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        online: offline.is_online(),
        queued_alerts: offline.len().await,
        logged_alerts: state.dispatcher.history().len().await,
    };

    tracing::debug!(
        online = %response.online,
        queued_alerts = %response.queued_alerts,
        "Health check completed"
    );

    Ok(Json(response))
}

pub async fn get_translations(
    Path(lang): Path<String>,
) -> AppResult<Json<BTreeMap<&'static str, &'static str>>> {
    tracing::debug!(lang = %lang, "Serving translations");
    Ok(Json(i18n::translations(&lang)))
}

pub async fn get_lakes(State(state): State<AppState>) -> AppResult<Json<CatalogSnapshot>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/lakes");

    let snapshot = state.catalog.load().await?;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/lakes -> 200 OK ({}ms) lakes={} events={}",
        duration,
        snapshot.lakes.len(),
        snapshot.glof_events.len()
    );
    tracing::info!(
        duration_ms = %duration,
        lakes = %snapshot.lakes.len(),
        events = %snapshot.glof_events.len(),
        "Lake catalog served"
    );

    Ok(Json(snapshot))
}

pub async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Query(query) = query?;
    let start = Instant::now();
    let (lat, lon) = query.coordinates().ok_or_else(|| {
        println!("[RESPONSE] GET /api/weather -> 400 Bad Request (missing coordinates)");
        AppError::MissingCoordinates
    })?;
    println!("[REQUEST] GET /api/weather?lat={}&lon={}", lat, lon);

    let weather = state.weather.current(lat, lon).await?;

    let duration = start.elapsed().as_millis();
    println!("[RESPONSE] GET /api/weather -> 200 OK ({}ms)", duration);
    tracing::info!(lat = %lat, lon = %lon, duration_ms = %duration, "Weather served");

    Ok(Json(weather))
}

/// Dashboard alert button: classify the score and notify everyone.
pub async fn quick_alert(
    State(state): State<AppState>,
    request: Result<Json<QuickAlertRequest>, JsonRejection>,
) -> AppResult<Json<StatusResponse>> {
    let Json(request) = request?;
    let start = Instant::now();
    println!(
        "[REQUEST] POST /alert lake={} score={}",
        request.lake_name, request.risk_score
    );

    let level = RiskLevel::from_score(request.risk_score);
    let info = format!(
        "Automated alert: Risk score {}%",
        format_score(request.risk_score)
    );

    let outcome = state
        .dispatcher
        .send_alert(&request.lake_name, level, Some(info), &[])
        .await;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /alert -> 200 OK ({}ms) level={} success={}",
        duration, level, outcome.success
    );
    tracing::info!(
        lake = %request.lake_name,
        risk = %level,
        success = %outcome.success,
        duration_ms = %duration,
        "Quick alert processed"
    );

    Ok(Json(StatusResponse::from_success(outcome.success)))
}

pub async fn create_alert(
    State(state): State<AppState>,
    request: Result<Json<AlertRequest>, JsonRejection>,
) -> AppResult<Json<AlertResponse>> {
    let Json(request) = request?;
    let start = Instant::now();
    println!(
        "[REQUEST] POST /api/alerts lake={} level={}",
        request.lake_name, request.risk_level
    );

    let level: RiskLevel = request.risk_level.parse()?;
    let user_types = parse_user_types(&request.target_user_types)?;

    let outcome = state
        .dispatcher
        .send_alert(&request.lake_name, level, request.additional_info, &user_types)
        .await;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /api/alerts -> 200 OK ({}ms) success={} recipients={}",
        duration,
        outcome.success,
        outcome.recipients.len()
    );
    tracing::info!(
        lake = %request.lake_name,
        risk = %level,
        success = %outcome.success,
        recipients = %outcome.recipients.len(),
        duration_ms = %duration,
        "Alert request processed"
    );

    Ok(Json(AlertResponse {
        status: StatusResponse::from_success(outcome.success).status,
        alert_id: outcome.alert.as_ref().map(|a| a.id.clone()),
        alert_status: outcome.alert.as_ref().map(|a| a.status),
        recipients: outcome.recipients,
    }))
}

pub async fn all_clear(
    State(state): State<AppState>,
    request: Result<Json<AllClearRequest>, JsonRejection>,
) -> AppResult<Json<AlertResponse>> {
    let Json(request) = request?;
    let start = Instant::now();
    println!("[REQUEST] POST /api/alerts/all-clear lake={}", request.lake_name);

    let user_types = parse_user_types(&request.target_user_types)?;
    let outcome = state
        .dispatcher
        .send_all_clear(&request.lake_name, &user_types)
        .await;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /api/alerts/all-clear -> 200 OK ({}ms) success={}",
        duration, outcome.success
    );
    tracing::info!(
        lake = %request.lake_name,
        success = %outcome.success,
        duration_ms = %duration,
        "All-clear request processed"
    );

    Ok(Json(AlertResponse {
        status: StatusResponse::from_success(outcome.success).status,
        alert_id: None,
        alert_status: None,
        recipients: outcome.recipients,
    }))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let alerts = state.dispatcher.history().recent(query.limit).await;
    tracing::debug!(limit = %query.limit, count = %alerts.len(), "Alert history served");
    Ok(Json(HistoryResponse {
        count: alerts.len(),
        alerts,
    }))
}

pub async fn list_offline(State(state): State<AppState>) -> AppResult<Json<OfflineQueueResponse>> {
    let offline = state.dispatcher.offline();
    let alerts = offline.snapshot().await;
    Ok(Json(OfflineQueueResponse {
        online: offline.is_online(),
        count: alerts.len(),
        alerts,
    }))
}

/// Retry queued alerts now instead of waiting for the background flusher
pub async fn flush_offline(State(state): State<AppState>) -> AppResult<Json<FlushReport>> {
    let start = Instant::now();
    println!("[REQUEST] POST /api/alerts/offline/flush");

    let report = state.dispatcher.flush_offline().await;

    println!(
        "[RESPONSE] POST /api/alerts/offline/flush -> 200 OK ({}ms) delivered={} requeued={} failed={}",
        start.elapsed().as_millis(),
        report.delivered,
        report.requeued,
        report.failed
    );

    Ok(Json(report))
}

pub async fn list_contacts(State(state): State<AppState>) -> AppResult<Json<ContactsResponse>> {
    let contacts = state.dispatcher.contacts().all_active();
    tracing::debug!(count = %contacts.len(), "Contacts served");
    Ok(Json(ContactsResponse {
        contacts: contacts.into_iter().map(Into::into).collect(),
    }))
}

use glof_core::{Alert, AlertStatus, Contact, UserType};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// ============================================================================
// Health check
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub online: bool,
    pub queued_alerts: usize,
    pub logged_alerts: usize,
}

// ============================================================================
// GET /api/weather
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl WeatherQuery {
    /// Both coordinates, if present and non-blank
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        let lat = self.lat.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let lon = self.lon.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((lat, lon))
    }
}

// ============================================================================
// POST /alert (dashboard quick alert)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QuickAlertRequest {
    #[serde(default = "default_lake_name")]
    pub lake_name: String,
    #[serde(default)]
    pub risk_score: f64,
}

fn default_lake_name() -> String {
    "Unknown Lake".to_string()
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn from_success(success: bool) -> Self {
        Self {
            status: if success { "success" } else { "failed" }.to_string(),
        }
    }
}

/// Render a score the way a person would type it: `85`, `72.5`
pub fn format_score(score: f64) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

// ============================================================================
// POST /api/alerts, POST /api/alerts/all-clear
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AlertRequest {
    pub lake_name: String,
    pub risk_level: String,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub target_user_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AllClearRequest {
    pub lake_name: String,
    #[serde(default)]
    pub target_user_types: Vec<String>,
}

pub fn parse_user_types(raw: &[String]) -> AppResult<Vec<UserType>> {
    raw.iter()
        .map(|s| s.parse::<UserType>().map_err(AppError::from))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<AlertStatus>,
    pub recipients: Vec<String>,
}

// ============================================================================
// GET /api/alerts, GET /api/alerts/offline
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct OfflineQueueResponse {
    pub online: bool,
    pub count: usize,
    pub alerts: Vec<Alert>,
}

// ============================================================================
// GET /api/contacts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ContactInfo {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub user_type: UserType,
    pub region: String,
    pub lake_area: String,
}

impl From<Contact> for ContactInfo {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone: c.phone,
            email: c.email,
            user_type: c.user_type,
            region: c.region,
            lake_area: c.lake_area,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<ContactInfo>,
}

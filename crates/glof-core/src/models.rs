//! Domain models shared by the alerting service
//!
//! Risk levels, recipient contacts and alert records. Timestamps shown to
//! recipients are rendered in Indian Standard Time since every monitored lake
//! lies in the Indian Himalaya.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GlofError;

// =============================================================================
// Risk & Recipient Classification
// =============================================================================

/// Severity attached to a GLOF alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Label used in outgoing messages
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = GlofError;

    /// Accepts the variant name (`critical`) or the message label (`High Risk`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "low risk" => Ok(RiskLevel::Low),
            "moderate" | "moderate risk" => Ok(RiskLevel::Moderate),
            "high" | "high risk" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(GlofError::UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Role of a notification recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Local,
    Admin,
    Rescue,
    EmergencyTeam,
}

impl UserType {
    pub const ALL: [UserType; 4] = [
        UserType::Local,
        UserType::Admin,
        UserType::Rescue,
        UserType::EmergencyTeam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Local => "LOCAL",
            UserType::Admin => "ADMIN",
            UserType::Rescue => "RESCUE",
            UserType::EmergencyTeam => "EMERGENCY_TEAM",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = GlofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "LOCAL" => Ok(UserType::Local),
            "ADMIN" => Ok(UserType::Admin),
            "RESCUE" => Ok(UserType::Rescue),
            "EMERGENCY_TEAM" => Ok(UserType::EmergencyTeam),
            _ => Err(GlofError::UnknownUserType(s.to_string())),
        }
    }
}

// =============================================================================
// Contacts
// =============================================================================

/// Marker for contacts that cover every lake
pub const ALL_LAKES: &str = "ALL";

/// A predefined alert recipient.
///
/// Contacts come from configuration at startup and are never created through
/// the API. An empty `phone` or `email` means that channel is not used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub user_type: UserType,
    pub region: String,
    #[serde(default = "default_lake_area")]
    pub lake_area: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_lake_area() -> String {
    ALL_LAKES.to_string()
}

fn default_active() -> bool {
    true
}

impl Contact {
    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }

    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }

    /// Whether this contact should hear about `lake`
    pub fn covers(&self, lake: &str) -> bool {
        self.lake_area == ALL_LAKES || self.lake_area == lake
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// Delivery state of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Pending,
    Sent,
    Failed,
    OfflineQueued,
}

/// A single GLOF alert and its delivery record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub glacial_lake: String,
    pub risk_level: RiskLevel,
    /// Human readable IST timestamp embedded in the message
    pub timestamp: String,
    pub message: String,
    /// Ids of the contacts the alert was addressed to
    pub contacts: Vec<String>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub additional_info: Option<String>,
}

impl Alert {
    /// Create a pending alert addressed to `contacts`.
    pub fn new(
        glacial_lake: &str,
        risk_level: RiskLevel,
        message: String,
        contacts: &[Contact],
        additional_info: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: alert_id(glacial_lake, now),
            glacial_lake: glacial_lake.to_string(),
            risk_level,
            timestamp: format_ist(now),
            message,
            contacts: contacts.iter().map(|c| c.id.clone()).collect(),
            status: AlertStatus::Pending,
            created_at: now,
            sent_at: None,
            retry_count: 0,
            additional_info,
        }
    }

    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.status = AlertStatus::Sent;
        self.sent_at = Some(at);
    }
}

// =============================================================================
// Time helpers
// =============================================================================

/// Indian Standard Time, UTC+05:30
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is within range")
}

/// Render `at` as `YYYY-mm-dd HH:MM IST`
pub fn format_ist(at: DateTime<Utc>) -> String {
    at.with_timezone(&ist()).format("%Y-%m-%d %H:%M IST").to_string()
}

/// Alert id: `glof_<lake>_<YYYYmmdd_HHMMSS>` with spaces in the lake name
/// replaced by underscores.
pub fn alert_id(glacial_lake: &str, at: DateTime<Utc>) -> String {
    format!(
        "glof_{}_{}",
        glacial_lake.replace(' ', "_"),
        at.with_timezone(&ist()).format("%Y%m%d_%H%M%S")
    )
}

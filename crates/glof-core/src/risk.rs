//! Mapping from numeric risk scores to alert severity

use crate::models::RiskLevel;

/// Score above which an alert is Critical
pub const CRITICAL_THRESHOLD: f64 = 70.0;

/// Score above which an alert is High
pub const HIGH_THRESHOLD: f64 = 40.0;

impl RiskLevel {
    /// Classify a 0-100 risk score supplied by an upstream predictor.
    ///
    /// Scores never map to `Low`: anything worth alerting on is at least
    /// Moderate. NaN is treated as Moderate.
    pub fn from_score(score: f64) -> Self {
        if score > CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if score > HIGH_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Moderate
        }
    }
}

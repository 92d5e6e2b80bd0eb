use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{SmsReceipt, SmsSender};
use crate::config::{mask_secret, Fast2SmsConfig};
use crate::error::{AppError, AppResult};

// ============================================================================
// Fast2SMS Client - Bulk SMS over the Quick route
// ============================================================================

#[derive(Debug, Deserialize)]
struct Fast2SmsResponse {
    #[serde(rename = "return", default)]
    ok: Option<bool>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    message: serde_json::Value,
}

#[derive(Clone)]
pub struct Fast2SmsClient {
    client: Client,
    api_key: String,
    sender_id: String,
    base_url: String,
}

impl Fast2SmsClient {
    pub fn new(config: &Fast2SmsConfig) -> AppResult<Self> {
        println!(
            "[SMS] Initializing Fast2SMS client (sender={}) with API key: {}",
            config.sender_id,
            mask_secret(&config.api_key)
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build SMS HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            sender_id: config.sender_id.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

/// Strip the +91 country code, dashes and spaces
pub fn normalize_number(number: &str) -> String {
    number.replace("+91", "").replace(['-', ' '], "")
}

#[async_trait]
impl SmsSender for Fast2SmsClient {
    async fn send(&self, numbers: &[String], message: &str) -> AppResult<SmsReceipt> {
        let start = Instant::now();
        let clean: Vec<String> = numbers.iter().map(|n| normalize_number(n)).collect();
        let joined = clean.join(",");

        tracing::debug!(recipients = %clean.len(), "Submitting bulk SMS to Fast2SMS");

        let form = [
            ("authorization", self.api_key.as_str()),
            ("sender_id", self.sender_id.as_str()),
            ("message", message),
            ("language", "english"),
            ("route", "q"),
            ("numbers", joined.as_str()),
        ];

        let response = self
            .client
            .post(&self.base_url)
            .header("authorization", &self.api_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Fast2SMS request failed");
                AppError::Notification(format!("SMS request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Fast2SMS API error");
            return Err(AppError::Notification(format!(
                "SMS API error {}: {}",
                status, body
            )));
        }

        let result: Fast2SmsResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Fast2SMS response");
            AppError::Notification(format!("Failed to parse SMS response: {}", e))
        })?;

        if result.ok == Some(false) {
            tracing::error!(message = %result.message, "Fast2SMS rejected the submission");
            return Err(AppError::Notification(format!(
                "SMS rejected: {}",
                result.message
            )));
        }

        tracing::info!(
            recipients = %clean.len(),
            request_id = ?result.request_id,
            duration_ms = %start.elapsed().as_millis(),
            "SMS sent"
        );

        Ok(SmsReceipt {
            recipients: clean.len(),
            request_id: result.request_id,
        })
    }
}

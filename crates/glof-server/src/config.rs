use config::{Config, ConfigError, Environment, File};
use glof_core::Contact;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub openweather: OpenWeatherConfig,
    pub fast2sms: Fast2SmsConfig,
    pub email: EmailConfig,
    pub offline: OfflineConfig,
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub lakes_csv: String,
    pub events_csv: String,
    /// Regions whose historical GLOF events are exposed
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

fn default_regions() -> Vec<String> {
    ["Uttarakhand", "Sikkim", "Ladakh", "Himachal Pradesh"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_ttl_seconds: u64,
    pub cache_capacity: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Fast2SmsConfig {
    pub api_key: String,
    pub sender_id: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; the SMTP username is used when empty
    #[serde(default)]
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OfflineConfig {
    pub probe_url: String,
    pub probe_timeout_seconds: u64,
    pub flush_interval_seconds: u64,
    pub max_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    pub history_capacity: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            .set_default("data.lakes_csv", "data/lakes.csv")?
            .set_default("data.events_csv", "data/glof_events.csv")?
            .set_default("openweather.api_key", "")?
            .set_default("openweather.base_url", "https://api.openweathermap.org")?
            .set_default("openweather.cache_ttl_seconds", 300)?
            .set_default("openweather.cache_capacity", 1_000)?
            .set_default("openweather.timeout_seconds", 10)?
            .set_default("fast2sms.api_key", "")?
            .set_default("fast2sms.sender_id", "GLOF")?
            .set_default("fast2sms.base_url", "https://www.fast2sms.com/dev/bulkV2")?
            .set_default("fast2sms.timeout_seconds", 30)?
            .set_default("email.enabled", false)?
            .set_default("email.smtp_host", "smtp.gmail.com")?
            .set_default("email.smtp_port", 587)?
            .set_default("email.username", "")?
            .set_default("email.password", "")?
            .set_default("offline.probe_url", "https://www.google.com")?
            .set_default("offline.probe_timeout_seconds", 5)?
            .set_default("offline.flush_interval_seconds", 60)?
            .set_default("offline.max_retries", 5)?
            .set_default("alerts.history_capacity", 500)?
            // Load from config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (GLOF__FAST2SMS__API_KEY, etc.)
            // Double underscore separates nested keys that contain underscores
            .add_source(
                Environment::with_prefix("GLOF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `abcd...wxyz` preview of a secret for startup logs
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "EMPTY".to_string()
    } else if secret.len() > 8 && secret.is_ascii() {
        format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
    } else {
        "***".to_string()
    }
}

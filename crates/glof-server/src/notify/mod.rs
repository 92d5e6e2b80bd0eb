//! Alert delivery: SMS, email and the offline queue

pub mod dispatch;
pub mod email;
pub mod history;
pub mod offline;
pub mod sms;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppResult;

pub use self::dispatch::{AlertDispatcher, FlushReport};
pub use self::history::AlertLog;
pub use self::offline::{HttpProbe, OfflineManager};

/// Result of a bulk SMS submission
#[derive(Debug, Clone, Serialize)]
pub struct SmsReceipt {
    pub recipients: usize,
    pub request_id: Option<String>,
}

/// Per-recipient outcome of an email round
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmailReport {
    pub successful_sends: usize,
    pub failed_recipients: Vec<String>,
}

impl EmailReport {
    pub fn is_success(&self) -> bool {
        self.failed_recipients.is_empty()
    }
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `message` to every number in one submission
    async fn send(&self, numbers: &[String], message: &str) -> AppResult<SmsReceipt>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send `body` to each recipient individually
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> AppResult<EmailReport>;
}

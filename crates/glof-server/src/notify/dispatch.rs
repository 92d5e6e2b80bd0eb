use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use glof_core::message::{all_clear_subject, alert_subject, format_alert, format_all_clear};
use glof_core::{format_ist, Alert, AlertStatus, Contact, ContactDirectory, RiskLevel, UserType};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{AlertLog, EmailSender, OfflineManager, SmsSender};

/// What happened to a single alert or all-clear request
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    /// Names of the contacts the message was addressed to
    pub recipients: Vec<String>,
    /// The alert record; absent for all-clears and when nobody matched
    pub alert: Option<Alert>,
}

impl DispatchOutcome {
    fn no_recipients() -> Self {
        Self {
            success: false,
            recipients: Vec::new(),
            alert: None,
        }
    }
}

/// Counts from one pass over the offline queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub delivered: usize,
    pub requeued: usize,
    pub failed: usize,
}

/// Result of trying every channel once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Failed,
    /// SMS failed and the connectivity probe says we are offline
    Offline,
}

/// Routes GLOF alerts to the contacts responsible for a lake.
///
/// SMS is always attempted first. Email goes out only while the system
/// believes it is online. An SMS failure triggers a connectivity probe; when
/// the probe fails the alert is parked in the offline queue and counts as
/// handled. Any successful SMS marks the system online again.
#[derive(Clone)]
pub struct AlertDispatcher {
    contacts: Arc<ContactDirectory>,
    sms: Arc<dyn SmsSender>,
    email: Option<Arc<dyn EmailSender>>,
    offline: Arc<OfflineManager>,
    history: Arc<AlertLog>,
    max_retries: u32,
}

impl AlertDispatcher {
    pub fn new(
        contacts: Arc<ContactDirectory>,
        sms: Arc<dyn SmsSender>,
        email: Option<Arc<dyn EmailSender>>,
        offline: Arc<OfflineManager>,
        history: Arc<AlertLog>,
        max_retries: u32,
    ) -> Self {
        let active = contacts.all_active();
        tracing::info!(
            contacts = %active.len(),
            email_enabled = %email.is_some(),
            "Alert dispatcher initialized"
        );
        for contact in &active {
            tracing::info!(
                id = %contact.id,
                name = %contact.name,
                user_type = %contact.user_type,
                lake_area = %contact.lake_area,
                "Loaded contact"
            );
        }

        Self {
            contacts,
            sms,
            email,
            offline,
            history,
            max_retries,
        }
    }

    pub fn contacts(&self) -> &ContactDirectory {
        &self.contacts
    }

    pub fn offline(&self) -> &OfflineManager {
        &self.offline
    }

    pub fn history(&self) -> &AlertLog {
        &self.history
    }

    /// An empty `user_types` slice means every role
    fn resolve(&self, lake: &str, user_types: &[UserType]) -> Vec<Contact> {
        self.contacts.for_lake(lake, user_types)
    }

    /// Send a GLOF alert for `lake` to every matching contact.
    pub async fn send_alert(
        &self,
        lake: &str,
        risk_level: RiskLevel,
        additional_info: Option<String>,
        user_types: &[UserType],
    ) -> DispatchOutcome {
        let start = Instant::now();
        let contacts = self.resolve(lake, user_types);

        if contacts.is_empty() {
            tracing::warn!(lake = %lake, "No contacts found for glacial lake");
            return DispatchOutcome::no_recipients();
        }

        let now = Utc::now();
        let message = format_alert(lake, risk_level, &format_ist(now), additional_info.as_deref());
        let mut alert = Alert::new(lake, risk_level, message, &contacts, additional_info, now);

        let success = match self.deliver(&mut alert, &contacts).await {
            Delivery::Sent => true,
            Delivery::Failed => false,
            Delivery::Offline => {
                alert.status = AlertStatus::OfflineQueued;
                self.offline.enqueue(alert.clone()).await;
                true
            }
        };

        let recipients: Vec<String> = contacts.iter().map(|c| c.name.clone()).collect();

        if success {
            tracing::info!(
                lake = %lake,
                risk = %risk_level,
                status = ?alert.status,
                recipients = ?recipients,
                duration_ms = %start.elapsed().as_millis(),
                "GLOF alert dispatched"
            );
        } else {
            tracing::error!(lake = %lake, risk = %risk_level, "Failed to send GLOF alert");
        }

        self.history.record(alert.clone()).await;

        DispatchOutcome {
            success,
            recipients,
            alert: Some(alert),
        }
    }

    /// Tell the contacts of `lake` that the immediate threat has passed.
    /// Only attempted while online; all-clears are never queued.
    pub async fn send_all_clear(&self, lake: &str, user_types: &[UserType]) -> DispatchOutcome {
        let contacts = self.resolve(lake, user_types);

        if contacts.is_empty() {
            tracing::warn!(lake = %lake, "No contacts found for glacial lake");
            return DispatchOutcome::no_recipients();
        }

        let message = format_all_clear(lake, &format_ist(Utc::now()));
        let subject = all_clear_subject(lake);
        let online = self.offline.is_online() || self.offline.check_connectivity().await;

        let mut sms_ok = false;
        let phones = phones_of(&contacts);
        if online && !phones.is_empty() {
            sms_ok = match self.sms.send(&phones, &message).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!(lake = %lake, error = %e, "All-clear SMS failed");
                    false
                }
            };
        }

        let email_ok = online && self.send_email(&contacts, &subject, &message).await;

        let recipients: Vec<String> = contacts.iter().map(|c| c.name.clone()).collect();
        let success = sms_ok || email_ok;
        if success {
            tracing::info!(lake = %lake, recipients = ?recipients, "All-clear sent");
        } else {
            tracing::error!(lake = %lake, online = %online, "Failed to send all-clear");
        }

        DispatchOutcome {
            success,
            recipients,
            alert: None,
        }
    }

    /// Re-deliver queued alerts once connectivity is back.
    pub async fn flush_offline(&self) -> FlushReport {
        let mut report = FlushReport::default();

        if self.offline.is_empty().await {
            if !self.offline.is_online() {
                self.offline.check_connectivity().await;
            }
            return report;
        }

        if !self.offline.check_connectivity().await {
            report.requeued = self.offline.len().await;
            tracing::debug!(queued = %report.requeued, "Still offline, keeping queued alerts");
            return report;
        }

        let queued = self.offline.drain().await;
        tracing::info!(count = %queued.len(), "Connectivity restored, flushing offline alerts");

        for mut alert in queued {
            alert.retry_count += 1;
            alert.status = AlertStatus::Pending;

            let contacts: Vec<Contact> = alert
                .contacts
                .iter()
                .filter_map(|id| self.contacts.by_id(id))
                .filter(|c| c.active)
                .cloned()
                .collect();

            let delivery = if contacts.is_empty() {
                tracing::warn!(alert_id = %alert.id, "Queued alert has no active contacts left");
                Delivery::Failed
            } else {
                self.deliver(&mut alert, &contacts).await
            };

            match delivery {
                Delivery::Sent => report.delivered += 1,
                Delivery::Offline if alert.retry_count < self.max_retries => {
                    alert.status = AlertStatus::OfflineQueued;
                    self.offline.enqueue(alert.clone()).await;
                    report.requeued += 1;
                }
                Delivery::Offline | Delivery::Failed => {
                    alert.status = AlertStatus::Failed;
                    tracing::error!(
                        alert_id = %alert.id,
                        retries = %alert.retry_count,
                        "Giving up on queued alert"
                    );
                    report.failed += 1;
                }
            }

            self.history.update(alert).await;
        }

        tracing::info!(
            delivered = %report.delivered,
            requeued = %report.requeued,
            failed = %report.failed,
            "Offline flush completed"
        );

        report
    }

    /// Run `flush_offline` every `every` until `cancel` fires.
    pub fn spawn_offline_flusher(&self, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Offline flusher stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        dispatcher.flush_offline().await;
                    }
                }
            }
        })
    }

    async fn deliver(&self, alert: &mut Alert, contacts: &[Contact]) -> Delivery {
        let mut sms_ok = false;
        let phones = phones_of(contacts);

        if !phones.is_empty() {
            match self.sms.send(&phones, &alert.message).await {
                Ok(_) => {
                    sms_ok = true;
                    self.offline.mark_online();
                }
                Err(e) => {
                    tracing::error!(alert_id = %alert.id, error = %e, "Alert SMS failed");
                    if !self.offline.check_connectivity().await {
                        return Delivery::Offline;
                    }
                }
            }
        } else if !self.offline.is_online() && !self.offline.check_connectivity().await {
            return Delivery::Offline;
        }

        let email_ok = self.offline.is_online()
            && self
                .send_email(
                    contacts,
                    &alert_subject(&alert.glacial_lake, alert.risk_level),
                    &alert.message,
                )
                .await;

        if sms_ok || email_ok {
            alert.mark_sent(Utc::now());
            Delivery::Sent
        } else {
            alert.status = AlertStatus::Failed;
            Delivery::Failed
        }
    }

    /// True when a mailer exists, someone has an address, and every
    /// recipient accepted the message.
    async fn send_email(&self, contacts: &[Contact], subject: &str, body: &str) -> bool {
        let Some(mailer) = &self.email else {
            return false;
        };

        let addresses: Vec<String> = contacts
            .iter()
            .filter(|c| c.has_email())
            .map(|c| c.email.clone())
            .collect();
        if addresses.is_empty() {
            return false;
        }

        match mailer.send(&addresses, subject, body).await {
            Ok(report) if report.is_success() => true,
            Ok(report) => {
                tracing::error!(failed = ?report.failed_recipients, "Some alert emails failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Email delivery failed");
                false
            }
        }
    }
}

fn phones_of(contacts: &[Contact]) -> Vec<String> {
    contacts
        .iter()
        .filter(|c| c.has_phone())
        .map(|c| c.phone.clone())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use glof_core::ALL_LAKES;

    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::notify::offline::tests::FakeProbe;
    use crate::notify::{EmailReport, SmsReceipt};

    /// Records submissions; fails while `failing` is set
    #[derive(Default)]
    pub(crate) struct FakeSms {
        pub failing: AtomicBool,
        pub sent: Mutex<Vec<(Vec<String>, String)>>,
    }

    #[async_trait]
    impl SmsSender for FakeSms {
        async fn send(&self, numbers: &[String], message: &str) -> AppResult<SmsReceipt> {
            if self.failing.load(Ordering::Relaxed) {
                return Err(AppError::Notification("gateway down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((numbers.to_vec(), message.to_string()));
            Ok(SmsReceipt {
                recipients: numbers.len(),
                request_id: Some("req-1".to_string()),
            })
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeEmail {
        pub failing: AtomicBool,
        pub subjects: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmailSender for FakeEmail {
        async fn send(&self, recipients: &[String], subject: &str, _body: &str) -> AppResult<EmailReport> {
            self.subjects.lock().unwrap().push(subject.to_string());
            if self.failing.load(Ordering::Relaxed) {
                return Ok(EmailReport {
                    successful_sends: 0,
                    failed_recipients: recipients.to_vec(),
                });
            }
            Ok(EmailReport {
                successful_sends: recipients.len(),
                failed_recipients: Vec::new(),
            })
        }
    }

    pub(crate) fn contacts() -> ContactDirectory {
        let make = |id: &str, user_type: UserType, lake_area: &str| Contact {
            id: id.to_string(),
            name: format!("{} name", id),
            phone: "+91-90000 00000".to_string(),
            email: format!("{}@example.org", id),
            user_type,
            region: "NORTH_REGION".to_string(),
            lake_area: lake_area.to_string(),
            active: true,
        };
        ContactDirectory::new(vec![
            make("defence_base", UserType::Admin, ALL_LAKES),
            make("emergency_team", UserType::EmergencyTeam, ALL_LAKES),
            make("pangong_store", UserType::Rescue, "Pangong Tso"),
        ])
        .unwrap()
    }

    pub(crate) struct Harness {
        pub dispatcher: AlertDispatcher,
        pub sms: Arc<FakeSms>,
        pub email: Arc<FakeEmail>,
        pub probe: Arc<FakeProbe>,
    }

    pub(crate) fn harness(with_email: bool) -> Harness {
        let sms = Arc::new(FakeSms::default());
        let email = Arc::new(FakeEmail::default());
        let probe = FakeProbe::new(true);
        let mailer: Option<Arc<dyn EmailSender>> = if with_email {
            Some(email.clone())
        } else {
            None
        };
        let dispatcher = AlertDispatcher::new(
            Arc::new(contacts()),
            sms.clone(),
            mailer,
            Arc::new(OfflineManager::new(probe.clone())),
            Arc::new(AlertLog::new(50)),
            3,
        );
        Harness {
            dispatcher,
            sms,
            email,
            probe,
        }
    }

    #[tokio::test]
    async fn test_alert_sent_over_sms_and_email() {
        let h = harness(true);
        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::Critical, Some("Rising".to_string()), &[])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.recipients.len(), 3);
        let alert = outcome.alert.unwrap();
        assert_eq!(alert.status, AlertStatus::Sent);
        assert!(alert.sent_at.is_some());
        assert!(alert.id.starts_with("glof_Pangong_Tso_"));

        let sent = h.sms.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.len(), 3);
        assert!(sent[0].1.contains("*Additional Info:* Rising"));
        assert_eq!(
            h.email.subjects.lock().unwrap().as_slice(),
            ["🚨 CRITICAL GLOF ALERT - Pangong Tso"]
        );
        assert_eq!(h.dispatcher.history().len().await, 1);
    }

    #[tokio::test]
    async fn test_user_type_filter_limits_recipients() {
        let h = harness(false);
        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::High, None, &[UserType::Rescue])
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.recipients, vec!["pangong_store name".to_string()]);
        assert_eq!(outcome.alert.unwrap().contacts, vec!["pangong_store".to_string()]);
    }

    #[tokio::test]
    async fn test_no_recipients_is_failure() {
        let h = harness(true);
        let outcome = h
            .dispatcher
            .send_alert("South Lhonak", RiskLevel::High, None, &[UserType::Local])
            .await;
        assert!(!outcome.success);
        assert!(outcome.alert.is_none());
        assert!(h.sms.sent.lock().unwrap().is_empty());
        assert_eq!(h.dispatcher.history().len().await, 0);
    }

    #[tokio::test]
    async fn test_sms_failure_while_offline_queues_alert() {
        let h = harness(true);
        h.sms.failing.store(true, Ordering::Relaxed);
        h.probe.set(false);

        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::Critical, None, &[])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.alert.unwrap().status, AlertStatus::OfflineQueued);
        assert_eq!(h.dispatcher.offline().len().await, 1);
        assert!(!h.dispatcher.offline().is_online());
        assert!(h.email.subjects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sms_failure_while_online_falls_back_to_email() {
        let h = harness(true);
        h.sms.failing.store(true, Ordering::Relaxed);

        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::High, None, &[])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.alert.unwrap().status, AlertStatus::Sent);
        assert_eq!(h.dispatcher.offline().len().await, 0);
    }

    #[tokio::test]
    async fn test_sms_failure_online_without_email_fails() {
        let h = harness(false);
        h.sms.failing.store(true, Ordering::Relaxed);

        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::High, None, &[])
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.alert.unwrap().status, AlertStatus::Failed);
        let history = h.dispatcher.history().recent(10).await;
        assert_eq!(history[0].status, AlertStatus::Failed);
    }

    #[tokio::test]
    async fn test_flush_redelivers_in_order_once_online() {
        let h = harness(false);
        h.sms.failing.store(true, Ordering::Relaxed);
        h.probe.set(false);

        h.dispatcher.send_alert("Pangong Tso", RiskLevel::High, None, &[]).await;
        h.dispatcher.send_alert("South Lhonak", RiskLevel::Critical, None, &[]).await;
        assert_eq!(h.dispatcher.offline().len().await, 2);

        // Still offline: nothing moves
        let report = h.dispatcher.flush_offline().await;
        assert_eq!(report, FlushReport { delivered: 0, requeued: 2, failed: 0 });

        h.sms.failing.store(false, Ordering::Relaxed);
        h.probe.set(true);
        let report = h.dispatcher.flush_offline().await;
        assert_eq!(report, FlushReport { delivered: 2, requeued: 0, failed: 0 });
        assert!(h.dispatcher.offline().is_empty().await);

        let sent = h.sms.sent.lock().unwrap();
        assert!(sent[0].1.contains("Pangong Tso"));
        assert!(sent[1].1.contains("South Lhonak"));
        drop(sent);

        let history = h.dispatcher.history().recent(10).await;
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|a| a.status == AlertStatus::Sent && a.retry_count == 1));
    }

    /// Answers with a fixed script, repeating the last answer
    struct ScriptedProbe {
        answers: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl crate::notify::offline::ConnectivityProbe for ScriptedProbe {
        async fn reachable(&self) -> bool {
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers[0]
            }
        }
    }

    #[tokio::test]
    async fn test_flush_gives_up_after_max_retries() {
        let sms = Arc::new(FakeSms::default());
        sms.failing.store(true, Ordering::Relaxed);
        // flush check sees online, then the SMS failure probe sees offline
        let probe = Arc::new(ScriptedProbe {
            answers: Mutex::new(vec![true, false, true, false]),
        });
        let dispatcher = AlertDispatcher::new(
            Arc::new(contacts()),
            sms.clone(),
            None,
            Arc::new(OfflineManager::new(probe)),
            Arc::new(AlertLog::new(50)),
            2,
        );

        let contact = dispatcher.contacts().all_active();
        let alert = Alert::new(
            "Pangong Tso",
            RiskLevel::High,
            "msg".to_string(),
            &contact,
            None,
            Utc::now(),
        );
        dispatcher.offline().enqueue(alert).await;

        let first = dispatcher.flush_offline().await;
        assert_eq!(first, FlushReport { delivered: 0, requeued: 1, failed: 0 });
        assert_eq!(dispatcher.offline().snapshot().await[0].retry_count, 1);

        let second = dispatcher.flush_offline().await;
        assert_eq!(second, FlushReport { delivered: 0, requeued: 0, failed: 1 });
        assert!(dispatcher.offline().is_empty().await);

        let history = dispatcher.history().recent(10).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AlertStatus::Failed);
        assert_eq!(history[0].retry_count, 2);
    }

    #[tokio::test]
    async fn test_all_clear_uses_both_channels_when_online() {
        let h = harness(true);
        let outcome = h.dispatcher.send_all_clear("Pangong Tso", &[]).await;
        assert!(outcome.success);
        assert!(outcome.alert.is_none());
        assert!(h.sms.sent.lock().unwrap()[0].1.starts_with("✅ *[GLOF ALL CLEAR]*"));
        assert_eq!(
            h.email.subjects.lock().unwrap().as_slice(),
            ["GLOF All Clear - Pangong Tso"]
        );
    }

    #[tokio::test]
    async fn test_all_clear_skipped_while_offline() {
        let h = harness(true);
        h.probe.set(false);
        h.dispatcher.offline().check_connectivity().await;

        let outcome = h.dispatcher.send_all_clear("Pangong Tso", &[]).await;
        assert!(!outcome.success);
        assert!(h.sms.sent.lock().unwrap().is_empty());
        assert_eq!(h.dispatcher.offline().len().await, 0);
    }

    #[tokio::test]
    async fn test_connectivity_recovers_after_outage() {
        let h = harness(true);
        h.sms.failing.store(true, Ordering::Relaxed);
        h.probe.set(false);

        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::Critical, None, &[])
            .await;
        assert_eq!(outcome.alert.unwrap().status, AlertStatus::OfflineQueued);
        // Queue emptied without the flag ever being refreshed
        h.dispatcher.offline().drain().await;
        assert!(!h.dispatcher.offline().is_online());

        h.sms.failing.store(false, Ordering::Relaxed);
        h.probe.set(true);

        let outcome = h.dispatcher.send_all_clear("Pangong Tso", &[]).await;
        assert!(outcome.success);
        assert_eq!(h.sms.sent.lock().unwrap().len(), 1);
        assert!(h.dispatcher.offline().is_online());
        assert_eq!(
            h.email.subjects.lock().unwrap().as_slice(),
            ["GLOF All Clear - Pangong Tso"]
        );
    }

    #[tokio::test]
    async fn test_flush_with_empty_queue_refreshes_online_flag() {
        let h = harness(false);
        h.probe.set(false);
        h.dispatcher.offline().check_connectivity().await;
        assert!(!h.dispatcher.offline().is_online());

        h.probe.set(true);
        let report = h.dispatcher.flush_offline().await;
        assert_eq!(report, FlushReport::default());
        assert!(h.dispatcher.offline().is_online());
    }

    #[tokio::test]
    async fn test_sms_success_with_stale_offline_flag_restores_email() {
        let h = harness(true);
        h.probe.set(false);
        h.dispatcher.offline().check_connectivity().await;
        assert!(!h.dispatcher.offline().is_online());

        // Probe target still unreachable, but the SMS gateway answers
        let outcome = h
            .dispatcher
            .send_alert("Pangong Tso", RiskLevel::High, None, &[])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.alert.unwrap().status, AlertStatus::Sent);
        assert!(h.dispatcher.offline().is_online());
        assert_eq!(
            h.email.subjects.lock().unwrap().as_slice(),
            ["🚨 HIGH RISK GLOF ALERT - Pangong Tso"]
        );
    }

    #[tokio::test]
    async fn test_back_to_back_queued_alerts_each_update_their_entry() {
        let h = harness(false);
        h.sms.failing.store(true, Ordering::Relaxed);
        h.probe.set(false);

        h.dispatcher.send_alert("Pangong Tso", RiskLevel::High, None, &[]).await;
        h.dispatcher.send_alert("Pangong Tso", RiskLevel::Critical, None, &[]).await;

        h.sms.failing.store(false, Ordering::Relaxed);
        h.probe.set(true);
        let report = h.dispatcher.flush_offline().await;
        assert_eq!(report.delivered, 2);

        let history = h.dispatcher.history().recent(10).await;
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|a| a.status == AlertStatus::Sent));
    }

    #[tokio::test]
    async fn test_flusher_stops_on_cancel() {
        let h = harness(false);
        let cancel = CancellationToken::new();
        let handle = h
            .dispatcher
            .spawn_offline_flusher(Duration::from_millis(10), cancel.clone());
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        tokio_test::assert_ok!(handle.await);
    }
}

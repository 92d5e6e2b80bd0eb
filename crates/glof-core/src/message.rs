//! Message templates for alerts and all-clear notices
//!
//! The same plain-text body goes out over SMS and as the text part of the
//! email; the email also carries an HTML rendering of it.

use crate::models::RiskLevel;

/// Body of a GLOF alert.
pub fn format_alert(
    glacial_lake: &str,
    risk_level: RiskLevel,
    timestamp: &str,
    additional_info: Option<&str>,
) -> String {
    let mut message = format!(
        "⚠️ *[{} GLOF ALERT]*\n\n\
         *Glacial Lake:* {}\n\
         *Risk Level:* {}\n\
         *Time:* {}\n\n\
         *Immediate evacuation advised. Emergency team notified.*",
        risk_level.label().to_uppercase(),
        glacial_lake,
        risk_level.label(),
        timestamp,
    );

    if let Some(info) = additional_info.filter(|i| !i.is_empty()) {
        message.push_str("\n\n*Additional Info:* ");
        message.push_str(info);
    }

    message
}

/// Body of an all-clear notice
pub fn format_all_clear(glacial_lake: &str, timestamp: &str) -> String {
    format!(
        "✅ *[GLOF ALL CLEAR]*\n\n\
         *Glacial Lake:* {}\n\
         *Status:* Risk Level Reduced\n\
         *Time:* {}\n\n\
         *Immediate threat has passed. Continue monitoring.*",
        glacial_lake, timestamp,
    )
}

pub fn alert_subject(glacial_lake: &str, risk_level: RiskLevel) -> String {
    format!(
        "🚨 {} GLOF ALERT - {}",
        risk_level.label().to_uppercase(),
        glacial_lake
    )
}

pub fn all_clear_subject(glacial_lake: &str) -> String {
    format!("GLOF All Clear - {}", glacial_lake)
}

/// HTML part of an alert email wrapping the plain-text `message`.
pub fn render_email_html(message: &str) -> String {
    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif;">
    <div style="background-color: #ff4444; color: white; padding: 20px; border-radius: 10px; margin-bottom: 20px;">
        <h2>🚨 GLACIAL LAKE OUTBURST FLOOD ALERT</h2>
    </div>
    <div style="background-color: #f9f9f9; padding: 20px; border-radius: 5px;">
        <pre style="font-family: Arial, sans-serif; font-size: 14px; line-height: 1.6;">
{}
        </pre>
    </div>
    <div style="margin-top: 20px; padding: 15px; background-color: #ffffcc; border-radius: 5px;">
        <strong>⚠️ This is an automated emergency alert. Take immediate action as advised.</strong>
    </div>
</body>
</html>"#,
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_template() {
        let msg = format_alert("Pangong Tso", RiskLevel::Critical, "2024-06-02 02:15 IST", None);
        assert_eq!(
            msg,
            "⚠️ *[CRITICAL GLOF ALERT]*\n\n\
             *Glacial Lake:* Pangong Tso\n\
             *Risk Level:* Critical\n\
             *Time:* 2024-06-02 02:15 IST\n\n\
             *Immediate evacuation advised. Emergency team notified.*"
        );
    }

    #[test]
    fn test_alert_template_with_additional_info() {
        let msg = format_alert(
            "South Lhonak",
            RiskLevel::High,
            "2024-06-02 02:15 IST",
            Some("Water levels rising rapidly."),
        );
        assert!(msg.starts_with("⚠️ *[HIGH RISK GLOF ALERT]*"));
        assert!(msg.contains("*Risk Level:* High Risk\n"));
        assert!(msg.ends_with("notified.*\n\n*Additional Info:* Water levels rising rapidly."));
    }

    #[test]
    fn test_empty_additional_info_is_dropped() {
        let msg = format_alert("X", RiskLevel::Moderate, "t", Some(""));
        assert!(!msg.contains("Additional Info"));
    }

    #[test]
    fn test_all_clear_template() {
        assert_eq!(
            format_all_clear("Pangong Tso", "2024-06-02 02:15 IST"),
            "✅ *[GLOF ALL CLEAR]*\n\n\
             *Glacial Lake:* Pangong Tso\n\
             *Status:* Risk Level Reduced\n\
             *Time:* 2024-06-02 02:15 IST\n\n\
             *Immediate threat has passed. Continue monitoring.*"
        );
    }

    #[test]
    fn test_subjects() {
        assert_eq!(
            alert_subject("Pangong Tso", RiskLevel::Critical),
            "🚨 CRITICAL GLOF ALERT - Pangong Tso"
        );
        assert_eq!(all_clear_subject("Pangong Tso"), "GLOF All Clear - Pangong Tso");
    }

    #[test]
    fn test_html_escapes_message() {
        let html = render_email_html("level <5m> & rising");
        assert!(html.contains("level &lt;5m&gt; &amp; rising"));
        assert!(html.contains("GLACIAL LAKE OUTBURST FLOOD ALERT"));
    }
}

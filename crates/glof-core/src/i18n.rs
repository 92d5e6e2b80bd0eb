//! Dashboard label translations

use std::collections::BTreeMap;

pub const DEFAULT_LANGUAGE: &str = "en";

pub const SUPPORTED_LANGUAGES: [&str; 4] = ["en", "hi", "mr", "gu"];

const KEYS: [&str; 5] = [
    "dashboard",
    "lake_database",
    "ml_predictions",
    "risk_assessment",
    "safety",
];

fn labels(lang: &str) -> Option<[&'static str; 5]> {
    match lang {
        "en" => Some([
            "Dashboard",
            "Lake Database",
            "ML & Predictions",
            "Risk Assessment",
            "Safety Precautions",
        ]),
        "hi" => Some([
            "डैशबोर्ड",
            "झील डेटाबेस",
            "एमएल और भविष्यवाणियाँ",
            "जोखिम मूल्यांकन",
            "सुरक्षा सावधानियाँ",
        ]),
        "mr" => Some([
            "डॅशबोर्ड",
            "तलाव डेटाबेस",
            "एमएल आणि अंदाज",
            "धोका मूल्यांकन",
            "सुरक्षा खबरदारी",
        ]),
        "gu" => Some([
            "ડેશબોર્ડ",
            "સરોવર ડેટાબેઝ",
            "એમએલ અને આગાહીઓ",
            "જોખમ મૂલ્યાંકન",
            "સલામતી સાવચેતીઓ",
        ]),
        _ => None,
    }
}

/// Labels for `lang`, falling back to English for unknown codes.
pub fn translations(lang: &str) -> BTreeMap<&'static str, &'static str> {
    let values = labels(&lang.to_lowercase())
        .or_else(|| labels(DEFAULT_LANGUAGE))
        .unwrap_or_default();
    KEYS.into_iter().zip(values).collect()
}

//! Error types for GLOF Core

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GlofError {
    #[error("Duplicate contact id: {0}")]
    DuplicateContact(String),

    #[error("Contact {0} has neither a phone number nor an email address")]
    UnreachableContact(String),

    #[error("Unknown risk level: {0}")]
    UnknownRiskLevel(String),

    #[error("Unknown user type: {0}")]
    UnknownUserType(String),
}

pub type GlofResult<T> = Result<T, GlofError>;

//! # GLOF Core
//!
//! Domain types and pure logic for GLOF Watch, the glacial lake outburst
//! flood alerting service.
//!
//! Nothing in this crate performs I/O. The server crate wires these types to
//! SMS, email, weather and CSV sources.

pub mod contacts;
pub mod error;
pub mod i18n;
pub mod message;
pub mod models;
pub mod risk;

pub use contacts::*;
pub use error::*;
pub use models::*;

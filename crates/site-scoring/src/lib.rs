//! Location suitability scoring for solar, battery storage and EV charging sites.
//!
//! Raw site attributes are normalized per factor, combined into a weighted
//! 0–100 score and exported as JSON, CSV or an annotated spreadsheet.

pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod scoring;
pub mod tabular;
pub mod telemetry;
pub mod templates;

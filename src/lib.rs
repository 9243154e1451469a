// ===============================
// src/lib.rs
// ===============================
pub mod domain;
pub mod config;
pub mod metrics;
pub mod literal;
pub mod snapshot;
pub mod datasheet;
pub mod catalog;      // parse_catalog / classify / normalize
pub mod fetch;        // remote snapshot page (single GET, no retry)
pub mod commission;   // rate book + compute_commission
pub mod sale;
pub mod stock;
pub mod store;        // versioned JSON key/value store + backup

pub use catalog::{classify, normalize, parse_catalog};
pub use commission::{compute_commission, CommissionError, RateBook};
pub use fetch::{fetch_remote_catalog, FetchError};

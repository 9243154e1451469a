// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// -------- Catalog ingestion --------
pub static CATALOG_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("catalog_fetch_total", "remote catalog fetches (label: status)"),
        &["status"],
    )
    .unwrap()
});

pub static CATALOG_PRODUCTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("catalog_products_total", "catalog products emitted by ingestion").unwrap()
});

pub static CATALOG_DUPLICATES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "catalog_duplicates_dropped_total",
        "seed entries dropped because their ref was already emitted",
    )
    .unwrap()
});

// -------- Commission resolution --------
pub static COMMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("commission_computed_total", "commissions resolved (label: channel)"),
        &["channel"],
    )
    .unwrap()
});

pub static COMMISSION_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("commission_errors_total", "commission resolution failures (label: reason)"),
        &["reason"],
    )
    .unwrap()
});

pub fn init() {
    // Register all metrics to the custom registry
    for m in [
        REGISTRY.register(Box::new(CATALOG_FETCHES.clone())),
        REGISTRY.register(Box::new(CATALOG_PRODUCTS.clone())),
        REGISTRY.register(Box::new(CATALOG_DUPLICATES.clone())),
        REGISTRY.register(Box::new(COMMISSIONS.clone())),
        REGISTRY.register(Box::new(COMMISSION_ERRORS.clone())),
    ] {
        let _ = m;
    }
}

// Encode all metrics in Prometheus text format
pub fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

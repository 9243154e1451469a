// ===============================
// src/sale.rs
// ===============================
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{classify, normalize_ref, tidy_ref};
use crate::commission::{CommissionError, RateBook};
use crate::domain::{CatalogProduct, Category, Channel, CommissionInput, PaymentMethod, Sale};

#[derive(Debug, Error, PartialEq)]
pub enum SaleError {
    #[error("sale quantity must be positive")]
    NonPositiveQty,
    #[error(transparent)]
    Commission(#[from] CommissionError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleInput {
    #[serde(rename = "ref")]
    pub reference: String,
    pub qty: u64,
    pub channel: Channel,
    /// Overrides the catalog / inferred category when set.
    #[serde(default)]
    pub category: Option<Category>,
    pub payment_method: PaymentMethod,
    pub transaction_value: f64,
    #[serde(default)]
    pub power_wp: Option<f64>,
}

/// Merge sell-side commission with the buy-side unit cost from the catalog.
pub fn record_sale(
    book: &RateBook,
    input: SaleInput,
    catalog: &[CatalogProduct],
) -> Result<Sale, SaleError> {
    if input.qty == 0 {
        return Err(SaleError::NonPositiveQty);
    }
    let key = normalize_ref(&input.reference);
    let entry = catalog.iter().find(|p| normalize_ref(&p.reference) == key);
    // ref yang disimpan = teks katalog kalau cocok
    let reference = entry.map_or_else(|| tidy_ref(&input.reference), |p| p.reference.clone());
    if entry.is_none() {
        warn!(%reference, "sale ref not in catalog, buy cost unknown");
    }

    let category = input
        .category
        .or_else(|| entry.map(|p| p.category))
        .unwrap_or_else(|| classify(&reference));

    let commission = book.compute(&CommissionInput {
        channel: input.channel,
        category,
        payment_method: input.payment_method,
        transaction_value: input.transaction_value,
        power_wp: input.power_wp,
    })?;

    info!(
        %reference,
        qty = input.qty,
        channel = %input.channel,
        commission = commission.commission_eur,
        fee = commission.payment_fee,
        "sale recorded"
    );

    Ok(Sale {
        reference,
        qty: input.qty,
        channel: input.channel,
        category,
        payment_method: input.payment_method,
        transaction_value: input.transaction_value,
        power_wp: input.power_wp,
        buy_price_unit: entry.map(|p| p.buy_price_unit).unwrap_or(0.0),
        catalog_match: entry.is_some(),
        commission,
        sold_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

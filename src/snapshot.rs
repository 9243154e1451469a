// ===============================
// src/snapshot.rs
// ===============================
//
// Ekstraksi data mentah dari dokumen (HTML + script tertanam):
// - ParsedEntry      : baris seed produk (sebelum dedup)
// - PricingSnapshot  : scalar kurs/biaya + daftar local charges
//
// Semua field punya fallback (fail-soft); blok seed yang hilang -> list kosong.
//
use serde_json::Value;
use tracing::{debug, warn};

use crate::literal::{as_bool, as_f64, find_assignment};

/// AED per USD (currency peg), used when the document carries no auxiliary rate.
pub const DEFAULT_AUX_RATE: f64 = 3.6725;

/// Largest seed quantity accepted; rows above it are treated as malformed.
pub const MAX_ENTRY_QTY: f64 = 1.0e9;

/// Names of the literals looked up in the document.
#[derive(Debug, Clone)]
pub struct SnapshotLayout {
    pub seed_products: &'static str,
    pub local_charges: &'static str,
    pub exchange_rate: &'static str,
    pub freight_quote: &'static str,
    pub customs_cost: &'static str,
    pub container_count: &'static str,
    pub aux_rate: &'static str,
    // key di dalam tiap entry
    pub entry_order: &'static str,
    pub entry_ref: &'static str,
    pub entry_qty: &'static str,
    pub entry_unit_price: &'static str,
    pub charge_amount: &'static str,
    pub charge_included: &'static str,
}

impl Default for SnapshotLayout {
    fn default() -> Self {
        Self {
            seed_products: "shippingSeedProducts",
            local_charges: "localCharges",
            exchange_rate: "exchangeRate",
            freight_quote: "freightQuoteEUR",
            customs_cost: "customsCostsEUR",
            container_count: "containerCount",
            aux_rate: "aedPerUsd",
            entry_order: "order",
            entry_ref: "ref",
            entry_qty: "qty",
            entry_unit_price: "unitPriceUSD",
            charge_amount: "amountAED",
            charge_included: "included",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub order: i64,
    pub reference: String,
    pub qty: u64,
    pub unit_price_source: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalCharge {
    pub amount: f64,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingSnapshot {
    pub exchange_rate: f64,
    pub freight_quote: f64,
    pub customs_cost: f64,
    pub container_count: f64,
    pub aux_rate: f64,
    pub local_charges: Vec<LocalCharge>,
}

impl PricingSnapshot {
    /// Sum of included local-charge amounts, in the local currency.
    pub fn included_charges_local(&self) -> f64 {
        self.local_charges.iter().filter(|c| c.included).map(|c| c.amount).sum()
    }

    /// Included local charges converted local -> source (aux rate) -> target (exchange rate).
    pub fn local_charges_target(&self) -> f64 {
        if self.aux_rate <= 0.0 {
            return 0.0;
        }
        (self.included_charges_local() / self.aux_rate) * self.exchange_rate
    }

    /// Container-level transport cost (freight + customs + local charges) for all containers.
    pub fn transport_total(&self) -> f64 {
        let per_container = self.freight_quote + self.customs_cost + self.local_charges_target();
        per_container * self.container_count
    }
}

/// Seed entries in document order. `None` when the seed block is absent or unreadable.
pub fn extract_entries(text: &str, layout: &SnapshotLayout) -> Option<Vec<ParsedEntry>> {
    let block = match find_assignment(text, layout.seed_products) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!(name = layout.seed_products, "seed block is not an array literal");
            return None;
        }
        None => return None,
    };

    let total = block.len();
    let entries: Vec<ParsedEntry> = block
        .iter()
        .filter_map(|item| entry_from(item, layout))
        .collect();
    if entries.len() < total {
        debug!(skipped = total - entries.len(), "seed entries without required fields skipped");
    }
    Some(entries)
}

fn entry_from(item: &Value, layout: &SnapshotLayout) -> Option<ParsedEntry> {
    let obj = item.as_object()?;
    let reference = match obj.get(layout.entry_ref)? {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        _ => return None,
    };
    let order = obj.get(layout.entry_order).and_then(as_f64)? as i64;
    let qty = obj.get(layout.entry_qty).and_then(as_f64)?;
    // hanya bilangan bulat 0..=MAX_ENTRY_QTY; 2.5 atau 1e19 -> baris dilewati
    if !(0.0..=MAX_ENTRY_QTY).contains(&qty) || qty.fract() != 0.0 {
        debug!(%reference, qty, "seed entry with unusable qty skipped");
        return None;
    }
    let unit_price_source = obj.get(layout.entry_unit_price).and_then(as_f64)?;
    Some(ParsedEntry { order, reference, qty: qty as u64, unit_price_source })
}

/// Scalars + local charges, every missing piece replaced by its fallback.
pub fn extract_pricing(text: &str, layout: &SnapshotLayout) -> PricingSnapshot {
    let local_charges = match find_assignment(text, layout.local_charges) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let amount = obj.get(layout.charge_amount).and_then(as_f64)?;
                let included = obj.get(layout.charge_included).and_then(as_bool).unwrap_or(false);
                Some(LocalCharge { amount, included })
            })
            .collect(),
        _ => {
            debug!(name = layout.local_charges, "local charges missing, total = 0");
            Vec::new()
        }
    };

    PricingSnapshot {
        exchange_rate: scalar(text, layout.exchange_rate, 1.0),
        freight_quote: scalar(text, layout.freight_quote, 0.0),
        customs_cost: scalar(text, layout.customs_cost, 0.0),
        container_count: scalar(text, layout.container_count, 1.0),
        aux_rate: scalar(text, layout.aux_rate, DEFAULT_AUX_RATE),
        local_charges,
    }
}

fn scalar(text: &str, name: &str, fallback: f64) -> f64 {
    match find_assignment(text, name).as_ref().and_then(as_f64) {
        Some(v) => v,
        None => {
            debug!(field = name, fallback, "scalar missing, using fallback");
            fallback
        }
    }
}

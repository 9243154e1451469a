// ===============================
// src/commission.rs (rate book: tier tables + overrides + payment fee)
// ===============================
//
// Resolusi komisi:
//   1) override (dievaluasi lebih dulu, bypass tabel)
//   2) tabel tier per (channel, category): floor lookup atas breakpoint naik
//   3) fee pembayaran dari side table (channel, payment_method)
//
// Label & nilai komisi selalu berasal dari tier/override yang sama.
// Komisi dibulatkan 1 desimal (beda dengan harga katalog: 2 desimal).
//
use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Category, Channel, CommissionInput, CommissionResult, PaymentMethod};
use crate::metrics::{COMMISSIONS, COMMISSION_ERRORS};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommissionError {
    #[error("transaction value must be non-negative, got {0}")]
    NegativeValue(f64),
    #[error("no commission tiers configured for {channel} / {category}")]
    UnknownTier { channel: Channel, category: Category },
    #[error("no tier covers value {value} for {channel} / {category}")]
    BelowFirstTier { channel: Channel, category: Category, value: f64 },
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

impl CommissionError {
    fn reason(&self) -> &'static str {
        match self {
            CommissionError::NegativeValue(_) => "negative_value",
            CommissionError::UnknownTier { .. } => "unknown_tier",
            CommissionError::BelowFirstTier { .. } => "below_first_tier",
            CommissionError::UnknownChannel(_) => "unknown_channel",
            CommissionError::UnknownCategory(_) => "unknown_category",
            CommissionError::UnknownPaymentMethod(_) => "unknown_payment_method",
        }
    }
}

/// One breakpoint row: applies to values `>= threshold` up to the next row.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub threshold: f64,
    /// Percentage points (3.99 = 3.99%).
    pub rate_pct: f64,
    pub label: &'static str,
}

const fn tier(threshold: f64, rate_pct: f64, label: &'static str) -> Tier {
    Tier { threshold, rate_pct, label }
}

/// Breakpoints sorted ascending by threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<Tier>) -> Self {
        tiers.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        Self { tiers }
    }

    pub fn flat(rate_pct: f64, label: &'static str) -> Self {
        Self::new(vec![tier(0.0, rate_pct, label)])
    }

    /// Row with the greatest threshold `<= value`.
    pub fn lookup(&self, value: f64) -> Option<&Tier> {
        self.tiers.iter().take_while(|t| t.threshold <= value).last()
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }
}

/// Rule that bypasses the tier table when its condition holds.
#[derive(Clone)]
pub struct Override {
    pub channel: Channel,
    pub category: Category,
    pub label: &'static str,
    pub applies: fn(&CommissionInput) -> bool,
    pub amount: fn(&CommissionInput) -> f64,
}

impl std::fmt::Debug for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Override")
            .field("channel", &self.channel)
            .field("category", &self.category)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

pub const UTILITY_SCALE_WP: f64 = 1_000_000.0;
const EUR_PER_WP: f64 = 0.01;

fn utility_scale(input: &CommissionInput) -> bool {
    input.power_wp.map_or(false, |wp| wp >= UTILITY_SCALE_WP)
}

fn cent_per_wp(input: &CommissionInput) -> f64 {
    input.power_wp.unwrap_or(0.0) * EUR_PER_WP
}

#[derive(Debug, Clone)]
pub struct RateBook {
    pub tables: HashMap<(Channel, Category), TierTable>,
    pub overrides: Vec<Override>,
    pub payment_fees: HashMap<(Channel, PaymentMethod), f64>,
}

impl Default for RateBook {
    fn default() -> Self {
        let mut tables = HashMap::new();

        // Market A: tier persentase per kategori
        tables.insert(
            (Channel::MarketA, Category::Inverters),
            TierTable::new(vec![
                tier(0.0, 3.99, "3.99%"),
                tier(5_000.0, 3.49, "3.49%"),
                tier(20_000.0, 2.99, "2.99%"),
                tier(50_000.0, 2.49, "2.49%"),
                tier(100_000.0, 1.99, "1.99%"),
            ]),
        );
        tables.insert(
            (Channel::MarketA, Category::Batteries),
            TierTable::new(vec![
                tier(0.0, 3.99, "3.99%"),
                tier(5_000.0, 3.49, "3.49%"),
                tier(20_000.0, 2.99, "2.99%"),
                tier(50_000.0, 2.49, "2.49%"),
                tier(100_000.0, 1.99, "1.99%"),
            ]),
        );
        tables.insert(
            (Channel::MarketA, Category::Accessories),
            TierTable::new(vec![
                tier(0.0, 3.99, "3.99%"),
                tier(20_000.0, 3.37, "3.37%"),
                tier(50_000.0, 2.87, "2.87%"),
                tier(80_000.0, 2.37, "2.37%"),
                tier(100_000.0, 1.97, "1.97%"),
            ]),
        );
        tables.insert(
            (Channel::MarketA, Category::SolarPanels),
            TierTable::new(vec![
                tier(0.0, 2.49, "2.49%"),
                tier(20_000.0, 1.99, "1.99%"),
                tier(50_000.0, 1.69, "1.69%"),
                tier(100_000.0, 1.29, "1.29%"),
                tier(150_000.0, 0.97, "0.97%"),
            ]),
        );

        // Market B: flat 5% (panel di bawah skala utilitas juga 5%)
        for cat in Category::ALL {
            tables.insert((Channel::MarketB, cat), TierTable::flat(5.0, "5%"));
        }

        let overrides = vec![Override {
            channel: Channel::MarketB,
            category: Category::SolarPanels,
            label: "1 cent/Wp",
            applies: utility_scale,
            amount: cent_per_wp,
        }];

        let mut payment_fees = HashMap::new();
        payment_fees.insert((Channel::MarketA, PaymentMethod::Card), 5.0);

        Self { tables, overrides, payment_fees }
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

impl RateBook {
    pub fn payment_fee(&self, channel: Channel, method: PaymentMethod) -> f64 {
        self.payment_fees.get(&(channel, method)).copied().unwrap_or(0.0)
    }

    pub fn compute(&self, input: &CommissionInput) -> Result<CommissionResult, CommissionError> {
        let res = self.resolve(input);
        match &res {
            Ok(_) => COMMISSIONS.with_label_values(&[input.channel.as_str()]).inc(),
            Err(e) => COMMISSION_ERRORS.with_label_values(&[e.reason()]).inc(),
        }
        res
    }

    fn resolve(&self, input: &CommissionInput) -> Result<CommissionResult, CommissionError> {
        let value = input.transaction_value;
        if !(value >= 0.0) {
            return Err(CommissionError::NegativeValue(value));
        }
        let payment_fee = self.payment_fee(input.channel, input.payment_method);

        if let Some(ov) = self.overrides.iter().find(|o| {
            o.channel == input.channel && o.category == input.category && (o.applies)(input)
        }) {
            debug!(channel = %input.channel, category = %input.category, label = ov.label, "commission override");
            return Ok(CommissionResult {
                commission_rate_display: ov.label.to_string(),
                commission_eur: round1((ov.amount)(input)),
                payment_fee,
            });
        }

        let table = self
            .tables
            .get(&(input.channel, input.category))
            .ok_or(CommissionError::UnknownTier { channel: input.channel, category: input.category })?;
        let t = table.lookup(value).ok_or(CommissionError::BelowFirstTier {
            channel: input.channel,
            category: input.category,
            value,
        })?;

        debug!(channel = %input.channel, category = %input.category, value, tier = t.label, "commission tier");
        Ok(CommissionResult {
            commission_rate_display: t.label.to_string(),
            commission_eur: round1(value * t.rate_pct / 100.0),
            payment_fee,
        })
    }
}

static DEFAULT_BOOK: Lazy<RateBook> = Lazy::new(RateBook::default);

/// Commission + payment fee for a sale using the built-in rate book.
pub fn compute_commission(input: &CommissionInput) -> Result<CommissionResult, CommissionError> {
    DEFAULT_BOOK.compute(input)
}

/// Build a `CommissionInput` from loose string identifiers (CLI, imported rows).
pub fn input_from_strs(
    channel: &str,
    category: &str,
    payment_method: &str,
    transaction_value: f64,
    power_wp: Option<f64>,
) -> Result<CommissionInput, CommissionError> {
    Ok(CommissionInput {
        channel: Channel::parse(channel).ok_or_else(|| CommissionError::UnknownChannel(channel.to_string()))?,
        category: Category::parse(category)
            .ok_or_else(|| CommissionError::UnknownCategory(category.to_string()))?,
        payment_method: PaymentMethod::parse(payment_method)
            .ok_or_else(|| CommissionError::UnknownPaymentMethod(payment_method.to_string()))?,
        transaction_value,
        power_wp,
    })
}

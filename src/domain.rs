// ===============================
// src/domain.rs
// ===============================
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed product category set used by the catalog and the rate book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Batteries,
    #[serde(rename = "Solar Panels")]
    SolarPanels,
    Inverters,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Batteries,
        Category::SolarPanels,
        Category::Inverters,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Batteries => "Batteries",
            Category::SolarPanels => "Solar Panels",
            Category::Inverters => "Inverters",
            Category::Accessories => "Accessories",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "batteries" | "battery" => Some(Category::Batteries),
            "solar panels" | "solar panel" | "panels" => Some(Category::SolarPanels),
            "inverters" | "inverter" => Some(Category::Inverters),
            "accessories" | "accessory" => Some(Category::Accessories),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "ref")]
    pub reference: String,
    pub buy_price_unit: f64,
    pub category: Category,
    #[serde(default)]
    pub initial_stock: u64,
    // 0 / negatif = belum ada urutan, diperbaiki oleh catalog::normalize
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub datasheet_url: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "remote".to_string()
}

/// Sales channel (marketplace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    MarketA,
    MarketB,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::MarketA => "market_a",
            Channel::MarketB => "market_b",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market_a" | "marketa" | "a" => Some(Channel::MarketA),
            "market_b" | "marketb" | "b" => Some(Channel::MarketB),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card processor checkout.
    Card,
    /// Bank transfer.
    Wire,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Wire => "wire",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" | "stripe" => Some(PaymentMethod::Card),
            "wire" | "transfer" | "bank_transfer" => Some(PaymentMethod::Wire),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionInput {
    pub channel: Channel,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub transaction_value: f64,
    #[serde(default)]
    pub power_wp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionResult {
    pub commission_rate_display: String,
    pub commission_eur: f64,
    pub payment_fee: f64,
}

/// A recorded sale: sell-side commission next to the buy-side unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "ref")]
    pub reference: String,
    pub qty: u64,
    pub channel: Channel,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub transaction_value: f64,
    #[serde(default)]
    pub power_wp: Option<f64>,
    pub buy_price_unit: f64,
    pub catalog_match: bool,
    #[serde(flatten)]
    pub commission: CommissionResult,
    pub sold_at: String,
}

pub type StockMap = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub generated_at: String,
    pub sales: Vec<Sale>,
    pub catalog: Vec<CatalogProduct>,
    pub stock: StockMap,
}

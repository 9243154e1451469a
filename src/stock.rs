// ===============================
// src/stock.rs
// ===============================
use crate::catalog::normalize_ref;
use crate::domain::{CatalogProduct, Sale, StockMap};

/// Remaining stock per ref: catalog initial stock minus sold quantities.
/// Refs sold without a catalog entry show up negative.
pub fn derive(catalog: &[CatalogProduct], sales: &[Sale]) -> StockMap {
    let mut stock = StockMap::new();
    for p in catalog {
        stock.entry(normalize_ref(&p.reference)).or_insert(p.initial_stock as i64);
    }
    for s in sales {
        *stock.entry(normalize_ref(&s.reference)).or_insert(0) -= s.qty as i64;
    }
    stock
}

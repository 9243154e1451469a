// ===============================
// src/catalog.rs
// ===============================
//
// Catalog ingestion:
//   dokumen -> ParsedEntry[] + PricingSnapshot -> CatalogProduct[] (dedup by ref)
//
// Landed cost per unit (target currency):
//   unit_price_source * exchange_rate + transport_total / total_qty
// total_qty dihitung dari SEMUA entry (termasuk duplikat yang nanti dibuang).
//
use ahash::AHashSet as HashSet;
use tracing::{debug, info};

use crate::datasheet::get_datasheet_url;
use crate::domain::{CatalogProduct, Category};
use crate::metrics::{CATALOG_DUPLICATES, CATALOG_PRODUCTS};
use crate::snapshot::{extract_entries, extract_pricing, SnapshotLayout};

pub const REMOTE_SOURCE: &str = "remote";

// Urutan = prioritas; rule pertama yang cocok menang.
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["luna", "battery"], Category::Batteries),
    (&["panel", "pv module"], Category::SolarPanels),
    (&["sun2000"], Category::Inverters),
];

/// Infer a category from a product reference. Total: unmatched refs are Accessories.
pub fn classify(reference: &str) -> Category {
    let lower = reference.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, cat)| *cat)
        .unwrap_or(Category::Accessories)
}

/// Display form of a reference: trimmed, inner whitespace collapsed, case kept.
pub fn tidy_ref(reference: &str) -> String {
    reference.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key of a reference (dedup, stock, sales, datasheets): `tidy_ref` upper-cased.
pub fn normalize_ref(reference: &str) -> String {
    tidy_ref(reference).to_uppercase()
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn parse_catalog(raw: &str) -> Vec<CatalogProduct> {
    parse_catalog_with(raw, &SnapshotLayout::default())
}

pub fn parse_catalog_with(raw: &str, layout: &SnapshotLayout) -> Vec<CatalogProduct> {
    let entries = match extract_entries(raw, layout) {
        Some(e) => e,
        None => {
            info!(name = layout.seed_products, "seed block not found, empty catalog");
            return Vec::new();
        }
    };
    let pricing = extract_pricing(raw, layout);

    let total_qty = entries.iter().fold(0u64, |acc, e| acc.saturating_add(e.qty));
    let transport_total = pricing.transport_total();
    let transport_per_unit = if total_qty == 0 {
        0.0
    } else {
        transport_total / total_qty as f64
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for e in &entries {
        let reference = tidy_ref(&e.reference);
        if !seen.insert(normalize_ref(&reference)) {
            debug!(%reference, order = e.order, "duplicate ref dropped");
            CATALOG_DUPLICATES.inc();
            continue;
        }
        let landed = e.unit_price_source * pricing.exchange_rate + transport_per_unit;
        out.push(CatalogProduct {
            category: classify(&reference),
            buy_price_unit: round2(landed),
            initial_stock: e.qty,
            order: e.order,
            datasheet_url: get_datasheet_url(&reference, e.order),
            source: REMOTE_SOURCE.to_string(),
            reference,
        });
    }

    CATALOG_PRODUCTS.inc_by(out.len() as u64);
    info!(
        products = out.len(),
        entries = entries.len(),
        total_qty,
        transport_total,
        transport_per_unit,
        exchange_rate = pricing.exchange_rate,
        "catalog parsed"
    );
    out
}

/// Fix missing/non-positive `order` (1-based position) and re-resolve datasheet links.
/// A link that no longer resolves keeps its previous value.
pub fn normalize(catalog: Vec<CatalogProduct>) -> Vec<CatalogProduct> {
    catalog
        .into_iter()
        .enumerate()
        .map(|(i, mut p)| {
            if p.order <= 0 {
                p.order = i as i64 + 1;
            }
            if let Some(url) = get_datasheet_url(&p.reference, p.order) {
                p.datasheet_url = Some(url);
            }
            p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIXTURE: &str = r#"<!doctype html>
<html><head><title>Shipment</title></head><body>
<div id="app"></div>
<script>
  const localCharges = [
    { label: "DO fee", amountAED: 450, included: true },
    { label: "Terminal handling", amountAED: 620, included: true },
    { label: "Port storage", amountAED: 170, included: false },
    { label: "Token fee", amountAED: 180, included: true },
    { label: "Mersk charges", amountAED: 300, included: true },
    { label: "Inspection", amountAED: 250, included: true },
    { label: "Transport to WH", amountAED: 500, included: true },
    { label: "Offloading", amountAED: 200, included: true },
    { label: "Documentation", amountAED: 150, included: true },
    { label: "Misc", amountAED: 124, included: true },
  ];
  const shippingSeedProducts = [
    { order: 1, ref: "SUN2000-10K-LC0", qty: 496, unitPriceUSD: 694, weightKg: 14, note: "" },
  ];
  const exchangeRate = 0.8566;
  const freightQuoteEUR = 4511.58;
  const customsCostsEUR = 2614.00;
  const containerCount = 1;
  const aedPerUsd = 3.6725;
</script>
</body></html>"#;

    fn product(reference: &str, order: i64, url: Option<&str>) -> CatalogProduct {
        CatalogProduct {
            reference: reference.to_string(),
            buy_price_unit: 1.0,
            category: classify(reference),
            initial_stock: 1,
            order,
            datasheet_url: url.map(str::to_string),
            source: REMOTE_SOURCE.to_string(),
        }
    }

    #[test]
    fn fixture_yields_single_landed_product() {
        let catalog = parse_catalog(FIXTURE);
        assert_eq!(catalog.len(), 1);
        let p = &catalog[0];
        assert_eq!(p.reference, "SUN2000-10K-LC0");
        assert_eq!(p.buy_price_unit, 610.15);
        assert_eq!(p.order, 1);
        assert_eq!(p.initial_stock, 496);
        assert_eq!(p.category, Category::Inverters);
        assert_eq!(p.source, "remote");
        assert!(p.datasheet_url.is_some());
    }

    #[test]
    fn missing_seed_block_is_empty_catalog() {
        assert!(parse_catalog("<html><script>const exchangeRate = 0.9;</script></html>").is_empty());
        assert!(parse_catalog("").is_empty());
    }

    #[test]
    fn duplicates_keep_first_but_count_in_denominator() {
        let text = r#"
            shippingSeedProducts = [
              { order: 1, ref: "Widget", qty: 10, unitPriceUSD: 100 },
              { order: 2, ref: " widget ", qty: 30, unitPriceUSD: 999 },
              { order: 3, ref: "Other", qty: 60, unitPriceUSD: 50 },
            ];
            exchangeRate = 1; freightQuoteEUR = 1000; customsCostsEUR = 0;
        "#;
        let catalog = parse_catalog(text);
        assert_eq!(catalog.len(), 2);
        // 1000 / (10 + 30 + 60) = 10 per unit
        // teks ref pertama yang dipakai, bukan bentuk upper-case
        assert_eq!(catalog[0].reference, "Widget");
        assert_eq!(catalog[1].reference, "Other");
        assert_eq!(catalog[0].buy_price_unit, 110.0);
        assert_eq!(catalog[0].initial_stock, 10);
        assert_eq!(catalog[0].order, 1);
        assert_eq!(catalog[1].buy_price_unit, 60.0);
    }

    #[test]
    fn zero_quantity_batch_has_no_transport_share() {
        let text = "shippingSeedProducts = [{order: 1, ref: 'X', qty: 0, unitPriceUSD: 2.25}]; freightQuoteEUR = 500;";
        let catalog = parse_catalog(text);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].initial_stock, 0);
        assert_eq!(catalog[0].buy_price_unit, 2.25);
    }

    #[test]
    fn round2_follows_float_product_of_half_cent() {
        // 2.005 * 100 == 200.5 in f64, round() menjauhi nol -> 2.01
        assert_eq!(round2(2.005), 2.01);
        // 1.005 * 100 == 100.49999999999999 -> 1.0
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(610.1549), 610.15);
    }

    #[test]
    fn entry_with_expression_field_does_not_empty_catalog() {
        let text = r#"shippingSeedProducts = [
            { order: 1, ref: "SUN2000-10K-LC0", qty: 496, unitPriceUSD: 694 },
            { order: 2, ref: "LUNA2000-5-S0", qty: 4, unitPriceUSD: 900, weightKg: 14 * 2 },
          ];"#;
        let catalog = parse_catalog(text);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].reference, "LUNA2000-5-S0");
        assert_eq!(catalog[1].buy_price_unit, 900.0);
    }

    #[test]
    fn oversized_qty_rows_are_dropped_without_overflow() {
        let text = r#"shippingSeedProducts = [
            { order: 1, ref: "A", qty: 1e19, unitPriceUSD: 1 },
            { order: 2, ref: "B", qty: 1e19, unitPriceUSD: 1 },
            { order: 3, ref: "C", qty: 10, unitPriceUSD: 1 },
          ]; freightQuoteEUR = 100;"#;
        let catalog = parse_catalog(text);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].reference, "C");
        assert_eq!(catalog[0].buy_price_unit, 11.0);
    }

    #[test]
    fn container_count_scales_transport() {
        let text = "shippingSeedProducts = [{order: 1, ref: 'X', qty: 10, unitPriceUSD: 0}]; freightQuoteEUR = 100; containerCount = 3;";
        assert_eq!(parse_catalog(text)[0].buy_price_unit, 30.0);
    }

    #[test]
    fn classify_priority_order() {
        assert_eq!(classify("LUNA2000-5-S0"), Category::Batteries);
        assert_eq!(classify("Battery for SUN2000"), Category::Batteries);
        assert_eq!(classify("PV Module 450W"), Category::SolarPanels);
        assert_eq!(classify("Solar panel SUN2000 bracket"), Category::SolarPanels);
        assert_eq!(classify("Sun2000-ABC"), Category::Inverters);
        assert_eq!(classify("DTSU666-H"), Category::Accessories);
        assert_eq!(classify(""), Category::Accessories);
    }

    #[test]
    fn normalize_fills_order_and_keeps_existing_link() {
        let input = vec![
            product("Mounting rail", 0, Some("https://example.test/rail.pdf")),
            product("Cable gland", -4, None),
            product("SUN2000-10K-LC0", 9, None),
        ];
        let out = normalize(input);
        assert_eq!(out[0].order, 1);
        assert_eq!(out[0].datasheet_url.as_deref(), Some("https://example.test/rail.pdf"));
        assert_eq!(out[1].order, 2);
        assert_eq!(out[1].datasheet_url, None);
        assert_eq!(out[2].order, 9);
        assert!(out[2].datasheet_url.as_deref().unwrap().contains("LC0"));
    }

    #[test]
    fn normalize_does_not_drop_unresolvable_link() {
        let out = normalize(vec![product("Cable gland", 40, Some("https://example.test/g.pdf"))]);
        assert_eq!(out[0].datasheet_url.as_deref(), Some("https://example.test/g.pdf"));
    }

    fn arb_product() -> impl Strategy<Value = CatalogProduct> {
        (
            "[A-Za-z0-9 -]{0,16}",
            -3i64..50,
            proptest::option::of("https://[a-z]{1,8}\\.test/[a-z]{1,8}\\.pdf"),
        )
            .prop_map(|(r, order, url)| product(&r, order, url.as_deref()))
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(catalog in proptest::collection::vec(arb_product(), 0..20)) {
            let once = normalize(catalog);
            let twice = normalize(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn classify_ignores_case(s in "[A-Za-z0-9 -]{0,24}") {
            prop_assert_eq!(classify(&s), classify(&s.to_uppercase()));
            prop_assert_eq!(classify(&s), classify(&s.to_lowercase()));
        }

        #[test]
        fn dedup_keeps_first_occurrence(
            rows in proptest::collection::vec(("[a-c]{1,2}", 1u64..50, 1i64..100), 0..25)
        ) {
            let body: Vec<String> = rows
                .iter()
                .map(|(r, q, o)| format!("{{order: {o}, ref: '{r}', qty: {q}, unitPriceUSD: 1}}"))
                .collect();
            let text = format!("shippingSeedProducts = [{}];", body.join(","));
            let catalog = parse_catalog(&text);

            let mut distinct: Vec<String> = Vec::new();
            for (r, _, _) in &rows {
                let n = normalize_ref(r);
                if !distinct.contains(&n) {
                    distinct.push(n);
                }
            }
            prop_assert_eq!(catalog.len(), distinct.len());
            for p in &catalog {
                let first = rows.iter().find(|(r, _, _)| normalize_ref(r) == normalize_ref(&p.reference)).unwrap();
                prop_assert_eq!(&p.reference, &first.0);
                prop_assert_eq!(p.initial_stock, first.1);
                prop_assert_eq!(p.order, first.2);
            }
        }
    }
}

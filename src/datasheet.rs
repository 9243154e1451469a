// ===============================
// src/datasheet.rs
// ===============================
use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;

use crate::catalog::normalize_ref;

const BASE: &str = "https://solar.huawei.com/download?p=";

// ref (normalized) -> dokumen datasheet
static BY_REF: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("SUN2000-10K-LC0", "SUN2000-8-10K-LC0-Datasheet.pdf");
    m.insert("SUN2000-8K-LC0", "SUN2000-8-10K-LC0-Datasheet.pdf");
    m.insert("SUN2000-6KTL-L1", "SUN2000-2-6KTL-L1-Datasheet.pdf");
    m.insert("SUN2000-12K-MB0", "SUN2000-12-25K-MB0-Datasheet.pdf");
    m.insert("SUN2000-50KTL-M3", "SUN2000-50KTL-M3-Datasheet.pdf");
    m.insert("LUNA2000-5-S0", "LUNA2000-5-15-S0-Datasheet.pdf");
    m.insert("LUNA2000-7-S1", "LUNA2000-7-21-S1-Datasheet.pdf");
    m.insert("LUNA2000-215-2S10", "LUNA2000-215-2S10-Datasheet.pdf");
    m.insert("SMARTGUARD-63A-S0", "SmartGuard-63A-S0-Datasheet.pdf");
    m.insert("SUN2000-600W-P", "SUN2000-450-600W-P-Datasheet.pdf");
    m.insert("DTSU666-H", "DTSU666-H-Smart-Power-Sensor-Datasheet.pdf");
    m
});

/// Datasheet link for a catalog item; total, `None` for unknown items.
/// Links resolve by ref only; `order` never selects a document by itself.
pub fn get_datasheet_url(reference: &str, _order: i64) -> Option<String> {
    let key = normalize_ref(reference);
    BY_REF.get(key.as_str()).map(|doc| format!("{BASE}{doc}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_ref_case_insensitively() {
        let url = get_datasheet_url(" sun2000-10k-lc0 ", 99).unwrap();
        assert!(url.ends_with("SUN2000-8-10K-LC0-Datasheet.pdf"));
    }

    #[test]
    fn position_alone_resolves_nothing() {
        assert_eq!(get_datasheet_url("Mounting kit", 1), None);
        assert_eq!(get_datasheet_url("Mounting kit", 2), None);
        assert!(get_datasheet_url("LUNA2000-5-S0", 1).unwrap().contains("LUNA2000-5-15-S0"));
    }
}

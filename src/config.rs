// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : landed_margin — landed cost & marketplace commission engine in Rust
Module  : <module_name>.rs
Version : 0.1.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Scrapes the shipment snapshot page into a landed-cost catalog
          (FX chain + container cost amortization), resolves tiered
          marketplace commissions and payment fees, records sales, keeps a
          versioned JSON store with backup export, exposes Prometheus counters.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_CATALOG_URL: &str = "https://shipment-snapshot.pages.dev/index.html";

#[derive(Clone, Debug)]
pub struct Settings {
    pub catalog_url: Url,
    pub store_dir: PathBuf,
    pub log_level: String,
}

pub fn load() -> Settings {
    // Pastikan .env dibaca (agar CATALOG_URL, STORE_DIR, dll ter-load)
    let _ = dotenv();

    let catalog_url = env::var("CATALOG_URL")
        .ok()
        .and_then(|s| match Url::parse(s.trim()) {
            Ok(u) => Some(u),
            Err(e) => {
                eprintln!("CATALOG_URL invalid ({e}), using default");
                None
            }
        })
        .unwrap_or_else(default_catalog_url);

    let store_dir = env::var("STORE_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data"));

    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    Settings { catalog_url, store_dir, log_level }
}

fn default_catalog_url() -> Url {
    // konstanta valid; gagal parse = bug build
    Url::parse(DEFAULT_CATALOG_URL).expect("default catalog url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_parses() {
        assert_eq!(default_catalog_url().as_str(), DEFAULT_CATALOG_URL);
    }
}

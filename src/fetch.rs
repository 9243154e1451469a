// ===============================
// src/fetch.rs
// ===============================
//
// Satu kali GET ke halaman snapshot (no-cache), lalu parse_catalog.
// Tidak ada retry / backoff / timeout di sini: gagal sekali = gagal.
//
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::parse_catalog;
use crate::domain::CatalogProduct;
use crate::metrics::CATALOG_FETCHES;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog fetch failed with HTTP status {0}")]
    Status(u16),
    #[error("catalog fetch transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Retrieve the snapshot document body.
pub async fn fetch_document(http: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    info!(%url, "fetching remote catalog");
    let rsp = match http
        .get(url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(?e, %url, "catalog fetch transport error");
            CATALOG_FETCHES.with_label_values(&["transport_error"]).inc();
            return Err(FetchError::Transport(e));
        }
    };

    let code = rsp.status();
    if !code.is_success() {
        error!(%code, %url, "catalog fetch failed");
        CATALOG_FETCHES.with_label_values(&[code.as_str()]).inc();
        return Err(FetchError::Status(code.as_u16()));
    }
    CATALOG_FETCHES.with_label_values(&[code.as_str()]).inc();
    Ok(rsp.text().await?)
}

pub async fn fetch_remote_catalog(
    http: &reqwest::Client,
    url: &str,
) -> Result<Vec<CatalogProduct>, FetchError> {
    let body = fetch_document(http, url).await?;
    Ok(parse_catalog(&body))
}

// ===============================
// src/store.rs
// ===============================
//
// Key/value store berbasis file JSON di satu direktori:
// - tiap key berversi -> satu file (<key>.json)
// - save_catalog = REPLACE (bukan merge)
// - parent directory dibuat otomatis kalau belum ada
// - key yang belum ada dibaca sebagai default (list/map kosong)
//
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{error, info};

use crate::domain::{Backup, CatalogProduct, Sale, StockMap};
use crate::stock;

pub const CATALOG_KEY: &str = "catalog.v1";
pub const SALES_KEY: &str = "sales.v1";
pub const STOCK_KEY: &str = "stock.v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store json error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|source| {
                error!(?source, path = %parent.display(), "store: create_dir_all failed");
                StoreError::Io { path: parent.display().to_string(), source }
            })?;
        }
    }
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let shown = path.display().to_string();
    ensure_parent(path).await?;
    let body = serde_json::to_vec_pretty(value)
        .map_err(|source| StoreError::Json { path: shown.clone(), source })?;

    // tulis ke .tmp lalu rename
    let tmp = path.with_extension("json.tmp");
    let io = |source| StoreError::Io { path: shown.clone(), source };
    let mut f = fs::File::create(&tmp).await.map_err(io)?;
    f.write_all(&body).await.map_err(io)?;
    f.flush().await.map_err(io)?;
    drop(f);
    fs::rename(&tmp, path).await.map_err(io)?;
    Ok(())
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let path = self.path_for(key);
        let shown = path.display().to_string();
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json { path: shown, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(source) => Err(StoreError::Io { path: shown, source }),
        }
    }

    pub async fn load_catalog(&self) -> Result<Vec<CatalogProduct>, StoreError> {
        self.read(CATALOG_KEY).await
    }

    pub async fn load_sales(&self) -> Result<Vec<Sale>, StoreError> {
        self.read(SALES_KEY).await
    }

    pub async fn load_stock(&self) -> Result<StockMap, StoreError> {
        self.read(STOCK_KEY).await
    }

    /// Replace the stored catalog wholesale and re-derive the stock map.
    pub async fn save_catalog(&self, catalog: &[CatalogProduct]) -> Result<(), StoreError> {
        write_json(&self.path_for(CATALOG_KEY), &catalog).await?;
        let sales = self.load_sales().await?;
        write_json(&self.path_for(STOCK_KEY), &stock::derive(catalog, &sales)).await?;
        info!(products = catalog.len(), dir = %self.dir.display(), "store: catalog replaced");
        Ok(())
    }

    /// Append a sale and re-derive the stock map.
    pub async fn append_sale(&self, sale: Sale) -> Result<(), StoreError> {
        let mut sales = self.load_sales().await?;
        sales.push(sale);
        write_json(&self.path_for(SALES_KEY), &sales).await?;
        let catalog = self.load_catalog().await?;
        write_json(&self.path_for(STOCK_KEY), &stock::derive(&catalog, &sales)).await?;
        info!(sales = sales.len(), "store: sale appended");
        Ok(())
    }

    pub async fn backup(&self) -> Result<Backup, StoreError> {
        Ok(Backup {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            sales: self.load_sales().await?,
            catalog: self.load_catalog().await?,
            stock: self.load_stock().await?,
        })
    }

    pub async fn write_backup(&self, out: &Path) -> Result<Backup, StoreError> {
        let backup = self.backup().await?;
        write_json(out, &backup).await?;
        info!(path = %out.display(), "store: backup written");
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::REMOTE_SOURCE;
    use crate::commission::RateBook;
    use crate::domain::{Category, Channel, PaymentMethod};
    use crate::sale::{record_sale, SaleInput};

    fn product(reference: &str, stock: u64) -> CatalogProduct {
        CatalogProduct {
            reference: reference.to_string(),
            buy_price_unit: 12.5,
            category: Category::Accessories,
            initial_stock: stock,
            order: 1,
            datasheet_url: None,
            source: REMOTE_SOURCE.to_string(),
        }
    }

    #[tokio::test]
    async fn missing_keys_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested"));
        assert!(store.load_catalog().await.unwrap().is_empty());
        assert!(store.load_sales().await.unwrap().is_empty());
        assert!(store.load_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalog_save_replaces_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.save_catalog(&[product("A", 1), product("B", 2)]).await.unwrap();
        store.save_catalog(&[product("C", 3)]).await.unwrap();

        let catalog = store.load_catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].reference, "C");
        let stock = store.load_stock().await.unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock.get("C"), Some(&3));
    }

    #[tokio::test]
    async fn sales_update_stock_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let catalog = vec![product("RAIL", 10)];
        store.save_catalog(&catalog).await.unwrap();

        let input = SaleInput {
            reference: "rail".to_string(),
            qty: 4,
            channel: Channel::MarketA,
            category: None,
            payment_method: PaymentMethod::Wire,
            transaction_value: 500.0,
            power_wp: None,
        };
        let sale = record_sale(&RateBook::default(), input, &catalog).unwrap();
        store.append_sale(sale).await.unwrap();

        assert_eq!(store.load_stock().await.unwrap().get("RAIL"), Some(&6));

        let out = dir.path().join("exports/backup.json");
        let backup = store.write_backup(&out).await.unwrap();
        assert_eq!(backup.sales.len(), 1);
        assert_eq!(backup.catalog, catalog);

        let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        for key in ["generated_at", "sales", "catalog", "stock"] {
            assert!(raw.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("catalog.v1.json"), b"{not json").unwrap();
        let store = Store::new(dir.path());
        assert!(matches!(store.load_catalog().await, Err(StoreError::Json { .. })));
    }
}

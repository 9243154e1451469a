// ===============================
// src/main.rs
// ===============================
/*
 # ambil snapshot remote -> simpan katalog
 cargo run -- fetch

 # komisi satu transaksi
 cargo run -- commission --channel market_a --category inverters --payment card --value 1070

 # catat penjualan terhadap katalog tersimpan, lalu export backup
 cargo run -- sale --ref SUN2000-10K-LC0 --qty 2 --channel market_b --payment wire --value 2400
 cargo run -- backup --out ./data/backup.json
*/
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
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use landed_margin::{
    catalog, commission, config, fetch, metrics,
    commission::CommissionError,
    domain::{Category, Channel, PaymentMethod},
    sale::{self, SaleInput},
    store::Store,
};

#[derive(Parser, Debug)]
#[command(name = "landed_margin", version, about = "Landed cost catalog & marketplace commission tool")]
struct Cli {
    /// Dump Prometheus counters to stderr after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the remote snapshot page and replace the stored catalog
    Fetch {
        /// Override CATALOG_URL
        #[arg(long)]
        url: Option<String>,
        /// Print the catalog instead of storing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a saved snapshot document and print the catalog as JSON
    Parse {
        file: PathBuf,
    },
    /// Re-apply order / datasheet normalization to the stored catalog
    Normalize,
    /// Resolve commission + payment fee for one transaction
    Commission {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        payment: String,
        #[arg(long)]
        value: f64,
        #[arg(long)]
        power_wp: Option<f64>,
    },
    /// Record a sale against the stored catalog
    Sale {
        #[arg(long = "ref")]
        reference: String,
        #[arg(long, default_value_t = 1)]
        qty: u64,
        #[arg(long)]
        channel: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        payment: String,
        #[arg(long)]
        value: f64,
        #[arg(long)]
        power_wp: Option<f64>,
    },
    /// Write {generated_at, sales, catalog, stock} to a file
    Backup {
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = config::load();

    // ---- Logging ----
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_level))
        .with_writer(std::io::stderr)
        .init();

    // ---- Metrics ----
    metrics::init();

    info!(
        catalog_url = %settings.catalog_url,
        store_dir = %settings.store_dir.display(),
        "startup config"
    );
    let store = Store::new(settings.store_dir.clone());
    let book = commission::RateBook::default();

    match cli.cmd {
        Command::Fetch { url, dry_run } => {
            let url = url.unwrap_or_else(|| settings.catalog_url.to_string());
            let http = reqwest::Client::new();
            let products = catalog::normalize(fetch::fetch_remote_catalog(&http, &url).await?);
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                store.save_catalog(&products).await?;
                info!(products = products.len(), "catalog stored");
            }
        }
        Command::Parse { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let products = catalog::normalize(catalog::parse_catalog(&raw));
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        Command::Normalize => {
            let products = catalog::normalize(store.load_catalog().await?);
            store.save_catalog(&products).await?;
        }
        Command::Commission { channel, category, payment, value, power_wp } => {
            let input = commission::input_from_strs(&channel, &category, &payment, value, power_wp)?;
            let res = book.compute(&input)?;
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Command::Sale { reference, qty, channel, category, payment, value, power_wp } => {
            // category opsional: kalau kosong diambil dari katalog / classify(ref)
            let category = category
                .as_deref()
                .map(|c| Category::parse(c).ok_or_else(|| CommissionError::UnknownCategory(c.to_string())))
                .transpose()?;
            let input = SaleInput {
                reference,
                qty,
                channel: Channel::parse(&channel).ok_or(CommissionError::UnknownChannel(channel.clone()))?,
                category,
                payment_method: PaymentMethod::parse(&payment)
                    .ok_or(CommissionError::UnknownPaymentMethod(payment.clone()))?,
                transaction_value: value,
                power_wp,
            };
            let products = store.load_catalog().await?;
            let sale = sale::record_sale(&book, input, &products)?;
            println!("{}", serde_json::to_string_pretty(&sale)?);
            store.append_sale(sale).await?;
        }
        Command::Backup { out } => {
            let backup = store.write_backup(&out).await?;
            info!(
                sales = backup.sales.len(),
                products = backup.catalog.len(),
                "backup done"
            );
        }
    }

    if cli.metrics {
        eprint!("{}", String::from_utf8_lossy(&metrics::encode_metrics()));
    }
    Ok(())
}

//! Command execution: wire the service from configuration and run one
//! operation.
//!
//! Every command builds the service from the same config + store, so the
//! one-shot control commands and the long-running `run` daemon share state
//! through the JSON store.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::info;

use crate::adapter::{HttpSnapshotSource, JsonFileStore, WebhookNotifier};
use crate::config::Config;
use crate::domain::{Product, ProductId, StockMap};
use crate::monitor::MonitorService;
use crate::port::{LogNotifier, NotifierRegistry, NullStore, ProductStore};

use super::{output, AddArgs, Cli, Commands, IdArg, RunArgs, WatchArgs};

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run(&cli.config, args).await,
        Commands::Add(args) => add(&cli.config, args).await,
        Commands::Remove(args) => remove(&cli.config, args).await,
        Commands::List => list(&cli.config).await,
        Commands::Watch(args) => watch(&cli.config, args).await,
        Commands::Reset(args) => reset(&cli.config, args).await,
        Commands::Check(args) => check(&cli.config, args).await,
    }
}

fn build_service(config: &Config) -> Result<Arc<MonitorService>> {
    let source = Arc::new(HttpSnapshotSource::new(config.fetch_timeout())?);

    let store: Arc<dyn ProductStore> = match &config.store.path {
        Some(path) => Arc::new(JsonFileStore::new(path.clone())),
        None => Arc::new(NullStore),
    };

    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(LogNotifier));
    if let Some(url) = &config.webhook.url {
        notifiers.register(Box::new(WebhookNotifier::new(url.clone())));
        info!("Webhook notifier enabled");
    }

    Ok(MonitorService::new(
        source,
        store,
        Arc::new(notifiers),
        config.monitor_config(),
    ))
}

async fn run(config_path: &Path, args: RunArgs) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.format = "json".into();
    }
    config.init_logging();
    info!("restockd starting");

    let service = build_service(&config)?;
    let restored = service.load().await?;
    if restored > 0 {
        service.start();
    } else {
        info!("Registry is empty; add a product to begin monitoring");
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    service.stop();
    info!("restockd stopped");
    Ok(())
}

async fn add(config_path: &Path, args: AddArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let sizes: BTreeSet<String> = args.sizes.into_iter().collect();
    let product = service.add(&args.url, sizes).await?;
    service.stop();

    output::ok(&format!("Registered {} ({})", title_of(&product), product.id));
    if product.watched_sizes.is_empty() {
        output::note("Watching all sizes");
    } else {
        output::key_value("Watching", join(&product.watched_sizes));
    }
    print_stock(&product.previous_stock);
    Ok(())
}

async fn remove(config_path: &Path, args: IdArg) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let product = service.remove(&ProductId::from(args.id.as_str())).await?;
    output::ok(&format!("Removed {} ({})", title_of(&product), product.id));
    Ok(())
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "Watched")]
    watched: String,
    #[tabled(rename = "In stock")]
    in_stock: String,
    #[tabled(rename = "Notified")]
    notified: String,
    #[tabled(rename = "Last checked")]
    last_checked: String,
}

async fn list(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let products = service.list();
    if products.is_empty() {
        output::note("No products registered");
        return Ok(());
    }

    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| ProductRow {
            id: p.id.to_string(),
            title: title_of(p),
            brand: p.brand.clone(),
            watched: if p.watched_sizes.is_empty() {
                "all".into()
            } else {
                join(&p.watched_sizes)
            },
            in_stock: format!(
                "{}/{}",
                p.previous_stock.values().filter(|s| s.in_stock).count(),
                p.previous_stock.len()
            ),
            notified: join(&p.notified_sizes),
            last_checked: p
                .last_checked_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into()),
        })
        .collect();

    output::section("Products");
    println!("{}", Table::new(rows).with(Style::sharp()));
    output::key_value("Products", products.len());
    output::key_value(
        "Monitor",
        if service.is_running() { "running" } else { "stopped" },
    );
    Ok(())
}

async fn watch(config_path: &Path, args: WatchArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let id = ProductId::from(args.id.as_str());
    let sizes: BTreeSet<String> = args.sizes.into_iter().collect();
    let all = sizes.is_empty();
    service.set_watched_sizes(&id, sizes).await?;

    if all {
        output::ok(&format!("Product {id} now watches all sizes"));
    } else {
        output::ok(&format!("Watch set updated for product {id}"));
    }
    Ok(())
}

async fn reset(config_path: &Path, args: IdArg) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let id = ProductId::from(args.id.as_str());
    service.reset_notifications(&id).await?;
    output::ok(&format!("Notified flags cleared for product {id}"));
    Ok(())
}

async fn check(config_path: &Path, args: IdArg) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = build_service(&config)?;
    service.load().await?;

    let id = ProductId::from(args.id.as_str());
    let result = service.force_check(&id).await?;

    if result.success {
        output::ok(&format!("Check succeeded for product {id}"));
        if let Some(sizes) = &result.sizes {
            print_stock(sizes);
        }
    } else {
        output::error(&format!(
            "Check failed for product {id}: {}",
            result.error.as_deref().unwrap_or("unknown error")
        ));
    }
    Ok(())
}

#[derive(Tabled)]
struct SizeRow {
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Label")]
    label: String,
}

fn print_stock(stock: &StockMap) {
    if stock.is_empty() {
        output::note("No variant data available");
        return;
    }

    let mut rows: Vec<SizeRow> = stock
        .iter()
        .map(|(size, entry)| SizeRow {
            size: size.clone(),
            status: if entry.in_stock {
                "in stock".into()
            } else {
                "out of stock".into()
            },
            label: entry.stock_label.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.size.cmp(&b.size));

    println!("{}", Table::new(rows).with(Style::sharp()));
}

fn title_of(product: &Product) -> String {
    if product.title.is_empty() {
        format!("product {}", product.id)
    } else {
        product.title.clone()
    }
}

fn join(sizes: &BTreeSet<String>) -> String {
    sizes.iter().cloned().collect::<Vec<_>>().join(", ")
}

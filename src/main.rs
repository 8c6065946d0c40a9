//! garden-tracker - personal garden tracking API

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use garden_tracker::{
    calendar::CalendarDataset,
    config::Args,
    db::{MongoClient, MongoPortfolioStore},
    logging,
    portfolio::{MemoryStore, Portfolio, PortfolioStore},
    server::{self, AppState},
    zone::{ZoneLookup, ZoneResolver},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init_tracing(&args.log_level, args.log_json)?;

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Garden Tracker API");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Calendar: {}", args.calendar_path.display());
    info!("Zone lookup: {}", args.zone_lookup_url);
    info!("======================================");

    let calendar = Arc::new(CalendarDataset::load(&args.calendar_path)?);

    let store: Arc<dyn PortfolioStore> = match connect_store(&args).await {
        Ok(store) => Arc::new(store),
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable (dev mode, using in-memory store): {}", e);
            Arc::new(MemoryStore::new())
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let portfolio = Portfolio::new(store, calendar);
    match portfolio.sync_catalog_from_calendar().await {
        Ok(0) => {}
        Ok(created) => info!(created, "Catalog entries added from planting calendar"),
        Err(e) => warn!("Catalog sync failed, continuing: {}", e),
    }

    let zones: Arc<dyn ZoneLookup> = Arc::new(ZoneResolver::with_config(args.zone_resolver_config()));
    let state = Arc::new(AppState::new(args, portfolio, zones)?);

    server::run(state).await?;
    Ok(())
}

async fn connect_store(args: &Args) -> garden_tracker::Result<MongoPortfolioStore> {
    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    MongoPortfolioStore::new(&client).await
}

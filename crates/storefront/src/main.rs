//! Storefront cart - command-line front end.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog with in-cart quantities
//! cart products
//!
//! # Show the cart with subtotals
//! cart show
//!
//! # Change the cart
//! cart add 3
//! cart update 3 2
//! cart remove 3
//! ```
//!
//! Configuration comes from the environment (see [`cart_storefront::config`]).
//! Notifications raised by an operation are printed after it completes; the
//! process exits non-zero if any of them reports a failure.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use cart_core::{CurrencyCode, Price, Product, ProductId};
use cart_storefront::config::CartConfig;
use cart_storefront::error::{AppError, Result};
use cart_storefront::view::ProductCard;
use cart_storefront::{
    CartController, CatalogClient, CatalogView, FileStore, Notification, UpdateAmount,
};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Storefront cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog with how many of each product are in the cart
    Products,
    /// Show the cart with subtotals and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (needed for Sentry init)
    let config = CartConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so command output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cart_storefront=warn,cart=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: CartConfig) -> Result<ExitCode> {
    let catalog = CatalogClient::new(&config.catalog)?;
    let store = Arc::new(FileStore::new(&config.store_path));
    let (tx, mut notifications) = mpsc::unbounded_channel::<Notification>();
    let cart = CartController::open(catalog, store, Arc::new(tx), config.store_key.clone())?;

    match cli.command {
        Commands::Products => {
            let view = CatalogView::load(cart.clone(), config.currency).await?;
            write_cards(&view.cards())?;
        }
        Commands::Show => write_cart(&cart.cart(), cart.total_price(), config.currency)?,
        Commands::Add { id } => cart.add_product(id).await,
        Commands::Remove { id } => cart.remove_product(id),
        Commands::Update { id, amount } => {
            cart.update_product_amount(UpdateAmount {
                product_id: id,
                amount,
            })
            .await;
        }
    }

    let mut failed = false;
    let mut out = std::io::stdout().lock();
    while let Ok(notification) = notifications.try_recv() {
        failed |= notification.is_error();
        writeln!(out, "{notification}")?;
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn write_cards(cards: &[ProductCard]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for card in cards {
        writeln!(
            out,
            "{:>5}  {:<40} {:>14}  in cart: {}",
            card.listing.id.as_i32(), card.listing.title, card.listing.formatted_price, card.in_cart
        )?;
    }
    Ok(())
}

fn write_cart(items: &[Product], total: Price, currency: CurrencyCode) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if items.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for item in items {
        writeln!(
            out,
            "{:>5}  {:<40} {:>4} x {:>12} = {:>14}",
            item.id.as_i32(),
            item.title,
            item.amount,
            item.price.format(currency),
            item.subtotal().format(currency)
        )?;
    }
    writeln!(out, "{:>81}", format!("Total: {}", total.format(currency)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["cart", "update", "3", "-1"]).map_err(|e| e.to_string());
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { id, amount: -1 }) if id == ProductId::new(3)
        ));
    }
}

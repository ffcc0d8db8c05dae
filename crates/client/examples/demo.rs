//! End-to-end walkthrough against live services.
//!
//! Requires `TANGELO_API_BASE_URL` (see `config` module docs for the full
//! variable list) and valid account credentials in `DEMO_EMAIL` and
//! `DEMO_PASSWORD`. Browses the catalog, adds an item to the cart, and
//! prints the resulting cart and order buckets.
//!
//! ```sh
//! TANGELO_API_BASE_URL=https://shop.example.com/api \
//! DEMO_EMAIL=you@example.com DEMO_PASSWORD=secret \
//! cargo run -p tangelo-client --example demo
//! ```

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tangelo_client::cache::FileCartCache;
use tangelo_client::catalog::CatalogClient;
use tangelo_client::config::ClientConfig;
use tangelo_client::remote::HttpOrderService;
use tangelo_client::sync::SyncCoordinator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let service = HttpOrderService::new(&config)?;
    let catalog = CatalogClient::new(&config)?;
    let cache = FileCartCache::new(&config.cache_dir);

    let email = std::env::var("DEMO_EMAIL")?;
    let password = std::env::var("DEMO_PASSWORD")?;
    let session = service.sign_in(&email, &password).await?;
    info!(name = %session.profile.name, "signed in");

    let engine = SyncCoordinator::new(service, cache);
    engine.start_session(session).await;

    let categories = catalog.categories().await?;
    info!(?categories, "catalog categories");

    if let Some(category) = categories.first() {
        let products = catalog.products_in_category(category).await?;
        if let Some(product) = products.first() {
            info!(title = %product.title, price = %product.price, "adding first product");
            engine.add_item(product.clone().into_cart_item(), 1).await?;
        }
    }

    let cart = engine.cart().await;
    info!(
        lines = cart.items.len(),
        units = cart.item_count,
        subtotal = %cart.subtotal,
        "cart after add"
    );

    let buckets = engine.orders().await;
    info!(
        pending = buckets.pending.len(),
        awaiting_delivery = buckets.awaiting_delivery.len(),
        completed = buckets.completed.len(),
        "order buckets"
    );

    Ok(())
}

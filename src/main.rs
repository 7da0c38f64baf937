use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payments_api::application::engine::PaymentEngine;
use payments_api::domain::ports::PaymentStoreBox;
use payments_api::infrastructure::in_memory::InMemoryPaymentStore;
use payments_api::infrastructure::notifier::HttpNotifier;
use payments_api::interfaces::http;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Base URL of the creation notification service
    #[arg(long, default_value = "https://api.notification-service.com/payments")]
    notification_url: String,

    /// Timeout for notification requests, in seconds
    #[arg(long, default_value_t = 5)]
    notification_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store: PaymentStoreBox = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => {
            use payments_api::infrastructure::rocksdb::RocksDbPaymentStore;
            Box::new(RocksDbPaymentStore::open(db_path).into_diagnostic()?)
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "this build has no persistent storage support; rebuild with --features storage-rocksdb"
            ));
        }
        None => Box::new(InMemoryPaymentStore::new()),
    };

    let notifier = HttpNotifier::new(
        cli.notification_url,
        Duration::from_secs(cli.notification_timeout),
    )
    .into_diagnostic()?;

    let engine = Arc::new(PaymentEngine::new(store, Box::new(notifier)));
    let app = http::router(engine);

    let listener = TcpListener::bind(cli.bind).await.into_diagnostic()?;
    info!("listening on {}", cli.bind);
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}

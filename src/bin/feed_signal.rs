use dotenvy::dotenv;
use std::env;

use discovery_feed::config::FeedConfig;
use discovery_feed::database;
use discovery_feed::services::signal_service::{self, FeedSignal};

/// Leaves a signal for the feed, the way another screen would.
#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let Some(signal) = env::args().nth(1).as_deref().and_then(FeedSignal::parse) else {
        eprintln!("usage: feed-signal <reload|remove-top>");
        std::process::exit(2);
    };

    let config = FeedConfig::from_env();
    let pool = database::open_pool(&config.database_url)
        .await
        .expect("cannot open feed storage");

    match signal_service::publish(&pool, signal).await {
        Ok(()) => println!("signal set: {:?}", signal),
        Err(e) => {
            eprintln!("setting signal failed: {}", e);
            std::process::exit(1);
        }
    }
}

use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use discovery_feed::config::FeedConfig;
use discovery_feed::database;
use discovery_feed::services::feed_controller::{MatchingFeedController, QueueState};
use discovery_feed::services::location_service::{LocationResolver, StaticDeviceLocation};
use discovery_feed::services::matching_api_service::HttpMatchingApi;
use discovery_feed::services::notification_service::LogNotifier;

const HELP: &str = "commands: show | focus | refresh | like <id> [message] | skip <id> | quit";

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Open the durable store
    let config = FeedConfig::from_env();
    let pool = database::open_pool(&config.database_url)
        .await
        .expect("cannot open feed storage");

    // 3. Wire the controller
    let api = HttpMatchingApi::new(&config.api_base_url, config.api_token.clone())
        .expect("MATCHING_API_URL is not a valid base url");
    let resolver = LocationResolver::new(
        Arc::new(StaticDeviceLocation::new(config.device.clone())),
        config.gps_timeout_short,
    );
    let controller =
        MatchingFeedController::new(pool, Arc::new(api), resolver, Arc::new(LogNotifier));

    // 4. Mount and hand control to stdin
    println!("{:?}", controller.mount().await);
    print_state(&controller.snapshot());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.trim().splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("show"), _, _) => {}
            (Some("focus"), _, _) => println!("{:?}", controller.refresh_on_focus().await),
            (Some("refresh"), _, _) => println!("{:?}", controller.refresh().await),
            (Some("like"), Some(id), message) => {
                println!("{:?}", controller.like(id, message).await)
            }
            (Some("skip"), Some(id), _) => println!("{:?}", controller.skip(id).await),
            (Some("quit"), _, _) => break,
            _ => {
                println!("{}", HELP);
                continue;
            }
        }
        print_state(&controller.snapshot());
    }
}

fn print_state(state: &QueueState) {
    if state.shows_empty_state() {
        println!("(no candidates: {:?})", state.empty_reason);
        return;
    }
    for (pos, candidate) in state.items.iter().enumerate() {
        println!(
            "{}{} {} {} {}",
            if pos == 0 { "> " } else { "  " },
            candidate.id,
            candidate.first_name.as_deref().unwrap_or("?"),
            candidate
                .age
                .map(|a| a.to_string())
                .unwrap_or_default(),
            candidate
                .distance_to_user
                .map(|d| format!("{:.1}", d))
                .unwrap_or_default(),
        );
    }
}

mod api;
mod compose;
mod config;
mod handlers;
mod models;
mod notify;
mod search;
mod vote;

use std::sync::Arc;

use api::{ApiClient, TreeHoleApi};
use handlers::App;
use log::{debug, error, info, warn};
use notify::{ConsoleNotifier, Notifier};
use search::{SearchBox, SearchUpdate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use vote::VoteBoard;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = config::Config::from_env();
    info!("tree hole client talking to {}", config.base_url);
    if config.credentials.is_none() {
        warn!("no session credentials configured; votes and flags will prompt for login");
    }

    let api: Arc<dyn TreeHoleApi> =
        Arc::new(ApiClient::new(&config.base_url, config.credentials));
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let (updates_tx, mut search_updates) = mpsc::unbounded_channel();
    let search = SearchBox::new(Arc::clone(&api), updates_tx);

    let mut app = App {
        board: VoteBoard::new(),
        api,
        notifier,
        search,
        tags_input: String::new(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match handlers::parse_event(&line) {
                            Some(event) => {
                                if !handlers::handle_event(&mut app, event).await {
                                    break;
                                }
                            }
                            None => warn!("unrecognized command: {}", line.trim()),
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        error!("failed to read input: {}", err);
                        break;
                    }
                }
            }
            Some(update) = search_updates.recv() => {
                match update {
                    SearchUpdate::Suggestions { query, suggestions } => {
                        if suggestions.is_empty() {
                            debug!("no suggestions for '{}'", query);
                        } else {
                            println!("{}", handlers::format_suggestions(&suggestions));
                        }
                    }
                    SearchUpdate::Cleared => {}
                }
            }
        }
    }

    info!("shutting down");
}

use std::env;

use anyhow::{bail, Context};
use sga_client::services::match_service::{load_match, load_ongoing};
use sga_client::{ClientConfig, SgaClient};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = ClientConfig::from_env().context("Failed to load client configuration")?;
    let client = SgaClient::http(config)?;

    if let (Ok(username), Ok(password)) = (env::var("SGA_USERNAME"), env::var("SGA_PASSWORD")) {
        client.authenticate(&username, &password).await?;
    }

    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["server"] => {
            client.server_info().await?;
        }
        ["match", id] => {
            let handle = load_match(&client, id).await?;
            if client.is_authenticated() {
                let summary = handle.get_score().await?;
                info!(
                    "Local score {} / opponent {} (opponent found: {})",
                    summary.local_score, summary.opponent_score, summary.opponent_found
                );
            }
            print_match(&handle.snapshot());
        }
        ["ongoing"] => {
            for handle in load_ongoing(&client, None, None).await? {
                print_match(&handle.snapshot());
            }
        }
        other => bail!("unknown command {:?}; expected server, match <id> or ongoing", other),
    }
    Ok(())
}

fn print_match(game: &sga_client::Match) {
    println!(
        "{} '{}' round {}/{} players {} finished {}",
        game.id,
        game.title,
        game.current_round,
        game.rounds_count,
        game.users().len(),
        game.is_finished()
    );
}

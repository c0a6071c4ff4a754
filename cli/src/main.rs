//! Muted chat CLI client - line-mode chat against the reference server

mod client;
mod input;
mod messages;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "muted-chat-cli")]
#[command(about = "Line-mode client for the muted chat reference server")]
#[command(version)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "MUTED_CHAT_SERVER", default_value = "ws://localhost:5154/ws")]
    server: String,

    /// Your callsign
    #[arg(short, long)]
    callsign: String,

    /// Team to join (server default when omitted)
    #[arg(short, long)]
    team: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muted_chat_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let mut client = client::ChatClient::connect(&cli.server).await?;
    let player_id = client.join(&cli.callsign, cli.team).await?;
    tracing::info!("Playing in slot #{}", player_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    client.leave().await?;
                    break;
                };
                match input::parse_line(&line) {
                    Ok(Some(msg)) => client.send(msg).await?,
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e),
                }
            }
            msg = client.recv() => {
                match msg {
                    Some(msg) => println!("{}", msg),
                    None => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

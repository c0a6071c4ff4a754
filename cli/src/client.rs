//! WebSocket client for the muted chat server

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::messages::{ClientMessage, PlayerId, ServerMessage};

/// WebSocket client for the muted chat server
pub struct ChatClient {
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<ServerMessage>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl ChatClient {
    /// Connect to a muted chat server
    pub async fn connect(url: &str) -> Result<Self> {
        let url = url::Url::parse(url)?;
        tracing::info!("Connecting to {}", url);

        let (ws_stream, _) = connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        // Channel for outgoing messages
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(32);

        // Channel for incoming parsed messages
        let (in_tx, in_rx) = mpsc::channel::<ServerMessage>(32);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(msg) = out_rx.recv() => {
                        if write.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Some(result) = read.next() => {
                        match result {
                            Ok(Message::Text(text)) => {
                                match serde_json::from_str::<ServerMessage>(&text) {
                                    Ok(msg) => {
                                        if in_tx.send(msg).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Failed to parse message: {} - {}", e, text);
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Err(e) => {
                                tracing::error!("WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    else => break,
                }
            }
        });

        tracing::info!("Connected successfully");

        Ok(Self {
            tx: out_tx,
            rx: in_rx,
            handle,
        })
    }

    /// Send a message to the server
    pub async fn send(&self, msg: ClientMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;
        self.tx
            .send(Message::Text(json))
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))
    }

    /// Receive a message from the server
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    /// Take a slot, printing anything that arrives before the confirmation
    pub async fn join(&mut self, callsign: &str, team: Option<String>) -> Result<PlayerId> {
        self.send(ClientMessage::Join {
            callsign: callsign.to_string(),
            team,
        })
        .await?;

        while let Some(msg) = self.recv().await {
            match msg {
                ServerMessage::Joined { player_id, .. } => {
                    println!("{}", msg);
                    return Ok(player_id);
                }
                ServerMessage::Error { message } => {
                    return Err(anyhow!("Server error: {}", message));
                }
                other => println!("{}", other),
            }
        }

        Err(anyhow!("Connection closed"))
    }

    pub async fn leave(&self) -> Result<()> {
        self.send(ClientMessage::Leave).await
    }
}

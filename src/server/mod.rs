// WebSocket shell: accepts connections and wires each to a settings channel

use crate::sync::{ChannelMode, Controller, SettingsChannel};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Accept connections forever, one task per connection.
pub async fn serve(
    listener: TcpListener,
    controller: Arc<Controller>,
    mode: ChannelMode,
) -> Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, controller, mode).await {
                log::warn!("Connection {addr} ended with error: {e}");
            }
        });
    }
}

/// Drive one connection: a writer task drains the channel's outbound
/// queue into the socket, the read loop feeds text frames to the channel.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    controller: Arc<Controller>,
    mode: ChannelMode,
) -> Result<()> {
    log::info!("New connection from {addr}");
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame)).await.is_err() {
                // Socket is gone; queued updates surface as delivery
                // errors on the channel side
                break;
            }
        }
    });

    let channel = SettingsChannel::new(mode, controller, tx);
    channel.open();

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                // One bad payload must not terminate the connection
                if let Err(e) = channel.handle_frame(&text) {
                    log::warn!("Dropping frame from {addr}: {e}");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    channel.close();
    log::info!("Connection {addr} closed");
    Ok(())
}

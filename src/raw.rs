//! Plain websocket exchange, without socket.io framing.

use crate::error::Error;
use async_tungstenite::async_std::connect_async;
use async_tungstenite::tungstenite::Message;
use futures::stream::StreamExt;
use log::{debug, info};

/// Sends `message` as one text frame and returns the first text frame
/// that comes back. A peer that closes first yields [`Error::Closed`].
pub async fn exchange(url: &str, message: &str) -> Result<String, Error> {
    info!("Establishing connection to {}", url);
    let (mut stream, _) = connect_async(url).await?;

    stream.send(Message::text(message)).await?;
    info!("Sent: {}", message);

    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(reply) => {
                if let Err(err) = stream.send(Message::Close(None)).await {
                    debug!("Close after reply failed: {}", err);
                }
                return Ok(reply.to_string());
            }
            Message::Close(frame) => {
                debug!("Peer closed with {:?}", frame);
                break;
            }
            other => debug!("Skipping {:?}", other),
        }
    }
    Err(Error::Closed)
}

//! Echo peer used as the load target
//!
//! Upgrades every accepted TCP connection to WebSocket (on any path) and
//! mirrors each text or binary frame back with the same opcode and payload.

use crate::error::{AppError, Result};
use crate::log_debug;
use crate::logging::Logger;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// WebSocket echo server
pub struct EchoServer {
    listener: TcpListener,
    logger: Logger,
}

impl EchoServer {
    /// Bind the listening socket
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::network(format!("failed to bind echo listener: {}", e)))?;

        Ok(Self {
            listener,
            logger: Logger::new("ECHO".to_string()),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection
    pub async fn run(self) -> Result<()> {
        self.logger
            .info(&format!("listening on {}", self.local_addr()?))
            .log();

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    self.logger.warn(&format!("accept: {}", e)).log();
                    continue;
                }
            };

            let logger = self.logger.clone();
            tokio::spawn(async move {
                serve_connection(stream, peer, logger).await;
            });
        }
    }
}

/// Echo frames on one connection until the peer closes or the stream fails
pub async fn serve_connection(stream: TcpStream, peer: SocketAddr, logger: Logger) {
    let mut socket = match accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            logger.warn(&format!("upgrade: {}", e)).field("peer", peer.to_string()).log();
            return;
        }
    };
    logger.info(&format!("client: {}", peer)).log();

    while let Some(message) = socket.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                log_debug!(logger, "read: {}", e);
                break;
            }
        };

        let reply = match message {
            Message::Text(text) => {
                log_debug!(logger, "recv: [TextMessage] {}", text.as_str());
                Message::Text(text)
            }
            Message::Binary(data) => {
                log_debug!(logger, "recv: [BinaryMessage] {} bytes", data.len());
                Message::Binary(data)
            }
            Message::Close(_) => break,
            // Pings are answered by the protocol layer
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        if let Err(e) = socket.send(reply).await {
            log_debug!(logger, "write: {}", e);
            break;
        }
    }
}

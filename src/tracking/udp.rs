//! JSON-over-UDP tracking provider
//!
//! Receives one `TrackingBatch` JSON object per datagram from an external
//! tracker process. Malformed datagrams are logged and skipped.

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use crate::config::UdpConfig;
use crate::error::ProviderError;

use super::provider::{BatchSink, ListenerSlot, TrackingProvider};
use super::TrackingBatch;

const MAX_DATAGRAM: usize = 65536;

/// UDP receiver forwarding parsed batches to the attached listener
#[derive(Debug)]
pub struct UdpProvider {
    socket: UdpSocket,
    slot: ListenerSlot,
}

impl UdpProvider {
    /// Bind the receive socket
    pub async fn bind(config: &UdpConfig) -> Result<Self, ProviderError> {
        let addr = format!("{}:{}", config.listen_address, config.port);

        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|e| ProviderError::UdpBind(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!("UDP tracking provider listening on {}", addr);
        Ok(Self {
            socket,
            slot: ListenerSlot::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ProviderError> {
        self.socket
            .local_addr()
            .map_err(|e| ProviderError::UdpBind(e.to_string()))
    }

    /// Receive datagrams until shutdown is signalled
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), ProviderError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    let (size, peer) = result
                        .map_err(|e| ProviderError::UdpReceive(e.to_string()))?;
                    if let Some(batch) = parse_datagram(&buf[..size], peer) {
                        self.slot.publish(batch);
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("UDP tracking provider shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

fn parse_datagram(data: &[u8], peer: SocketAddr) -> Option<TrackingBatch> {
    if data.is_empty() {
        return None;
    }

    match serde_json::from_slice::<TrackingBatch>(data) {
        Ok(batch) => Some(batch),
        Err(e) => {
            tracing::warn!("Skipping malformed batch from {}: {}", peer, e);
            None
        }
    }
}

impl TrackingProvider for UdpProvider {
    fn attach(&self, sink: BatchSink) -> Result<(), ProviderError> {
        self.slot.attach(sink)
    }

    fn detach(&self, sink: &BatchSink) -> bool {
        self.slot.detach(sink)
    }

    fn is_attached(&self) -> bool {
        self.slot.is_attached()
    }
}

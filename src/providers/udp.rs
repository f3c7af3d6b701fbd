//! UDP datagram provider

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

use crate::codec::{self, MAX_DATAGRAM_SIZE};
use crate::config::IngestConfig;
use crate::ingestor::IngestCounters;
use crate::provider::PoseProvider;
use crate::types::Snapshot;
use crate::{PoseError, Result};

/// Provider that receives encoded snapshots on a bound UDP socket
pub struct UdpProvider {
    /// Bound socket; dropping the provider closes it
    socket: UdpSocket,

    /// Reusable receive buffer
    buffer: Vec<u8>,

    /// Counters shared with the owning ingestor
    counters: Arc<IngestCounters>,
}

impl UdpProvider {
    /// Bind a socket according to `config`.
    pub async fn bind(config: &IngestConfig, counters: Arc<IngestCounters>) -> Result<Self> {
        let addr = SocketAddr::new(config.bind_address, config.port);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| PoseError::Bind { port: config.port, source })?;

        info!(local_addr = ?socket.local_addr().ok(), "Bound pose receiver socket");

        let capacity = config.receive_buffer.clamp(codec::encoded_len(0), MAX_DATAGRAM_SIZE);
        Ok(Self { socket, buffer: vec![0u8; capacity], counters })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|source| PoseError::Receive { source })
    }
}

#[async_trait::async_trait]
impl PoseProvider for UdpProvider {
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        loop {
            let (len, peer) = self
                .socket
                .recv_from(&mut self.buffer)
                .await
                .map_err(|source| PoseError::Receive { source })?;
            self.counters.record_datagram();

            match codec::decode(&self.buffer[..len]) {
                Ok(snapshot) => {
                    trace!(%peer, bytes = len, joints = snapshot.len(), "Decoded snapshot");
                    return Ok(Some(snapshot));
                }
                Err(e) => {
                    let malformed = self.counters.record_malformed();
                    if malformed == 1 || malformed % 100 == 0 {
                        warn!(%peer, bytes = len, malformed, "Dropping malformed pose packet: {}", e);
                    } else {
                        debug!(%peer, bytes = len, "Dropping malformed pose packet: {}", e);
                    }
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self.socket.local_addr() {
            Ok(addr) => format!("udp://{}", addr),
            Err(_) => "udp://<unbound>".to_string(),
        }
    }
}

//! Transmitting endpoint
//!
//! A [`PoseSender`] captures the skeleton in joint-ordinal order and sends it
//! as one datagram. Delivery is fire-and-forget.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::codec;
use crate::skeleton::Skeleton;
use crate::types::Snapshot;
use crate::{PoseError, Result};

/// Sends encoded snapshots to one receiver
#[derive(Debug)]
pub struct PoseSender {
    socket: UdpSocket,
    target: SocketAddr,
    buffer: Vec<u8>,
    sent: u64,
}

impl PoseSender {
    /// Bind an ephemeral local port of the target's address family.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        let local = match target {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local).await.map_err(|source| PoseError::Bind { port: 0, source })?;
        debug!(%target, local_addr = ?socket.local_addr().ok(), "Pose sender ready");

        Ok(Self { socket, target, buffer: Vec::with_capacity(codec::encoded_len(crate::JOINT_COUNT)), sent: 0 })
    }

    /// Encode and send one snapshot. Returns the datagram size.
    pub async fn send(&mut self, snapshot: &Snapshot) -> Result<usize> {
        codec::encode_into(snapshot, &mut self.buffer);
        let bytes = self
            .socket
            .send_to(&self.buffer, self.target)
            .await
            .map_err(|source| PoseError::Send { target: self.target, source })?;

        self.sent += 1;
        trace!(target = %self.target, bytes, sent = self.sent, "Sent snapshot");
        Ok(bytes)
    }

    /// Capture `skeleton` and send it.
    pub async fn send_skeleton<S: Skeleton + ?Sized>(&mut self, skeleton: &S) -> Result<usize> {
        let snapshot = Snapshot::capture(skeleton);
        self.send(&snapshot).await
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Datagrams sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

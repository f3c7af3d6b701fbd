//! Background network ingestion
//!
//! An [`Ingestor`] owns one background task that pulls snapshots from a
//! [`PoseProvider`] and publishes them into a single-slot [`Mailbox`]. The
//! tick loop drains the mailbox without blocking.
//!
//! ```text
//!  ┌──────────────┐   recv + decode   ┌────────────┐  publish  ┌─────────┐  drain  ┌───────────┐
//!  │ UDP datagram │ ────────────────► │ UdpProvider│ ────────► │ Mailbox │ ──────► │ tick loop │
//!  └──────────────┘    (bg task)      └────────────┘ (latest)  └─────────┘ (≤1/tick)└───────────┘
//! ```
//!
//! Shutdown is cooperative: [`Ingestor::stop`] cancels the task, which drops
//! the pending receive and the socket at an await point, then waits for the
//! task to finish.

use futures::{Stream, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::IngestConfig;
use crate::mailbox::{Mailbox, MailboxPublisher, mailbox};
use crate::provider::PoseProvider;
use crate::providers::UdpProvider;
use crate::stream::ThrottleExt;
use crate::Result;
use crate::types::{Snapshot, UpdateRate};

/// Consecutive provider errors after which they are logged at `error` level
const ESCALATE_AFTER_ERRORS: u32 = 10;

/// Longest pause between retries after repeated errors
const MAX_BACKOFF: Duration = Duration::from_millis(1600);

/// Counters updated by the receive task
#[derive(Debug, Default)]
pub struct IngestCounters {
    datagrams_received: AtomicU64,
    snapshots_published: AtomicU64,
    malformed_packets: AtomicU64,
    receive_errors: AtomicU64,
}

impl IngestCounters {
    pub(crate) fn record_datagram(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the malformed count including this one.
    pub(crate) fn record_malformed(&self) -> u64 {
        self.malformed_packets.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn record_published(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> IngestStats {
        IngestStats {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            malformed_packets: self.malformed_packets.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
        }
    }
}

/// Ingestion statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub datagrams_received: u64,
    pub snapshots_published: u64,
    pub malformed_packets: u64,
    pub receive_errors: u64,
}

/// Handle to a running ingestion task
pub struct Ingestor {
    /// Latest-snapshot slot drained by the tick loop
    mailbox: Mailbox,

    /// Shared receive counters
    counters: Arc<IngestCounters>,

    /// Bound address, when the provider is a socket
    local_addr: Option<SocketAddr>,

    /// Cancellation token for stopping the task
    cancel: CancellationToken,

    /// Background task, taken by `stop`
    task: Option<JoinHandle<()>>,
}

impl Ingestor {
    /// Bind `0.0.0.0:port` and start receiving.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(port: u16) -> Result<Self> {
        Self::start_with(&IngestConfig { port, ..IngestConfig::default() }).await
    }

    /// Bind according to `config` and start receiving.
    pub async fn start_with(config: &IngestConfig) -> Result<Self> {
        let counters = Arc::new(IngestCounters::default());
        let provider = UdpProvider::bind(config, Arc::clone(&counters)).await?;
        let local_addr = provider.local_addr()?;

        let mut ingestor = Self::spawn_with_counters(provider, counters);
        ingestor.local_addr = Some(local_addr);

        info!(%local_addr, "Pose ingestor started");
        Ok(ingestor)
    }

    /// Start ingesting from an arbitrary provider.
    pub fn spawn<P: PoseProvider>(provider: P) -> Self {
        Self::spawn_with_counters(provider, Arc::new(IngestCounters::default()))
    }

    fn spawn_with_counters<P: PoseProvider>(provider: P, counters: Arc<IngestCounters>) -> Self {
        let (publisher, mailbox) = mailbox();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let task_counters = Arc::clone(&counters);
        let task = tokio::spawn(async move {
            Self::receive_task(provider, publisher, task_counters, task_cancel).await;
        });

        Self { mailbox, counters, local_addr: None, cancel, task: Some(task) }
    }

    /// Receive task - pulls snapshots and publishes the latest
    async fn receive_task<P: PoseProvider>(
        mut provider: P,
        publisher: MailboxPublisher,
        counters: Arc<IngestCounters>,
        cancel: CancellationToken,
    ) {
        let source = provider.describe();
        info!(%source, "Receive task started");
        let mut published = 0u64;
        let mut error_count = 0u32;

        loop {
            // Dropping the in-flight receive here releases the socket without
            // surfacing an error.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%source, "Receive task cancelled");
                    break;
                }
                result = provider.next_snapshot() => result,
            };

            match result {
                Ok(Some(snapshot)) => {
                    error_count = 0;
                    published += 1;
                    trace!(joints = snapshot.len(), published, "Publishing snapshot");
                    publisher.publish(snapshot);
                    counters.record_published();
                }
                Ok(None) => {
                    info!(%source, "Provider ended after {} snapshots", published);
                    break;
                }
                Err(e) => {
                    if cancel.is_cancelled() {
                        break;
                    }

                    counters.record_error();
                    error_count = error_count.saturating_add(1);
                    if error_count >= ESCALATE_AFTER_ERRORS {
                        error!(%source, consecutive = error_count, "Receive keeps failing, still retrying: {}", e);
                    } else {
                        warn!(%source, consecutive = error_count, "Receive error: {}", e);
                    }

                    // Exponential backoff: 100ms, 200ms, ... capped until the next success
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5))).min(MAX_BACKOFF);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!(%source, "Receive task ended (published {} snapshots)", published);
    }

    /// Take the latest snapshot received since the previous drain.
    ///
    /// Non-blocking; safe to call from a tick loop without a runtime context.
    /// Socket errors never end a UDP ingestor; only [`Ingestor::stop`] or the
    /// end of a finite provider does.
    pub fn drain(&mut self) -> Option<Arc<Snapshot>> {
        self.mailbox.drain()
    }

    /// Whether a snapshot is waiting to be drained.
    pub fn has_pending(&self) -> bool {
        self.mailbox.has_pending()
    }

    /// A clone of the mailbox, for a consumer that lives apart from the handle.
    pub fn mailbox(&self) -> Mailbox {
        self.mailbox.clone()
    }

    /// Stream of received snapshots with latest-wins rate limiting.
    pub fn snapshots(&self, rate: UpdateRate) -> impl Stream<Item = Arc<Snapshot>> + 'static {
        let snapshots =
            WatchStream::from_changes(self.mailbox.subscribe()).filter_map(|opt| async move { opt });

        match rate.throttle_interval() {
            None => snapshots.boxed(),
            Some(interval) => snapshots.throttle(interval).boxed(),
        }
    }

    /// Current receive statistics
    pub fn stats(&self) -> IngestStats {
        self.counters.snapshot()
    }

    /// Address of the bound socket, when started with [`Ingestor::start`].
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Stop the receive task and wait for it to exit.
    ///
    /// The socket is closed before this returns, so the port can be rebound.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Receive task panicked: {}", e);
                }
            }
        }
        debug!(stats = ?self.counters.snapshot(), "Pose ingestor stopped");
    }
}

impl Drop for Ingestor {
    fn drop(&mut self) {
        // Cancel tasks on drop; the task exits at its next await point.
        self.cancel.cancel();
    }
}

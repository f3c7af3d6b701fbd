//! Provider trait for snapshot sources

use crate::Result;
use crate::types::Snapshot;

/// Trait for pose snapshot sources
///
/// Providers own their I/O and block (asynchronously) until the next
/// snapshot is available. The ingest driver calls `next_snapshot` in a loop
/// on a background task and publishes each result to the mailbox.
#[async_trait::async_trait]
pub trait PoseProvider: Send + 'static {
    /// Get the next decoded snapshot
    ///
    /// Returns:
    /// - `Ok(Some(snapshot))` - New snapshot available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - I/O error; the driver decides whether to keep going
    ///
    /// Undecodable input is the provider's concern: it should log and skip
    /// it rather than return an error.
    async fn next_snapshot(&mut self) -> Result<Option<Snapshot>>;

    /// Short label for log output
    fn describe(&self) -> String;
}

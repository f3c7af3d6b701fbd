//! Single-slot, last-write-wins handoff between the receive task and the tick loop
//!
//! The slot is a `tokio::sync::watch` channel: publishing replaces the pending
//! snapshot, and draining marks the current value as seen. A snapshot that is
//! replaced before it is drained is dropped. There is never a backlog.

use std::sync::Arc;
use tokio::sync::watch;

use crate::types::Snapshot;

/// Create a connected publisher and mailbox pair.
pub fn mailbox() -> (MailboxPublisher, Mailbox) {
    let (tx, rx) = watch::channel(None);
    (MailboxPublisher { tx }, Mailbox { rx })
}

/// Producer side, owned by the receive task.
#[derive(Debug)]
pub struct MailboxPublisher {
    tx: watch::Sender<Option<Arc<Snapshot>>>,
}

impl MailboxPublisher {
    /// Overwrite the slot with `snapshot`.
    ///
    /// Succeeds even when no consumer is attached.
    pub fn publish(&self, snapshot: Snapshot) {
        self.tx.send_replace(Some(Arc::new(snapshot)));
    }

    /// Whether every consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side, drained from the tick loop.
#[derive(Debug, Clone)]
pub struct Mailbox {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl Mailbox {
    /// Take the pending snapshot, if one arrived since the previous drain.
    ///
    /// Never blocks. The channel lock is held only while the value is cloned.
    pub fn drain(&mut self) -> Option<Arc<Snapshot>> {
        let current = self.rx.borrow_and_update();
        if current.has_changed() { current.clone() } else { None }
    }

    /// Whether a snapshot is waiting to be drained.
    pub fn has_pending(&self) -> bool {
        // Ref::has_changed also reports an unseen final value after the publisher is gone.
        self.rx.borrow().has_changed()
    }

    /// A receiver for async consumers that starts at the current value.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JointPose, Quat, Vec3};

    fn snapshot(x: f32) -> Snapshot {
        Snapshot::new(vec![JointPose::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)])
    }

    #[test]
    fn empty_mailbox_drains_nothing() {
        let (_publisher, mut mailbox) = mailbox();
        assert!(!mailbox.has_pending());
        assert!(mailbox.drain().is_none());
    }

    #[test]
    fn newest_snapshot_wins() {
        let (publisher, mut mailbox) = mailbox();
        publisher.publish(snapshot(1.0));
        publisher.publish(snapshot(2.0));

        assert!(mailbox.has_pending());
        let drained = mailbox.drain().expect("latest snapshot should be pending");
        assert_eq!(*drained, snapshot(2.0));
        assert!(mailbox.drain().is_none());
    }

    #[test]
    fn each_publish_is_drained_once() {
        let (publisher, mut mailbox) = mailbox();
        for i in 0..5 {
            publisher.publish(snapshot(i as f32));
            assert_eq!(*mailbox.drain().unwrap(), snapshot(i as f32));
            assert!(mailbox.drain().is_none());
        }
    }

    #[test]
    fn final_value_survives_publisher_drop() {
        let (publisher, mut mailbox) = mailbox();
        publisher.publish(snapshot(7.0));
        drop(publisher);

        assert!(mailbox.has_pending());
        assert_eq!(*mailbox.drain().unwrap(), snapshot(7.0));
        assert!(mailbox.drain().is_none());
    }

    #[test]
    fn publishes_across_threads() {
        let (publisher, mut mailbox) = mailbox();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                publisher.publish(snapshot(i as f32));
            }
        });
        handle.join().unwrap();

        assert_eq!(*mailbox.drain().unwrap(), snapshot(99.0));
        assert!(mailbox.drain().is_none());
    }
}

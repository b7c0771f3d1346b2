//! Hand-off from a sampler thread to its single consumer.

use std::sync::Arc;
use tokio::sync::watch;

/// Destination for the snapshots produced by a sampler.
///
/// `publish` is called on the sampler thread once per completed cycle. It
/// should hand the value off and return; marshalling onto a UI thread is the
/// consumer's job.
pub trait SnapshotSink<T>: Send + 'static {
    fn publish(&mut self, snapshot: T);
}

impl<T, F> SnapshotSink<T> for F
where
    F: FnMut(T) + Send + 'static,
{
    fn publish(&mut self, snapshot: T) {
        self(snapshot)
    }
}

type Slot<T> = Option<(u64, Arc<T>)>;

/// Creates a single-slot latest-value channel.
///
/// The sender overwrites the slot on every publish, so a slow consumer only
/// ever sees the newest snapshot (last write wins).
pub fn snapshot_channel<T>() -> (SnapshotSender<T>, SnapshotReceiver<T>) {
    let (tx, rx) = watch::channel(None);
    (
        SnapshotSender { tx, sequence: 0 },
        SnapshotReceiver { rx, last_seen: 0 },
    )
}

/// Producer half of [`snapshot_channel`].
#[derive(Debug)]
pub struct SnapshotSender<T> {
    tx: watch::Sender<Slot<T>>,
    sequence: u64,
}

impl<T> SnapshotSender<T> {
    /// Replace the slot contents. Never blocks and never fails, even with no receiver.
    pub fn send(&mut self, snapshot: T) {
        self.sequence += 1;
        self.tx.send_replace(Some((self.sequence, Arc::new(snapshot))));
    }

    /// Number of snapshots sent so far.
    pub fn sent(&self) -> u64 {
        self.sequence
    }
}

impl<T> SnapshotSink<T> for SnapshotSender<T>
where
    T: Send + Sync + 'static,
{
    fn publish(&mut self, snapshot: T) {
        self.send(snapshot);
    }
}

/// Consumer half of [`snapshot_channel`].
#[derive(Debug, Clone)]
pub struct SnapshotReceiver<T> {
    rx: watch::Receiver<Slot<T>>,
    last_seen: u64,
}

impl<T> SnapshotReceiver<T> {
    /// The most recent snapshot, whether or not it was already taken.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.rx.borrow().as_ref().map(|(_, value)| Arc::clone(value))
    }

    /// The most recent snapshot if it has not been returned by this receiver before.
    ///
    /// Intermediate snapshots published between two calls are skipped.
    pub fn take_new(&mut self) -> Option<Arc<T>> {
        let slot = self.rx.borrow();
        match slot.as_ref() {
            Some((sequence, value)) if *sequence != self.last_seen => {
                self.last_seen = *sequence;
                Some(Arc::clone(value))
            }
            _ => None,
        }
    }

    /// Sequence number of the last snapshot returned by [`take_new`](Self::take_new).
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// True once the sender has been dropped (its sampler thread exited).
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_new_returns_each_value_once() {
        let (mut tx, mut rx) = snapshot_channel::<u32>();
        assert!(rx.take_new().is_none());

        tx.send(7);
        assert_eq!(rx.take_new().as_deref(), Some(&7));
        assert!(rx.take_new().is_none());
        assert_eq!(rx.latest().as_deref(), Some(&7));
    }

    #[test]
    fn test_last_write_wins() {
        let (mut tx, mut rx) = snapshot_channel::<u32>();
        tx.send(1);
        tx.send(2);
        tx.send(3);

        assert_eq!(rx.take_new().as_deref(), Some(&3));
        assert_eq!(rx.last_seen(), 3);
        assert_eq!(tx.sent(), 3);
    }

    #[test]
    fn test_receiver_sees_close() {
        let (tx, rx) = snapshot_channel::<u32>();
        assert!(!rx.is_closed());
        drop(tx);
        assert!(rx.is_closed());
    }

    #[test]
    fn test_value_survives_sender_drop() {
        let (mut tx, mut rx) = snapshot_channel::<&'static str>();
        tx.send("last");
        drop(tx);
        assert_eq!(rx.take_new().as_deref(), Some(&"last"));
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let target = Arc::clone(&seen);
        let mut sink = move |value: u32| target.lock().push(value);

        SnapshotSink::publish(&mut sink, 1);
        SnapshotSink::publish(&mut sink, 2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }
}

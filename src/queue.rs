//! Garbage queue shared by a display and its resources.

use crossbeam_channel as chan;

/// Send half of a [`Queue`].
pub type Sender<T> = chan::Sender<T>;

/// Receive half of a [`Queue`].
pub type Receiver<T> = chan::Receiver<T>;

/// A thread-safe queue.
///
/// Unbounded, so that dropping a resource never blocks a thread that
/// has no context current.
#[derive(Clone)]
pub struct Queue<T> {
    /// Send half of the queue.
    tx: Sender<T>,

    /// Receive half of the queue.
    rx: Receiver<T>,
}

impl<T> Queue<T> {
    /// Constructor.
    pub fn new() -> Self {
        let (tx, rx) = chan::unbounded();
        Self { tx, rx }
    }

    /// Clone the send half of the queue.
    pub fn tx(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Remove the item from the front of the queue.
    pub fn next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Returns the number of queued items.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

use crate::WordTask;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// Drain-only FIFO of pending word checks.
///
/// The producer enqueues every task before any worker starts pulling, so
/// consumers treat an empty queue as the end of the run rather than a lull.
/// Dequeueing is safe from any number of worker threads without external
/// locking.
pub struct WorkQueue {
    tx: Sender<WordTask>,
    rx: Receiver<WordTask>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Append a task. Producer-side only; all enqueuing happens before the
    /// first dequeue.
    pub fn enqueue(&self, task: WordTask) {
        // An unbounded channel only refuses a send once every receiver is
        // gone, which cannot happen while `self` holds one.
        let _ = self.tx.send(task);
    }

    /// Pop the next task, or `None` when the queue is empty.
    pub fn try_dequeue(&self) -> Option<WordTask> {
        match self.rx.try_recv() {
            Ok(task) => Some(task),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

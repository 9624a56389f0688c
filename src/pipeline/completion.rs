use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every enqueued task has a recorded verdict.
    Drained,
    /// Cancellation stopped the workers before the queue drained.
    Cancelled,
}

/// One-shot completion latch for a single run.
///
/// Tracks an outstanding-task counter, incremented per enqueued task and
/// decremented when a verdict is recorded, never on dequeue, so a worker
/// that has pulled a task but is still waiting on the oracle keeps the run
/// open. `Drained` fires when the counter reaches zero after the producer
/// declared itself finished; an empty queue on its own proves nothing while
/// siblings are mid-flight.
///
/// `Cancelled` is fired by the run once its workers have stopped early.
/// Whichever terminal state is reached first wins, exactly once.
pub struct CompletionLatch {
    outstanding: AtomicUsize,
    producer_done: AtomicBool,
    fired: AtomicBool,
    outcome: Mutex<Option<RunOutcome>>,
    done: Condvar,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self {
            outstanding: AtomicUsize::new(0),
            producer_done: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    /// Account for one enqueued task. Producer-side only.
    pub fn task_enqueued(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// The producer will enqueue nothing further. Fires `Drained` right away
    /// when the run had no tasks at all.
    pub fn producer_finished(&self) {
        self.producer_done.store(true, Ordering::SeqCst);
        if self.outstanding.load(Ordering::SeqCst) == 0 {
            self.fire(RunOutcome::Drained);
        }
    }

    /// Account for one recorded verdict. Fires `Drained` when this was the
    /// last outstanding task and the producer already finished.
    pub fn task_resolved(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "more verdicts recorded than tasks enqueued");
        if previous == 1 && self.producer_done.load(Ordering::SeqCst) {
            self.fire(RunOutcome::Drained);
        }
    }

    /// Terminate the run as cancelled. A no-op if the latch already fired.
    pub fn cancelled(&self) {
        self.fire(RunOutcome::Cancelled);
    }

    /// Block until the run reaches a terminal state.
    pub fn wait(&self) -> RunOutcome {
        let mut slot = self.outcome.lock().expect("completion latch poisoned");
        loop {
            if let Some(outcome) = *slot {
                return outcome;
            }
            slot = self.done.wait(slot).expect("completion latch poisoned");
        }
    }

    /// The terminal outcome, if one has been reached.
    pub fn outcome(&self) -> Option<RunOutcome> {
        *self.outcome.lock().expect("completion latch poisoned")
    }

    fn fire(&self, outcome: RunOutcome) {
        if self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let mut slot = self.outcome.lock().expect("completion latch poisoned");
        *slot = Some(outcome);
        self.done.notify_all();
    }
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new()
    }
}

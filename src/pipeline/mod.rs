pub mod cancel;
pub mod collector;
pub mod completion;
pub mod queue;
pub mod worker;

pub use cancel::CancelToken;
pub use collector::{EventSink, NullSink, ResultCollector, ResultSet, RunEvent};
pub use completion::{CompletionLatch, RunOutcome};
pub use queue::WorkQueue;
pub use worker::WorkerOptions;

use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::documents::{DocumentError, DocumentId, DocumentStore};
use crate::oracle::SpellCheckClient;
use crate::rewrite::{CorrectionPair, FileRewriter, RewriteSummary};
use crate::tokenizer::tokenize;

/// Lifecycle of a checking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Enqueuing,
    Checking,
    Drained,
    Cancelled,
    Replacing,
}

impl RunState {
    /// Legal state transitions. A new run may begin from any resting state
    /// but never while one is in progress, and corrections may only be
    /// applied once a run has drained.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle | Drained | Cancelled | Replacing, Enqueuing)
                | (Enqueuing, Checking)
                | (Checking, Drained | Cancelled)
                | (Drained | Replacing, Replacing)
        )
    }
}

/// Everything a finished run has to say for itself.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub results: ResultSet,
    /// Documents whose text could not be read; their words were never
    /// enqueued. The rest of the batch ran normally.
    pub failed_documents: Vec<DocumentError>,
    pub words_enqueued: usize,
}

impl RunReport {
    pub fn cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }
}

/// Drives a batch of documents through the checking pipeline.
///
/// Each run owns a fresh queue, collector and completion latch; the checker
/// itself only carries the oracle client, the pool options and the current
/// state across runs.
pub struct SpellChecker {
    client: Box<dyn SpellCheckClient>,
    options: WorkerOptions,
    state: RunState,
}

impl SpellChecker {
    pub fn new(client: Box<dyn SpellCheckClient>, options: WorkerOptions) -> Self {
        Self {
            client,
            options,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Check every word of every document against the oracle.
    ///
    /// Documents are read and tokenized in parallel, then all tasks are
    /// enqueued before the first worker starts; the queue is drain-only
    /// from that point on. The sink receives one `WordResolved` per word
    /// and a final `RunCompleted`, which is always the last event.
    pub fn run(
        &mut self,
        documents: &[DocumentId],
        store: &dyn DocumentStore,
        sink: &dyn EventSink,
        cancel: &CancelToken,
    ) -> Result<RunReport> {
        if self.options.workers == 0 {
            bail!("worker count must be at least 1");
        }
        if !self.state.can_advance_to(RunState::Enqueuing) {
            bail!("cannot start a run from the {:?} state", self.state);
        }
        self.advance(RunState::Enqueuing);

        let queue = WorkQueue::new();
        let latch = CompletionLatch::new();
        let collector = ResultCollector::new(sink);

        let tokenized: Vec<Result<Vec<_>, DocumentError>> = documents
            .par_iter()
            .map(|id| store.read_all(id).map(|text| tokenize(id, &text)))
            .collect();

        let mut failed_documents = Vec::new();
        let mut words_enqueued = 0;
        for outcome in tokenized {
            match outcome {
                Ok(tasks) => {
                    for task in tasks {
                        latch.task_enqueued();
                        queue.enqueue(task);
                        words_enqueued += 1;
                    }
                }
                Err(error) => failed_documents.push(error),
            }
        }
        latch.producer_finished();

        self.advance(RunState::Checking);
        worker::drain(
            &queue,
            self.client.as_ref(),
            &collector,
            &latch,
            cancel,
            &self.options,
        )?;

        // The workers have joined. If the latch has not fired, they stopped
        // early on the cancellation flag; a drained latch wins the race.
        if latch.outcome().is_none() {
            latch.cancelled();
        }
        let outcome = latch.wait();

        self.advance(match outcome {
            RunOutcome::Drained => RunState::Drained,
            RunOutcome::Cancelled => RunState::Cancelled,
        });
        sink.emit(RunEvent::RunCompleted {
            cancelled: outcome == RunOutcome::Cancelled,
        });

        Ok(RunReport {
            outcome,
            results: collector.into_results(),
            failed_documents,
            words_enqueued,
        })
    }

    /// Rewrite the given documents with a reviewed set of corrections.
    /// Only legal once a run has drained; never runs concurrently with
    /// checking.
    pub fn apply_corrections(
        &mut self,
        pairs: &[CorrectionPair],
        documents: &[DocumentId],
        store: &dyn DocumentStore,
    ) -> Result<RewriteSummary> {
        if !self.state.can_advance_to(RunState::Replacing) {
            bail!(
                "corrections can only be applied after a drained run, not from the {:?} state",
                self.state
            );
        }
        self.advance(RunState::Replacing);

        let rewriter = FileRewriter::new(pairs)?;
        Ok(rewriter.apply(documents, store))
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal state transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

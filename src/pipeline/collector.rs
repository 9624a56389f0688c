use std::sync::Mutex;

use crate::Verdict;

/// Observable milestones of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A word received its verdict.
    WordResolved(Verdict),
    /// The run reached a terminal state. Always the last event of a run.
    RunCompleted { cancelled: bool },
}

/// Receiver for run events. Implementations must tolerate concurrent calls
/// from multiple worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}

impl EventSink for crossbeam_channel::Sender<RunEvent> {
    fn emit(&self, event: RunEvent) {
        // A dropped receiver means nobody is watching anymore.
        let _ = self.send(event);
    }
}

/// Aggregated verdicts of a run.
///
/// `misspelled` and `suggestions` are parallel: `suggestions[i]` is the
/// replacement proposed for `misspelled[i]`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub misspelled: Vec<String>,
    pub suggestions: Vec<String>,
    pub correct: Vec<String>,
    pub unresolved: Vec<(String, String)>,
}

impl ResultSet {
    /// Misspelled words paired with their suggested replacements.
    pub fn corrections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.misspelled
            .iter()
            .map(String::as_str)
            .zip(self.suggestions.iter().map(String::as_str))
    }

    pub fn total_resolved(&self) -> usize {
        self.misspelled.len() + self.correct.len() + self.unresolved.len()
    }

    pub fn has_misspellings(&self) -> bool {
        !self.misspelled.is_empty()
    }

    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Correct { word } => self.correct.push(word.clone()),
            Verdict::Misspelled { word, suggestion } => {
                self.misspelled.push(word.clone());
                self.suggestions.push(suggestion.clone());
            }
            Verdict::Unresolved { word, error } => {
                self.unresolved.push((word.clone(), error.clone()));
            }
        }
    }
}

/// Thread-safe verdict aggregator shared by the worker pool.
///
/// Recording appends to the result set under a mutex; the event emission
/// happens after the lock is released so a slow sink never serializes
/// the workers.
pub struct ResultCollector<'a> {
    results: Mutex<ResultSet>,
    sink: &'a dyn EventSink,
}

impl<'a> ResultCollector<'a> {
    pub fn new(sink: &'a dyn EventSink) -> Self {
        Self {
            results: Mutex::new(ResultSet::default()),
            sink,
        }
    }

    /// Record one verdict and notify the sink.
    pub fn record(&self, verdict: Verdict) {
        {
            let mut results = self.results.lock().expect("result collector poisoned");
            results.record(&verdict);
        }
        self.sink.emit(RunEvent::WordResolved(verdict));
    }

    pub fn into_results(self) -> ResultSet {
        self.results
            .into_inner()
            .expect("result collector poisoned")
    }
}

use spellsweep::documents::{DocumentError, DocumentId, DocumentStore};
use spellsweep::oracle::{SpellCheckClient, SpellCheckError, Suggestion};
use spellsweep::pipeline::{
    CancelToken, NullSink, RunEvent, RunOutcome, RunState, WorkerOptions,
};
use spellsweep::rewrite::CorrectionPair;
use spellsweep::SpellChecker;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// In-memory document store for driving the pipeline without touching disk.
struct MemStore {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemStore {
    fn new(entries: &[(&str, &str)]) -> Self {
        let files = entries
            .iter()
            .map(|(name, text)| (PathBuf::from(name), text.to_string()))
            .collect();
        Self {
            files: Mutex::new(files),
        }
    }

    fn content(&self, name: &str) -> String {
        self.files.lock().unwrap()[&PathBuf::from(name)].clone()
    }
}

impl DocumentStore for MemStore {
    fn read_all(&self, id: &DocumentId) -> Result<String, DocumentError> {
        self.files
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DocumentError::Read {
                path: id.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            })
    }

    fn write_all(&self, id: &DocumentId, text: &str) -> Result<(), DocumentError> {
        self.files
            .lock()
            .unwrap()
            .insert(id.clone(), text.to_string());
        Ok(())
    }
}

/// Oracle with scripted corrections, scripted failures and optional latency.
struct ScriptedOracle {
    corrections: HashMap<String, String>,
    fail_words: Vec<String>,
    panic_words: Vec<String>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new() -> Self {
        Self {
            corrections: HashMap::new(),
            fail_words: Vec::new(),
            panic_words: Vec::new(),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_correction(mut self, word: &str, suggestion: &str) -> Self {
        self.corrections
            .insert(word.to_string(), suggestion.to_string());
        self
    }

    fn with_failure(mut self, word: &str) -> Self {
        self.fail_words.push(word.to_string());
        self
    }

    fn with_panic(mut self, word: &str) -> Self {
        self.panic_words.push(word.to_string());
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpellCheckClient for ScriptedOracle {
    fn check(&self, word: &str) -> Result<Suggestion, SpellCheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.panic_words.iter().any(|w| w == word) {
            panic!("no script for {word}");
        }
        if self.fail_words.iter().any(|w| w == word) {
            return Err(SpellCheckError::RequestFailed {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }
        let proposed = self
            .corrections
            .get(word)
            .cloned()
            .unwrap_or_else(|| word.to_string());
        Ok(Suggestion(proposed))
    }
}

/// Hands the checker a shared oracle so tests can inspect call counts after
/// the run.
#[derive(Clone)]
struct Shared(Arc<ScriptedOracle>);

impl SpellCheckClient for Shared {
    fn check(&self, word: &str) -> Result<Suggestion, SpellCheckError> {
        self.0.check(word)
    }
}

fn fast_options(workers: usize) -> WorkerOptions {
    WorkerOptions {
        workers,
        throttle: Duration::ZERO,
        retry_limit: 2,
        backoff: Duration::ZERO,
    }
}

fn docs(names: &[&str]) -> Vec<DocumentId> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn test_every_word_gets_exactly_one_verdict() {
    let first: String = (0..20).map(|i| format!("alpha{} ", i)).collect();
    let second: String = (0..20).map(|i| format!("beta{} ", i)).collect();

    for workers in [1, 4] {
        let store = MemStore::new(&[("a.txt", &first), ("b.txt", &second)]);
        let oracle = Arc::new(ScriptedOracle::new().with_latency(Duration::from_millis(2)));
        let mut checker = SpellChecker::new(Box::new(Shared(oracle.clone())), fast_options(workers));

        let report = checker
            .run(
                &docs(&["a.txt", "b.txt"]),
                &store,
                &NullSink,
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Drained);
        assert_eq!(report.words_enqueued, 40);
        assert_eq!(report.results.total_resolved(), 40, "workers = {workers}");
        assert_eq!(report.results.correct.len(), 40);
        assert_eq!(oracle.calls(), 40);
    }
}

#[test]
fn test_teh_quick_fox_scenario() {
    let store = MemStore::new(&[("one.txt", "teh quick fox"), ("two.txt", "brown fox jumps")]);
    let oracle = Arc::new(ScriptedOracle::new().with_correction("teh", "the"));
    let mut checker = SpellChecker::new(Box::new(Shared(oracle)), fast_options(3));
    let documents = docs(&["one.txt", "two.txt"]);

    let report = checker
        .run(&documents, &store, &NullSink, &CancelToken::new())
        .unwrap();

    assert_eq!(report.results.misspelled, vec!["teh"]);
    assert_eq!(report.results.suggestions, vec!["the"]);
    assert_eq!(report.results.correct.len(), 5);
    assert_eq!(checker.state(), RunState::Drained);

    let pairs = vec![CorrectionPair::new("teh", "the")];
    let summary = checker
        .apply_corrections(&pairs, &documents, &store)
        .unwrap();

    assert_eq!(store.content("one.txt"), "the quick fox");
    assert_eq!(store.content("two.txt"), "brown fox jumps");
    assert_eq!(summary.total_occurrences(), 1);
    assert_eq!(checker.state(), RunState::Replacing);

    // A second apply finds nothing left to replace.
    let again = checker
        .apply_corrections(&pairs, &documents, &store)
        .unwrap();
    assert_eq!(store.content("one.txt"), "the quick fox");
    assert_eq!(again.files_changed(), 0);
}

#[test]
fn test_persistent_failure_ends_as_unresolved() {
    let store = MemStore::new(&[("doc.txt", "good qzx fine")]);
    let oracle = Arc::new(ScriptedOracle::new().with_failure("qzx"));
    let mut checker = SpellChecker::new(Box::new(Shared(oracle.clone())), fast_options(2));

    let report = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &CancelToken::new())
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Drained);
    assert_eq!(report.results.unresolved.len(), 1);
    assert_eq!(report.results.unresolved[0].0, "qzx");
    assert_eq!(report.results.correct.len(), 2);
    assert_eq!(report.results.total_resolved(), 3);
    // Two clean words once each, the failing word once plus two retries.
    assert_eq!(oracle.calls(), 5);
}

#[test]
fn test_panicking_worker_surfaces_as_an_error() {
    let store = MemStore::new(&[("doc.txt", "alpha beta gamma delta")]);
    let oracle = ScriptedOracle::new().with_panic("beta");
    let mut checker = SpellChecker::new(Box::new(oracle), fast_options(2));

    // The run must come back with an error rather than wait forever on a
    // completion signal the dead worker can no longer feed.
    let error = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &CancelToken::new())
        .unwrap_err();

    assert!(error.to_string().contains("worker thread panicked"));
}

#[test]
fn test_run_completed_is_the_last_event() {
    let store = MemStore::new(&[("doc.txt", "teh quick brown fox jumps")]);
    let oracle = Arc::new(
        ScriptedOracle::new()
            .with_correction("teh", "the")
            .with_latency(Duration::from_millis(3)),
    );
    let mut checker = SpellChecker::new(Box::new(Shared(oracle)), fast_options(3));

    let (tx, rx) = crossbeam_channel::unbounded();
    checker
        .run(&docs(&["doc.txt"]), &store, &tx, &CancelToken::new())
        .unwrap();
    drop(tx);

    let events: Vec<RunEvent> = rx.iter().collect();
    assert_eq!(events.len(), 6);
    assert_eq!(
        events.last(),
        Some(&RunEvent::RunCompleted { cancelled: false })
    );
    for event in &events[..5] {
        let RunEvent::WordResolved(verdict) = event else {
            panic!("expected a verdict before completion, got {event:?}");
        };
        if verdict.word() == "teh" {
            assert!(!verdict.is_correct());
            assert_eq!(verdict.suggestion(), Some("the"));
        } else {
            assert!(verdict.is_correct());
            assert_eq!(verdict.suggestion(), Some(verdict.word()));
        }
    }
}

#[test]
fn test_cancellation_reaches_a_cancelled_terminal_state() {
    let words: String = (0..30).map(|i| format!("word{} ", i)).collect();
    let store = MemStore::new(&[("doc.txt", &words)]);
    let oracle = Arc::new(ScriptedOracle::new().with_latency(Duration::from_millis(50)));
    let mut checker = SpellChecker::new(Box::new(Shared(oracle.clone())), fast_options(2));

    let cancel = CancelToken::new();
    let canceller = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        })
    };

    let report = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &cancel)
        .unwrap();
    canceller.join().unwrap();

    assert_eq!(report.outcome, RunOutcome::Cancelled);
    assert!(report.cancelled());
    assert!(report.results.total_resolved() < 30);
    assert_eq!(checker.state(), RunState::Cancelled);

    // The workers have joined: the oracle sees no further calls.
    let calls_at_return = oracle.calls();
    thread::sleep(Duration::from_millis(120));
    assert_eq!(oracle.calls(), calls_at_return);
}

#[test]
fn test_cancelled_checker_can_start_a_new_run() {
    let store = MemStore::new(&[("doc.txt", "only words here")]);
    let oracle = Arc::new(ScriptedOracle::new());
    let mut checker = SpellChecker::new(Box::new(Shared(oracle)), fast_options(2));

    let cancelled = CancelToken::new();
    cancelled.cancel();
    let report = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &cancelled)
        .unwrap();
    assert_eq!(report.outcome, RunOutcome::Cancelled);

    let report = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &CancelToken::new())
        .unwrap();
    assert_eq!(report.outcome, RunOutcome::Drained);
    assert_eq!(report.results.total_resolved(), 3);
}

#[test]
fn test_unreadable_document_does_not_sink_the_batch() {
    let store = MemStore::new(&[("present.txt", "these words exist")]);
    let oracle = Arc::new(ScriptedOracle::new());
    let mut checker = SpellChecker::new(Box::new(Shared(oracle)), fast_options(2));

    let report = checker
        .run(
            &docs(&["present.txt", "absent.txt"]),
            &store,
            &NullSink,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Drained);
    assert_eq!(report.failed_documents.len(), 1);
    assert_eq!(
        report.failed_documents[0].path(),
        PathBuf::from("absent.txt").as_path()
    );
    assert_eq!(report.results.correct.len(), 3);
}

#[test]
fn test_duplicate_words_are_checked_separately() {
    let store = MemStore::new(&[("doc.txt", "teh teh teh")]);
    let oracle = Arc::new(ScriptedOracle::new().with_correction("teh", "the"));
    let mut checker = SpellChecker::new(Box::new(Shared(oracle.clone())), fast_options(2));

    let report = checker
        .run(&docs(&["doc.txt"]), &store, &NullSink, &CancelToken::new())
        .unwrap();

    assert_eq!(report.results.misspelled.len(), 3);
    assert_eq!(oracle.calls(), 3);
}

#[test]
fn test_results_do_not_leak_across_runs() {
    let oracle = Arc::new(ScriptedOracle::new().with_correction("wrld", "world"));
    let mut checker = SpellChecker::new(Box::new(Shared(oracle)), fast_options(2));

    let first_store = MemStore::new(&[("a.txt", "wrld wide web")]);
    let first = checker
        .run(
            &docs(&["a.txt"]),
            &first_store,
            &NullSink,
            &CancelToken::new(),
        )
        .unwrap();
    assert_eq!(first.results.misspelled, vec!["wrld"]);
    assert_eq!(first.words_enqueued, 3);

    let second_store = MemStore::new(&[("b.txt", "clean text")]);
    let second = checker
        .run(
            &docs(&["b.txt"]),
            &second_store,
            &NullSink,
            &CancelToken::new(),
        )
        .unwrap();
    assert!(second.results.misspelled.is_empty());
    assert_eq!(second.words_enqueued, 2);
    assert_eq!(second.results.total_resolved(), 2);
}

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use super::cancel::CancelToken;
use super::collector::ResultCollector;
use super::completion::CompletionLatch;
use super::queue::WorkQueue;
use crate::oracle::{SpellCheckClient, Suggestion};
use crate::{Config, Verdict, WordTask};

/// How often a sleeping worker re-checks the cancellation flag.
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Tuning knobs for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Number of checker threads.
    pub workers: usize,
    /// Pause after each resolved word, per worker.
    pub throttle: Duration,
    /// Extra attempts after a failed lookup.
    pub retry_limit: u32,
    /// Base delay before the first retry; doubles per attempt.
    pub backoff: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            workers: 3,
            throttle: Duration::from_millis(1000),
            retry_limit: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

impl WorkerOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.workers == 0 {
            bail!("worker count must be at least 1");
        }
        Ok(Self {
            workers: config.workers,
            throttle: config.throttle(),
            retry_limit: config.retry_limit,
            backoff: config.backoff(),
        })
    }
}

/// Run the worker pool until the queue is empty or the run is cancelled.
///
/// Every task is fully enqueued before this is called, so a worker that
/// finds the queue empty is done. The latch, not queue emptiness, decides
/// when the run as a whole is over: siblings may still hold tasks in
/// flight.
pub(crate) fn drain(
    queue: &WorkQueue,
    client: &dyn SpellCheckClient,
    collector: &ResultCollector<'_>,
    latch: &CompletionLatch,
    cancel: &CancelToken,
    options: &WorkerOptions,
) -> Result<()> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(options.workers);
        for id in 0..options.workers {
            let handle = thread::Builder::new()
                .name(format!("spell-worker-{id}"))
                .spawn_scoped(scope, move || {
                    worker_loop(queue, client, collector, latch, cancel, options);
                })
                .with_context(|| format!("failed to spawn worker thread {id}"))?;
            handles.push(handle);
        }

        for handle in handles {
            if handle.join().is_err() {
                bail!("a worker thread panicked");
            }
        }
        Ok(())
    })
}

fn worker_loop(
    queue: &WorkQueue,
    client: &dyn SpellCheckClient,
    collector: &ResultCollector<'_>,
    latch: &CompletionLatch,
    cancel: &CancelToken,
    options: &WorkerOptions,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let Some(task) = queue.try_dequeue() else {
            return;
        };
        // A task abandoned mid-flight records no verdict; the run is being
        // torn down and its counter no longer needs to reach zero.
        let Some(verdict) = resolve_task(client, &task, cancel, options) else {
            return;
        };
        collector.record(verdict);
        latch.task_resolved();
        sleep_unless_cancelled(options.throttle, cancel);
    }
}

/// Look up one word, retrying with exponential backoff. Returns `None`
/// when cancellation interrupts the attempt.
fn resolve_task(
    client: &dyn SpellCheckClient,
    task: &WordTask,
    cancel: &CancelToken,
    options: &WorkerOptions,
) -> Option<Verdict> {
    let mut last_error = None;
    for attempt in 0..=options.retry_limit {
        if cancel.is_cancelled() {
            return None;
        }
        if attempt > 0 {
            let delay = backoff_delay(options.backoff, attempt - 1);
            if !sleep_unless_cancelled(delay, cancel) {
                return None;
            }
        }
        match client.check(&task.word) {
            Ok(suggestion) => return Some(verdict_for(&task.word, suggestion)),
            Err(error) => last_error = Some(error),
        }
    }
    let error = last_error
        .map(|error| error.to_string())
        .unwrap_or_default();
    Some(Verdict::Unresolved {
        word: task.word.clone(),
        error,
    })
}

fn verdict_for(word: &str, suggestion: Suggestion) -> Verdict {
    if suggestion.0 == word {
        Verdict::Correct { word: suggestion.0 }
    } else {
        Verdict::Misspelled {
            word: word.to_string(),
            suggestion: suggestion.0,
        }
    }
}

fn backoff_delay(base: Duration, exponent: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(exponent))
}

/// Sleep in short slices so cancellation is observed promptly. Returns
/// `false` if the flag was raised before the full duration elapsed.
fn sleep_unless_cancelled(duration: Duration, cancel: &CancelToken) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return false;
        }
        let slice = remaining.min(CANCEL_POLL);
        thread::sleep(slice);
        remaining -= slice;
    }
    true
}

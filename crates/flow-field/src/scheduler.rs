//! Cooperative batch scheduling.
//!
//! Long grid computations run as resumable tasks: each burst processes units
//! until a time budget is spent, then the task rests so the single-threaded
//! runtime can serve navigation, animation ticks and point queries. All loop
//! state lives in the task, so a suspended task resumes at its next unit.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use currents_common::CurrentsResult;

/// Progress report emitted on every suspension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub label: &'static str,
    pub position: i64,
    pub bound: i64,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}/{}", self.label, self.position, self.bound)
    }
}

/// A unit-at-a-time computation with explicit cursor state.
pub trait BatchTask {
    type Output;

    /// Process one unit. Returns `Ok(true)` while more units remain.
    fn step(&mut self) -> CurrentsResult<bool>;

    /// Where the cursor is.
    fn progress(&self) -> Progress;

    /// Consume the finished task.
    fn finish(self) -> CurrentsResult<Self::Output>;
}

/// Outcome of one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    Suspended { processed: usize },
    Complete { processed: usize },
}

/// Step `task` until it completes or `budget` has elapsed.
///
/// At least one unit is processed per burst.
pub fn run_burst<T: BatchTask>(task: &mut T, budget: Duration) -> CurrentsResult<Burst> {
    let start = Instant::now();
    let mut processed = 0;
    loop {
        let more = task.step()?;
        processed += 1;
        if !more {
            return Ok(Burst::Complete { processed });
        }
        if start.elapsed() >= budget {
            return Ok(Burst::Suspended { processed });
        }
    }
}

/// Run `task` to completion, resting `rest` between bursts of `budget`.
///
/// `on_progress` is called after every suspended burst. Errors abort the task
/// and no output is produced.
#[instrument(skip_all, fields(budget_ms = budget.as_millis() as u64, rest_ms = rest.as_millis() as u64))]
pub async fn run_cooperative<T, F>(
    mut task: T,
    budget: Duration,
    rest: Duration,
    mut on_progress: F,
) -> CurrentsResult<T::Output>
where
    T: BatchTask,
    F: FnMut(&Progress),
{
    let mut bursts = 0u64;
    loop {
        bursts += 1;
        match run_burst(&mut task, budget)? {
            Burst::Complete { processed } => {
                debug!(bursts, last_burst = processed, "Batch complete");
                metrics::counter!("batch_bursts").increment(bursts);
                return task.finish();
            }
            Burst::Suspended { processed } => {
                let progress = task.progress();
                debug!(processed, %progress, "Batch suspended");
                on_progress(&progress);
                tokio::time::sleep(rest).await;
            }
        }
    }
}

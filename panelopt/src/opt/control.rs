use panelcut::entities::LayoutResult;
use std::time::{Duration, Instant};

/// Snapshot of a running search, reported periodically.
#[derive(Clone, Debug)]
pub struct Progress {
    pub iteration: u64,
    pub best_score: f64,
    pub best_result: LayoutResult,
    pub elapsed: Duration,
    /// Only reported by the annealing search
    pub temperature: Option<f64>,
    pub improvement_count: u64,
    pub baseline_score: f64,
}

/// Hooks through which a long running search is observed and cancelled.
pub trait SearchObserver {
    /// Polled once per iteration, the search stops at the first `true`
    fn cancelled(&self) -> bool;

    fn progress(&mut self, progress: Progress);
}

/// Observes nothing, never cancels
pub struct NoObserver;

impl SearchObserver for NoObserver {
    fn cancelled(&self) -> bool {
        false
    }

    fn progress(&mut self, _progress: Progress) {}
}

/// [`SearchObserver`] built from an optional cancellation predicate and an optional progress callback.
#[derive(Default)]
pub struct FnObserver<'a> {
    pub cancel: Option<Box<dyn Fn() -> bool + Send + Sync + 'a>>,
    pub on_progress: Option<Box<dyn FnMut(Progress) + Send + 'a>>,
}

impl<'a> FnObserver<'a> {
    pub fn with_cancel(mut self, cancel: impl Fn() -> bool + Send + Sync + 'a) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    pub fn with_progress(mut self, on_progress: impl FnMut(Progress) + Send + 'a) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }
}

impl SearchObserver for FnObserver<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c())
    }

    fn progress(&mut self, progress: Progress) {
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(progress);
        }
    }
}

/// Wall-clock timer deciding when the next progress report is due.
pub struct ProgressTimer {
    interval: Duration,
    last: Instant,
}

impl ProgressTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn due(&mut self) -> bool {
        match self.last.elapsed() >= self.interval {
            true => {
                self.last = Instant::now();
                true
            }
            false => false,
        }
    }
}

/// Whether a search started at `start` with the given budget has run out of time
pub fn out_of_time(start: Instant, budget: Duration) -> bool {
    start.elapsed() >= budget
}

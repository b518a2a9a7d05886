use std::time::{Duration, Instant};

/// One frame at 60 Hz.
pub const FRAME_BUDGET: Duration = Duration::from_micros(16_667);

/// Logs how long a scope took when dropped: `trace` normally, `debug` once it overruns
/// its budget.
pub struct ScopeTimer {
    name: &'static str,
    start: Instant,
    budget: Option<Duration>,
}

impl ScopeTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
            budget: None,
        }
    }

    /// Timer for work that should fit in `budget`.
    pub fn with_budget(name: &'static str, budget: Duration) -> Self {
        Self {
            budget: Some(budget),
            ..Self::new(name)
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn over_budget(&self) -> bool {
        self.budget.is_some_and(|budget| self.elapsed() > budget)
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        match self.budget {
            Some(budget) if self.over_budget() => {
                log::debug!("[TIMER] {} took {:?} (budget {:?})", self.name, elapsed, budget)
            }
            _ => log::trace!("[TIMER] {} took {:?}", self.name, elapsed),
        }
    }
}

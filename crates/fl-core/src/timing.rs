//! Lightweight performance timing utilities.
//!
//! Parsers record how long each phase takes (scan, clean, coerce, build).
//! Timing is off unless enabled programmatically or through the
//! `FLUENTIO_TIMING` environment variable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("FLUENTIO_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }
}

/// Elapsed time per parse phase, in the order the phases ran.
#[derive(Debug, Default, Clone)]
pub struct PhaseTimings {
    phases: Vec<(&'static str, f64)>,
}

impl PhaseTimings {
    /// Stop `timer` and keep its measurement when timing is enabled.
    pub fn record(&mut self, timer: Timer) {
        let label = timer.label();
        if let Some(elapsed) = timer.stop() {
            self.phases.push((label, elapsed));
        }
    }

    pub fn phases(&self) -> &[(&'static str, f64)] {
        &self.phases
    }

    pub fn total_seconds(&self) -> f64 {
        self.phases.iter().map(|(_, s)| s).sum()
    }

    /// Print a formatted summary of the phases to stderr.
    pub fn print_summary(&self) {
        if !is_enabled() || self.phases.is_empty() {
            return;
        }

        eprintln!("\n=== Parse Timing ===");
        for (label, secs) in &self.phases {
            eprintln!("{:<12} {:.4}s", label, secs);
        }
        eprintln!("{:<12} {:.4}s", "total", self.total_seconds());
        eprintln!("====================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_timer_records_phase() {
        enable_timing();
        let mut timings = PhaseTimings::default();
        timings.record(Timer::start("scan"));
        assert_eq!(timings.phases().len(), 1);
        assert_eq!(timings.phases()[0].0, "scan");
        assert!(timings.total_seconds() >= 0.0);
    }
}

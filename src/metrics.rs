// Run metrics
//
// Counters and step timings for a single upload run, logged as a summary at the end

use crate::services::UploadStep;
use std::time::{Duration, Instant};

/// How one workflow step went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTiming {
    pub step: UploadStep,
    pub duration: Duration,
    pub succeeded: bool,
}

/// Metrics for one pipeline run
#[derive(Debug)]
pub struct RunMetrics {
    /// Files that passed the allow/ignore filter
    pub files_selected: usize,

    /// Files handed to the upload widget
    pub files_staged: usize,

    /// Entries written to the output file
    pub links_recorded: usize,

    steps: Vec<StepTiming>,

    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            files_selected: 0,
            files_staged: 0,
            links_recorded: 0,
            steps: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn record_step(&mut self, step: UploadStep, duration: Duration, succeeded: bool) {
        self.steps.push(StepTiming {
            step,
            duration,
            succeeded,
        });
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// The step that failed, if any
    pub fn failed_step(&self) -> Option<UploadStep> {
        self.steps.iter().find(|t| !t.succeeded).map(|t| t.step)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// One-line summary of the run, naming the step that aborted it
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Run summary: {} selected, {} staged, {} links recorded in {:.2}s",
            self.files_selected,
            self.files_staged,
            self.links_recorded,
            self.elapsed().as_secs_f64()
        );
        if let Some(step) = self.failed_step() {
            line.push_str(&format!(", failed at step '{}'", step));
        }
        line
    }

    pub fn log_summary(&self) {
        tracing::info!("{}", self.summary());
        for timing in &self.steps {
            tracing::debug!(
                "  {:<24} {:>8.2}s {}",
                timing.step.to_string(),
                timing.duration.as_secs_f64(),
                if timing.succeeded { "ok" } else { "FAILED" }
            );
        }
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_step_reported() {
        let mut metrics = RunMetrics::new();
        metrics.record_step(UploadStep::Launch, Duration::from_millis(5), true);
        metrics.record_step(UploadStep::Authenticate, Duration::from_millis(7), false);

        assert_eq!(metrics.steps().len(), 2);
        assert_eq!(metrics.failed_step(), Some(UploadStep::Authenticate));
    }

    #[test]
    fn test_no_failed_step_on_clean_run() {
        let mut metrics = RunMetrics::new();
        metrics.record_step(UploadStep::Launch, Duration::ZERO, true);

        assert_eq!(metrics.failed_step(), None);
        assert!(!metrics.summary().contains("failed"));
    }

    #[test]
    fn test_summary_names_failed_step() {
        let mut metrics = RunMetrics::new();
        metrics.files_selected = 3;
        metrics.record_step(UploadStep::Launch, Duration::ZERO, true);
        metrics.record_step(UploadStep::SelectAlbum, Duration::from_secs(20), false);

        let summary = metrics.summary();
        assert!(summary.starts_with("Run summary: 3 selected"));
        assert!(summary.ends_with("failed at step 'select album'"));
    }
}

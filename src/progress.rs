//! Per-file progress tracking
//!
//! The encode loop reports after every frame, so updates replace the file's
//! record in place rather than accumulating history.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

/// Conversion status of a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Converting,
    Completed,
}

/// Progress record for one in-flight file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub processed_samples: u64,
    pub total_samples: u64,
    /// Rounded percentage in [0, 100].
    pub percentage: u8,
    pub status: ConversionStatus,
}

impl ProgressState {
    fn new(processed_samples: u64, total_samples: u64) -> Self {
        let percentage = percentage(processed_samples, total_samples);
        let status = if percentage >= 100 {
            ConversionStatus::Completed
        } else {
            ConversionStatus::Converting
        };
        Self {
            processed_samples,
            total_samples,
            percentage,
            status,
        }
    }
}

/// Rounded percentage clamped to [0, 100]. A zero total counts as done.
fn percentage(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (processed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Tracks progress records by file name.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    states: DashMap<String, ProgressState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the record for a conversion that is about to start.
    pub fn start(&self, name: &str, total_samples: u64) {
        self.states
            .insert(name.to_string(), ProgressState::new(0, total_samples));
    }

    /// Replace the file's record with the latest sample counts.
    ///
    /// Processed counts never regress: a stale update is folded into the
    /// current record, keeping the reported progress monotonic.
    pub fn update(&self, name: &str, processed_samples: u64, total_samples: u64) {
        let mut processed = processed_samples;
        if let Some(existing) = self.states.get(name) {
            processed = processed.max(existing.processed_samples);
        }
        self.states
            .insert(name.to_string(), ProgressState::new(processed, total_samples));
    }

    /// Current progress record for a file, if any.
    pub fn get(&self, name: &str) -> Option<ProgressState> {
        self.states.get(name).map(|r| *r.value())
    }

    /// Remove a file's record immediately.
    pub fn clear(&self, name: &str) {
        self.states.remove(name);
    }

    /// Remove a file's record after a grace period, leaving the completed
    /// state visible to the presentation layer meanwhile.
    ///
    /// Removal only applies to a record that is still completed: if the same
    /// file was resubmitted within the grace window, the stale timer leaves
    /// the new conversion's live record alone.
    pub fn clear_after(self: &Arc<Self>, name: String, grace: Duration) {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            tracker
                .states
                .remove_if(&name, |_, state| state.status == ConversionStatus::Completed);
        });
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no files are tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 1000), 0);
        assert_eq!(percentage(4, 1000), 0);
        assert_eq!(percentage(5, 1000), 1);
        assert_eq!(percentage(500, 1000), 50);
        assert_eq!(percentage(999, 1000), 100);
        assert_eq!(percentage(1000, 1000), 100);
    }

    #[test]
    fn test_percentage_clamped() {
        assert_eq!(percentage(2000, 1000), 100);
    }

    #[test]
    fn test_zero_total_is_completed() {
        let tracker = ProgressTracker::new();
        tracker.start("empty.wav", 0);
        let state = tracker.get("empty.wav").unwrap();
        assert_eq!(state.percentage, 100);
        assert_eq!(state.status, ConversionStatus::Completed);
    }

    #[test]
    fn test_update_replaces_record() {
        let tracker = ProgressTracker::new();
        tracker.start("a.wav", 100);
        for processed in [10, 20, 30] {
            tracker.update("a.wav", processed, 100);
        }
        assert_eq!(tracker.len(), 1);
        let state = tracker.get("a.wav").unwrap();
        assert_eq!(state.processed_samples, 30);
        assert_eq!(state.percentage, 30);
        assert_eq!(state.status, ConversionStatus::Converting);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let tracker = ProgressTracker::new();
        tracker.start("a.wav", 100);
        tracker.update("a.wav", 60, 100);
        tracker.update("a.wav", 40, 100);
        assert_eq!(tracker.get("a.wav").unwrap().processed_samples, 60);
    }

    #[test]
    fn test_completion_at_full_count() {
        let tracker = ProgressTracker::new();
        tracker.start("a.wav", 2304);
        tracker.update("a.wav", 1152, 2304);
        assert_eq!(
            tracker.get("a.wav").unwrap().status,
            ConversionStatus::Converting
        );
        tracker.update("a.wav", 2304, 2304);
        let state = tracker.get("a.wav").unwrap();
        assert_eq!(state.percentage, 100);
        assert_eq!(state.status, ConversionStatus::Completed);
    }

    #[test]
    fn test_clear_removes_record() {
        let tracker = ProgressTracker::new();
        tracker.start("a.wav", 10);
        tracker.clear("a.wav");
        assert!(tracker.get("a.wav").is_none());
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_after_grace_period() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.start("a.wav", 10);
        tracker.update("a.wav", 10, 10);
        tracker.clear_after("a.wav".to_string(), Duration::from_secs(2));

        // Still visible before the grace period elapses.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(tracker.get("a.wav").is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(tracker.get("a.wav").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_spares_resubmitted_file() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.start("a.wav", 10);
        tracker.update("a.wav", 10, 10);
        tracker.clear_after("a.wav".to_string(), Duration::from_secs(2));

        // The same file is resubmitted before the grace period elapses.
        tokio::time::sleep(Duration::from_secs(1)).await;
        tracker.start("a.wav", 100);
        tracker.update("a.wav", 30, 100);

        // The stale timer fires but must not delete the live record.
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        let state = tracker.get("a.wav").unwrap();
        assert_eq!(state.processed_samples, 30);
        assert_eq!(state.status, ConversionStatus::Converting);
    }
}

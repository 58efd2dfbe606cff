//! Progress notification port
//!
//! Defines the interface for reporting progress during a sweep.

use avp_sweep_domain::{Round, SearchReport, SweepConfiguration};

/// Callback for progress updates during a threshold search
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bar, etc.)
pub trait SweepProgressNotifier: Send + Sync {
    /// Called when a search for one configuration starts
    fn on_search_start(&self, config: &SweepConfiguration);

    /// Called when a round for `party_count` parties starts
    fn on_round_start(&self, party_count: usize);

    /// Called when a round has been classified
    fn on_round_complete(&self, round: &Round);

    /// Called when the search for one configuration finished
    fn on_search_complete(&self, config: &SweepConfiguration, report: &SearchReport);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SweepProgressNotifier for NoProgress {
    fn on_search_start(&self, _config: &SweepConfiguration) {}
    fn on_round_start(&self, _party_count: usize) {}
    fn on_round_complete(&self, _round: &Round) {}
    fn on_search_complete(&self, _config: &SweepConfiguration, _report: &SearchReport) {}
}

//! Progress reporting for sweep execution

use crate::output::console::ConsoleFormatter;
use avp_sweep_application::SweepProgressNotifier;
use avp_sweep_domain::{Round, SearchReport, SweepConfiguration, TallyOutcome};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a sweep with a progress bar per modulus
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn search_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepProgressNotifier for ProgressReporter {
    fn on_search_start(&self, config: &SweepConfiguration) {
        let pb = ProgressBar::new(config.max_party_count() as u64);
        pb.set_style(Self::search_style());
        pb.set_prefix(format!("q = {}", config.modulus()));
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(pb);
        }
    }

    fn on_round_start(&self, party_count: usize) {
        self.with_bar(|pb| pb.set_message(format!("m = {}", party_count)));
    }

    fn on_round_complete(&self, round: &Round) {
        self.with_bar(|pb| {
            pb.set_position(round.party_count() as u64);
            pb.set_message(format!(
                "m = {} {}",
                round.party_count(),
                outcome_mark(round.outcome())
            ));
        });
    }

    fn on_search_complete(&self, _config: &SweepConfiguration, report: &SearchReport) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = guard.take() {
            let message = format!("m_max = {}", report.max_safe);
            pb.abandon_with_message(message.green().to_string());
        }
    }
}

fn outcome_mark(outcome: &TallyOutcome) -> String {
    match outcome {
        TallyOutcome::AllYes { .. } => "v".green().to_string(),
        TallyOutcome::Vetoed { .. } => "x".red().to_string(),
        TallyOutcome::Indeterminate { .. } => "?".yellow().to_string(),
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SweepProgressNotifier for SimpleProgress {
    fn on_search_start(&self, config: &SweepConfiguration) {
        println!(
            "{} {} (m = 1..={})",
            "->".cyan(),
            format!("q = {}", config.modulus()).bold(),
            config.max_party_count()
        );
    }

    fn on_round_start(&self, party_count: usize) {
        println!("Testing with m = {} parties...", party_count);
    }

    fn on_round_complete(&self, round: &Round) {
        println!(
            "  {} {}",
            outcome_mark(round.outcome()),
            ConsoleFormatter::describe(round.outcome())
        );
    }

    fn on_search_complete(&self, config: &SweepConfiguration, report: &SearchReport) {
        match &report.first_failure {
            Some(failure) => println!(
                "Protocol broke at m = {}. Max safe m = {}",
                failure.party_count, report.max_safe
            ),
            None => println!(
                "{} All m={} parties passed.",
                "SUCCESS:".green().bold(),
                config.max_party_count()
            ),
        }
        if !report.monotonicity_violations.is_empty() {
            println!(
                "{} passed again at m = {:?}",
                "WARNING:".yellow().bold(),
                report.monotonicity_violations
            );
        }
        println!();
    }
}

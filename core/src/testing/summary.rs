use std::{collections::BTreeMap, time::Duration};

use super::result::{TestOutcome, Verdict};

/// Counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub generate_mode: bool,
    pub num_total: usize,
    pub count: BTreeMap<Verdict, usize>,
    pub total_execution_time: Duration,
}

impl RunSummary {
    pub fn new(generate_mode: bool) -> Self {
        Self {
            generate_mode,
            ..Default::default()
        }
    }

    pub fn add(&mut self, outcome: &TestOutcome) {
        self.num_total += 1;
        *self.count.entry(outcome.verdict).or_default() += 1;
        if let Some(t) = outcome.execution_time {
            self.total_execution_time += t;
        }
    }

    pub fn count_of(&self, verdict: Verdict) -> usize {
        self.count.get(&verdict).copied().unwrap_or(0)
    }

    pub fn num_passed(&self) -> usize {
        self.count_of(Verdict::AC)
    }

    pub fn num_generated(&self) -> usize {
        self.count_of(Verdict::GEN)
    }

    pub fn num_skipped(&self) -> usize {
        self.count_of(Verdict::SKIP)
    }

    /// Tests that ended as neither AC, GEN nor SKIP.
    pub fn num_failed(&self) -> usize {
        self.num_total - self.num_passed() - self.num_generated() - self.num_skipped()
    }

    pub fn average_execution_time(&self) -> Duration {
        match self.num_total {
            0 => Duration::ZERO,
            n => self.total_execution_time / n as u32,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.num_failed() == 0
    }
}

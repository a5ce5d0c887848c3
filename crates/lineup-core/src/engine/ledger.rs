use super::config::QbDiversityMode;
use crate::core::models::lineup::Lineup;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-run appearance counts, updated once per accepted lineup.
///
/// Exclusions for lineup `i` (1-based) are derived from the counts of the `i - 1` lineups already
/// accepted but divided by `i`. This lagging threshold lets realized exposure overshoot the limit
/// by up to one lineup in small batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageLedger {
    counts: HashMap<String, usize>,
    qb_counts: HashMap<String, usize>,
    lineups: usize,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lineup: &Lineup) {
        for player in lineup.players() {
            *self.counts.entry(player.name.clone()).or_default() += 1;
        }
        if let Some(qb) = lineup.quarterback() {
            *self.qb_counts.entry(qb.name.clone()).or_default() += 1;
        }
        self.lineups += 1;
    }

    pub fn lineups_recorded(&self) -> usize {
        self.lineups
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn qb_count(&self, name: &str) -> usize {
        self.qb_counts.get(name).copied().unwrap_or(0)
    }

    /// Realized share of recorded lineups containing `name`.
    pub fn exposure(&self, name: &str) -> f64 {
        if self.lineups == 0 {
            return 0.0;
        }
        self.count(name) as f64 / self.lineups as f64
    }

    pub fn exposures(&self) -> BTreeMap<String, f64> {
        self.counts
            .keys()
            .map(|name| (name.clone(), self.exposure(name)))
            .collect()
    }

    /// Players to exclude from lineup `lineup_number` under the general exposure ceiling.
    pub fn exposure_exclusions(&self, lineup_number: usize, max_exposure: f64) -> BTreeSet<String> {
        if lineup_number <= 1 {
            return BTreeSet::new();
        }
        self.counts
            .iter()
            .filter(|&(_, &count)| count as f64 / lineup_number as f64 >= max_exposure)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Quarterbacks to exclude from lineup `lineup_number`.
    ///
    /// `eligible` lists the quarterbacks not hard-excluded by the user; `rotate` uses it to decide
    /// whether every quarterback has had a turn.
    pub fn qb_exclusions(
        &self,
        lineup_number: usize,
        mode: QbDiversityMode,
        max_qb_exposure: f64,
        eligible: &[&str],
    ) -> BTreeSet<String> {
        match mode {
            QbDiversityMode::None => BTreeSet::new(),
            QbDiversityMode::Limit => {
                if lineup_number <= 1 {
                    return BTreeSet::new();
                }
                self.qb_counts
                    .iter()
                    .filter(|&(_, &count)| count as f64 / lineup_number as f64 >= max_qb_exposure)
                    .map(|(name, _)| name.clone())
                    .collect()
            }
            QbDiversityMode::Rotate => {
                let unused = eligible.iter().any(|name| self.qb_count(name) == 0);
                if unused {
                    return self
                        .qb_counts
                        .iter()
                        .filter(|&(_, &count)| count > 0)
                        .map(|(name, _)| name.clone())
                        .collect();
                }
                let Some(min) = eligible.iter().map(|name| self.qb_count(name)).min() else {
                    return BTreeSet::new();
                };
                self.qb_counts
                    .iter()
                    .filter(|&(_, &count)| count > min)
                    .map(|(name, _)| name.clone())
                    .collect()
            }
        }
    }
}

use crate::labels::Level;
use providers::Probabilities;
use serde::Serialize;

/// A classified file after canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub file_name: String,
    pub predicted_class: Level,
    pub probabilities: Probabilities,
}

/// Per-class counts for one batch. Counts always add up to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub high: usize,
    pub mid: usize,
    pub low: usize,
    pub total: usize,
}

impl AggregateSummary {
    pub fn from_levels<I: IntoIterator<Item = Level>>(levels: I) -> Self {
        let mut summary = Self::default();
        for level in levels {
            summary.record(level);
        }
        summary
    }

    pub fn record(&mut self, level: Level) {
        match level {
            Level::High => self.high += 1,
            Level::Mid => self.mid += 1,
            Level::Low => self.low += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, level: Level) -> usize {
        match level {
            Level::High => self.high,
            Level::Mid => self.mid,
            Level::Low => self.low,
        }
    }

    /// Share of `level` in percent; `None` for an empty batch.
    pub fn percentage(&self, level: Level) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.count(level) as f64 / self.total as f64 * 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_add_up_to_total() {
        let summary = AggregateSummary::from_levels([Level::High, Level::Low, Level::High]);
        assert_eq!(summary.count(Level::High), 2);
        assert_eq!(summary.count(Level::Mid), 0);
        assert_eq!(summary.count(Level::Low), 1);
        assert_eq!(summary.high + summary.mid + summary.low, summary.total);
    }

    #[test]
    fn empty_summary_has_no_percentages() {
        let summary = AggregateSummary::default();
        assert_eq!(summary.percentage(Level::High), None);
    }
}

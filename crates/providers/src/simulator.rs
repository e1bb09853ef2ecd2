//! Synthetic classifications for running without the remote service.

use crate::{AudioFile, ClassificationProvider, Probabilities, ProviderError, RawResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Upper bound (exclusive) of the `High` draw.
pub const HIGH_CEILING: f64 = 0.6;
/// `High + Mid` stays below this bound.
pub const MID_CEILING: f64 = 0.8;

pub struct Simulator {
    rng: Mutex<StdRng>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// One independent synthetic result per file, labelled with the
    /// canonical `High`/`Mid`/`Low` keys.
    pub fn generate(&self, files: &[AudioFile]) -> Vec<RawResult> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        files.iter().map(|f| sample(&mut *rng, &f.name)).collect()
    }
}

#[async_trait::async_trait]
impl ClassificationProvider for Simulator {
    async fn classify(&self, files: &[AudioFile]) -> Result<Vec<RawResult>, ProviderError> {
        Ok(self.generate(files))
    }
}

pub fn sample<R: Rng + ?Sized>(rng: &mut R, file_name: &str) -> RawResult {
    let high = rng.gen_range(0.0..HIGH_CEILING);
    let mid = rng.gen_range(0.0..MID_CEILING - high);
    // Always above 0.2 for in-range draws; the clamp only guards rounding.
    let low = (1.0 - high - mid).max(0.0);

    let mut probabilities = Probabilities::new();
    probabilities.insert("High", high);
    probabilities.insert("Mid", mid);
    probabilities.insert("Low", low);

    RawResult {
        file_name: file_name.to_string(),
        predicted_class: predicted_class(high, mid, low).to_string(),
        probabilities,
    }
}

/// Argmax over the three classes; ties resolve High, then Mid, then Low.
pub fn predicted_class(high: f64, mid: f64, low: f64) -> &'static str {
    if high >= mid && high >= low {
        "High"
    } else if mid >= low {
        "Mid"
    } else {
        "Low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range_and_pick_the_maximum() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..5_000 {
            let r = sample(&mut rng, &format!("{i}.wav"));
            let high = r.probabilities.get("High").unwrap();
            let mid = r.probabilities.get("Mid").unwrap();
            let low = r.probabilities.get("Low").unwrap();

            assert!((0.0..HIGH_CEILING).contains(&high), "high {high}");
            assert!(mid >= 0.0 && mid < MID_CEILING - high, "mid {mid}");
            assert!((low - (1.0 - high - mid)).abs() < 1e-12);
            assert!(low >= 0.0);
            assert_eq!(r.predicted_class, predicted_class(high, mid, low));

            let max = high.max(mid).max(low);
            let expected = r.probabilities.get(&r.predicted_class).unwrap();
            assert_eq!(expected, max);
        }
    }

    #[test]
    fn ties_prefer_high_then_mid() {
        assert_eq!(predicted_class(0.4, 0.4, 0.2), "High");
        assert_eq!(predicted_class(0.3, 0.3, 0.3), "High");
        assert_eq!(predicted_class(0.2, 0.4, 0.4), "Mid");
        assert_eq!(predicted_class(0.1, 0.2, 0.7), "Low");
    }

    #[test]
    fn generate_yields_one_result_per_file_in_order() {
        let sim = Simulator::seeded(42);
        let files = vec![
            AudioFile::new("a.wav", Vec::new()),
            AudioFile::new("b.wav", Vec::new()),
        ];
        let results = sim.generate(&files);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_name, "a.wav");
        assert_eq!(results[1].file_name, "b.wav");
        let keys: Vec<&str> = results[0].probabilities.keys().collect();
        assert_eq!(keys, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn same_seed_same_output() {
        let files = vec![AudioFile::new("a.wav", Vec::new())];
        assert_eq!(
            Simulator::seeded(3).generate(&files),
            Simulator::seeded(3).generate(&files)
        );
    }
}

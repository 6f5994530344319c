//! Seed parsing and the held-out sample draw

use crate::error::{ExplainerError, Result};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Rows held out for prediction on every run
pub const SAMPLE_SIZE: usize = 5;

/// Parse the seed field.
///
/// Surrounding whitespace and a leading `+` are accepted. Anything that is not a
/// non-negative integer is a configuration error.
pub fn parse_seed(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    match trimmed.parse::<i128>() {
        Ok(v) if v < 0 => Err(ExplainerError::ConfigurationError(format!(
            "seed must be non-negative, got {}",
            v
        ))),
        Ok(v) => u64::try_from(v).map_err(|_| {
            ExplainerError::ConfigurationError(format!("seed {} does not fit in 64 bits", v))
        }),
        Err(_) => Err(ExplainerError::ConfigurationError(format!(
            "seed `{}` is not an integer",
            trimmed
        ))),
    }
}

/// Row indices of the held-out sample and the remaining training rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSplit {
    /// Held-out rows, in draw order
    pub sample: Vec<usize>,
    /// Every other row, ascending
    pub training: Vec<usize>,
}

impl SampleSplit {
    /// Draw `SAMPLE_SIZE` distinct rows out of `n_rows` using `seed`.
    pub fn draw(n_rows: usize, seed: u64) -> Result<Self> {
        Self::draw_n(n_rows, SAMPLE_SIZE, seed)
    }

    /// Draw `amount` distinct rows out of `n_rows` using `seed`.
    pub fn draw_n(n_rows: usize, amount: usize, seed: u64) -> Result<Self> {
        if n_rows < amount {
            return Err(ExplainerError::DataUnavailable(format!(
                "need at least {} rows to sample, dataset has {}",
                amount, n_rows
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sample = index::sample(&mut rng, n_rows, amount).into_vec();

        let mut held_out = vec![false; n_rows];
        for &i in &sample {
            held_out[i] = true;
        }
        let training = (0..n_rows).filter(|&i| !held_out[i]).collect();

        Ok(Self { sample, training })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("1").unwrap(), 1);
        assert_eq!(parse_seed(" 42 ").unwrap(), 42);
        assert_eq!(parse_seed("+7").unwrap(), 7);
        assert!(matches!(parse_seed("abc"), Err(ExplainerError::ConfigurationError(_))));
        assert!(matches!(parse_seed("1.5"), Err(ExplainerError::ConfigurationError(_))));
        assert!(matches!(parse_seed(""), Err(ExplainerError::ConfigurationError(_))));
        assert!(matches!(parse_seed("-3"), Err(ExplainerError::ConfigurationError(_))));
    }

    #[test]
    fn test_draw_size_and_disjointness() {
        let split = SampleSplit::draw(442, 1).unwrap();
        assert_eq!(split.sample.len(), SAMPLE_SIZE);
        assert_eq!(split.training.len(), 442 - SAMPLE_SIZE);

        for i in &split.sample {
            assert!(!split.training.contains(i));
        }

        let mut all: Vec<usize> = split.sample.iter().chain(&split.training).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..442).collect::<Vec<_>>());
    }

    #[test]
    fn test_draw_is_deterministic() {
        assert_eq!(SampleSplit::draw(100, 9).unwrap(), SampleSplit::draw(100, 9).unwrap());
        assert_ne!(SampleSplit::draw(100, 9).unwrap(), SampleSplit::draw(100, 10).unwrap());
    }

    #[test]
    fn test_draw_exact_size_dataset() {
        let split = SampleSplit::draw(5, 3).unwrap();
        assert_eq!(split.sample.len(), 5);
        assert!(split.training.is_empty());
    }

    #[test]
    fn test_draw_too_few_rows() {
        let err = SampleSplit::draw(4, 1).unwrap_err();
        assert!(matches!(err, ExplainerError::DataUnavailable(_)));
    }
}

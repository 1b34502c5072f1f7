use lazy_static::lazy_static;
use snafu::ensure;

use crate::util::{EmptyCorpusSnafu, EmptyInputSnafu, Result};

static ENGLISH_CORPUS: &[u8] = include_bytes!("../data/english.txt");

lazy_static! {
    /// Byte frequencies of a few pages of plain English prose.
    // The corpus is embedded at build time and non-empty, so the fallback
    // is unreachable; `test_english_corpus_loaded` guards it.
    pub static ref ENGLISH: ScoringTable = ScoringTable::from_corpus(ENGLISH_CORPUS)
        .unwrap_or_else(|_| ScoringTable::empty());
}

/// Probability of each byte value in a reference corpus.
///
/// Scoring a buffer averages the probabilities of its bytes, so text that
/// looks like the corpus scores high and noise scores close to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringTable {
    weights: [f64; 256],
}

impl ScoringTable {
    fn empty() -> Self {
        Self { weights: [0f64; 256] }
    }

    pub fn from_corpus(corpus: &[u8]) -> Result<Self> {
        ensure!(!corpus.is_empty(), EmptyCorpusSnafu);

        let mut counts = [0usize; 256];
        corpus.iter()
            .for_each(|&b| counts[b as usize] += 1 );

        let n = corpus.len() as f64;
        let mut table = Self::empty();
        for (weight, count) in table.weights.iter_mut().zip(counts) {
            *weight = (count as f64) / n;
        }
        Ok(table)
    }

    pub fn get(&self, b: u8) -> f64 {
        self.weights[b as usize]
    }

    pub fn score(&self, buf: &[u8]) -> Result<f64> {
        ensure!(!buf.is_empty(), EmptyInputSnafu);
        let total: f64 = buf.iter()
            .map(|&b| self.get(b) )
            .sum();
        Ok(total / (buf.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Error;

    #[test]
    fn test_from_corpus() {
        let table = ScoringTable::from_corpus(b"aab ").unwrap();
        assert_eq!(0.5, table.get(b'a'));
        assert_eq!(0.25, table.get(b'b'));
        assert_eq!(0.25, table.get(b' '));
        assert_eq!(0.0, table.get(b'z'));
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = (0..=u8::MAX).map(|b| ENGLISH.get(b) ).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_english_corpus_loaded() {
        assert!(!ENGLISH_CORPUS.is_empty());
        assert_eq!(ScoringTable::from_corpus(ENGLISH_CORPUS).unwrap(), *ENGLISH);
        assert_ne!(ScoringTable::empty(), *ENGLISH);
        assert!(ENGLISH.get(b'e') > 0f64);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(ScoringTable::from_corpus(b""), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_score() {
        let table = ScoringTable::from_corpus(b"aab ").unwrap();
        assert_eq!(0.375, table.score(b"ab").unwrap());
        assert_eq!(0.0, table.score(b"xyz").unwrap());
        assert!(matches!(table.score(b""), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_english_prefers_text() {
        let text = ENGLISH.score(b"the quick brown fox jumps over the lazy dog").unwrap();
        let noise = ENGLISH.score(&[0x00, 0x9f, 0xfe, 0x13, 0x80, 0x7f]).unwrap();
        assert!(text > noise);
        assert_eq!(0.0, noise);
    }
}

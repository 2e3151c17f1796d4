// File: src/core/ngram.rs
use crate::error::{DecypherError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// The pipeline scores text by quadgrams.
pub const QUADGRAM: usize = 4;

/// Pseudo-count assigned to n-grams the tally never saw.
const MISSING_PSEUDO_COUNT: f64 = 0.01;

/// Log-probability table over fixed-length letter sequences.
///
/// Every observed n-gram scores `log10(count / total)` against the same
/// total, so scores of different texts add up and compare directly. Unseen
/// n-grams score `log10(0.01 / total)`.
#[derive(Clone, Serialize, Deserialize)]
pub struct NGramModel {
    n: usize,
    total: u64,
    scores: HashMap<Vec<u8>, f64>,
    missing_penalty: f64,
}

impl NGramModel {
    /// Builds the model from raw counts. Repeated n-grams accumulate; a sum
    /// that no longer fits in a `u64` is reported against the record (1-based)
    /// that pushed it over.
    pub fn from_counts<I, S>(n: usize, counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let records = counts.into_iter().enumerate().map(|(idx, (ngram, count))| (idx + 1, ngram, count));
        Self::from_records(n, records)
    }

    fn from_records<I, S>(n: usize, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, S, u64)>,
        S: AsRef<str>,
    {
        let mut tally: HashMap<Vec<u8>, u64> = HashMap::new();
        let mut total = 0u64;
        for (line, ngram, count) in records {
            let overflow = || DecypherError::MalformedTally {
                line,
                reason: format!("count {} overflows the tally total", count),
            };
            let key = ngram.as_ref().to_ascii_uppercase().into_bytes();
            let slot = tally.entry(key).or_insert(0);
            *slot = slot.checked_add(count).ok_or_else(overflow)?;
            total = total.checked_add(count).ok_or_else(overflow)?;
        }
        if total == 0 {
            return Err(DecypherError::EmptyTally);
        }

        let dsum = total as f64;
        let scores = tally
            .into_iter()
            .map(|(ngram, count)| (ngram, (count as f64 / dsum).log10()))
            .collect();

        Ok(Self {
            n,
            total,
            scores,
            missing_penalty: (MISSING_PSEUDO_COUNT / dsum).log10(),
        })
    }

    /// Parses `<ngram> <count>` records, one per line. Blank lines are
    /// ignored.
    pub fn from_reader<R: BufRead>(n: usize, reader: R) -> Result<Self> {
        let mut counts = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| DecypherError::MalformedTally {
                line: line_no,
                reason: e.to_string(),
            })?;
            let mut fields = line.split_whitespace();
            let Some(ngram) = fields.next() else {
                continue;
            };
            let count = fields.next().ok_or_else(|| DecypherError::MalformedTally {
                line: line_no,
                reason: format!("missing count for '{}'", ngram),
            })?;
            let count: u64 = count.parse().map_err(|_| DecypherError::MalformedTally {
                line: line_no,
                reason: format!("'{}' is not a count", count),
            })?;
            counts.push((line_no, ngram.to_string(), count));
        }
        Self::from_records(n, counts)
    }

    /// Loads a tally file.
    pub fn load(n: usize, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DecypherError::read(path, e))?;
        let model = Self::from_reader(n, BufReader::new(file))?;
        info!(
            path = %path.display(),
            ngrams = model.scores.len(),
            total = model.total,
            "frequency model loaded"
        );
        Ok(model)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Sum of every count in the tally.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn missing_penalty(&self) -> f64 {
        self.missing_penalty
    }

    /// Number of distinct n-grams observed.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    #[inline]
    pub fn log_prob(&self, ngram: &[u8]) -> f64 {
        self.scores.get(ngram).copied().unwrap_or(self.missing_penalty)
    }

    /// Total log-probability of a sequence of n-grams. Empty input scores 0.
    pub fn score<S: AsRef<[u8]>>(&self, ngrams: &[S]) -> f64 {
        ngrams.iter().map(|ngram| self.log_prob(ngram.as_ref())).sum()
    }
}

/// Every contiguous length-`n` substring of every word, in order and with
/// repeats. Words shorter than `n` contribute nothing.
pub fn extract_ngrams(words: &[String], n: usize) -> Vec<String> {
    let mut ngrams = Vec::new();
    if n == 0 {
        return ngrams;
    }
    for word in words {
        let chars: Vec<char> = word.chars().collect();
        for window in chars.windows(n) {
            ngrams.push(window.iter().collect());
        }
    }
    ngrams
}

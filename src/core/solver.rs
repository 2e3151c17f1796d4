// File: src/core/solver.rs
use crate::core::key::{Key, ALPHABET_LEN};
use crate::core::ngram::NGramModel;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Number of unordered position pairs in a key: 26 * 25 / 2.
pub const NEIGHBOURS_PER_ROUND: usize = ALPHABET_LEN * (ALPHABET_LEN - 1) / 2;

/// Every swap `(i, j)` with `i < j`, in lexicographic order. Ties between
/// equally good neighbours are broken by this order.
pub fn swap_pairs() -> impl Iterator<Item = (usize, usize)> {
    (0..ALPHABET_LEN).flat_map(|i| (i + 1..ALPHABET_LEN).map(move |j| (i, j)))
}

/// Result of a climb.
#[derive(Debug, Clone, Serialize)]
pub struct ClimbOutcome {
    pub key: Key,
    pub score: f64,
    /// Fitness of the identity key, where every climb starts.
    pub baseline: f64,
    /// Best score after each accepted round.
    pub history: Vec<f64>,
}

impl ClimbOutcome {
    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    /// True when no single swap from the identity improved the score.
    pub fn is_unchanged(&self) -> bool {
        self.history.is_empty()
    }
}

/// Steepest-ascent search over keys, scored by an n-gram model.
///
/// Each round tries all 325 swaps of the current key and moves to the best
/// one if it beats the current score. The score is a finite sum that rises
/// every accepted round, so the climb always stops.
pub struct HillClimber<'m> {
    model: &'m NGramModel,
    parallel: bool,
}

impl<'m> HillClimber<'m> {
    pub fn new(model: &'m NGramModel) -> Self {
        Self { model, parallel: false }
    }

    /// Scores the neighbours of a round on the rayon pool. Results match the
    /// sequential climb exactly.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Score of `ngrams` after substituting them through `key`.
    pub fn fitness<S: AsRef<[u8]>>(&self, key: &Key, ngrams: &[S]) -> f64 {
        let mut buf = Vec::with_capacity(self.model.n());
        let mut total = 0.0;
        for ngram in ngrams {
            buf.clear();
            buf.extend(ngram.as_ref().iter().map(|&b| key.apply_byte(b)));
            total += self.model.log_prob(&buf);
        }
        total
    }

    pub fn climb<S: AsRef<[u8]> + Sync>(&self, ngrams: &[S]) -> ClimbOutcome {
        let mut best_key = Key::identity();
        let baseline = self.fitness(&best_key, ngrams);
        let mut best_score = baseline;
        let mut history = Vec::new();

        loop {
            let scores = self.score_neighbours(&best_key, ngrams);

            let mut round_best: Option<(usize, f64)> = None;
            for (idx, &fitness) in scores.iter().enumerate() {
                let threshold = round_best.map_or(best_score, |(_, s)| s);
                if fitness > threshold {
                    round_best = Some((idx, fitness));
                }
            }

            let Some((idx, fitness)) = round_best else {
                break;
            };
            let (i, j) = pair_at(idx);
            best_key.swap(i, j);
            best_score = fitness;
            history.push(fitness);
            debug!(round = history.len(), i, j, score = fitness, "accepted swap");
        }

        debug!(rounds = history.len(), score = best_score, key = %best_key, "hill climb converged");
        ClimbOutcome { key: best_key, score: best_score, baseline, history }
    }

    fn score_neighbours<S: AsRef<[u8]> + Sync>(&self, key: &Key, ngrams: &[S]) -> Vec<f64> {
        let neighbour = |(i, j): (usize, usize)| {
            let mut candidate = *key;
            candidate.swap(i, j);
            self.fitness(&candidate, ngrams)
        };
        if self.parallel {
            let pairs: Vec<(usize, usize)> = swap_pairs().collect();
            pairs.into_par_iter().map(neighbour).collect()
        } else {
            swap_pairs().map(neighbour).collect()
        }
    }
}

/// The `idx`-th pair produced by `swap_pairs`.
fn pair_at(idx: usize) -> (usize, usize) {
    let mut remaining = idx;
    for i in 0..ALPHABET_LEN {
        let row = ALPHABET_LEN - 1 - i;
        if remaining < row {
            return (i, i + 1 + remaining);
        }
        remaining -= row;
    }
    unreachable!("pair index {} out of range", idx)
}

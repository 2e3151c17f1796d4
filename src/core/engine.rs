use crate::config::Config;
use crate::core::key::Key;
use crate::core::ngram::{extract_ngrams, NGramModel, QUADGRAM};
use crate::core::pattern::WordPattern;
use crate::core::solver::{ClimbOutcome, HillClimber};
use crate::core::text::cipher_words;
use crate::core::trie::PatternIndex;
use crate::core::types::{Analysis, CrossCheck, Notice, WordMatch};
use crate::error::{DecypherError, Result};
use crate::persistence::{load_snapshot, save_snapshot, SnapshotSources};
use tracing::{debug, info, warn};

// The engine owns the read-only resources of a run and applies the
// two-stage pipeline to each ciphertext.
pub struct Decypher {
    pub index: PatternIndex,
    pub model: NGramModel,
    parallel: bool,
}

impl Decypher {
    pub fn new(index: PatternIndex, model: NGramModel) -> Self {
        Self { index, model, parallel: false }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Loads the dictionary and tally named by `config`, going through the
    /// snapshot cache when one is configured. A snapshot is only used when it
    /// was built from the same source files as they are now; otherwise it is
    /// rebuilt. Fails before any ciphertext is touched if either source is
    /// unreadable or the tally is too small.
    pub fn load(config: &Config) -> Result<Self> {
        let sources = SnapshotSources::of(&config.tally, &config.dictionary);

        if let Some(snapshot) = &config.snapshot {
            if snapshot.exists() {
                match load_snapshot(snapshot) {
                    Ok((recorded, index, model)) if recorded.matches(&sources) => {
                        config.validate_tally(model.total())?;
                        info!(path = %snapshot.display(), "resources restored from snapshot");
                        return Ok(Self::new(index, model).with_parallel(config.parallel));
                    }
                    Ok(_) => info!(path = %snapshot.display(), "snapshot built from other sources, rebuilding"),
                    Err(e) => warn!(path = %snapshot.display(), error = %e, "ignoring unreadable snapshot"),
                }
            }
        }

        let model = NGramModel::load(QUADGRAM, &config.tally)?;
        config.validate_tally(model.total())?;
        let index = PatternIndex::load(&config.dictionary)?;

        if let Some(snapshot) = &config.snapshot {
            if let Err(e) = save_snapshot(snapshot, &sources, &index, &model) {
                warn!(path = %snapshot.display(), error = %e, "could not refresh snapshot");
            }
        }

        Ok(Self::new(index, model).with_parallel(config.parallel))
    }

    /// Stage one. Walks the words in order; whenever a word's pattern has a
    /// single dictionary match that differs from the word, the swap fragment
    /// that turns one into the other is folded into the running key and all
    /// words are rewritten before the next lookup.
    pub fn cross_check(&self, words: &[String]) -> CrossCheck {
        let mut key = Key::identity();
        let mut current = words.to_vec();
        let mut matches = Vec::new();

        for position in 0..current.len() {
            let pattern = WordPattern::encode(&current[position]);
            let Some(candidate) = self.index.lookup(&pattern) else {
                continue;
            };
            if candidate == current[position] {
                continue;
            }

            let fragment = Key::fragment(&current[position], candidate);
            key = key.compose(&fragment);
            current = fragment.apply_to_words(&current);
            debug!(position, cipher = %words[position], plain = candidate, "unique dictionary match");

            matches.push(WordMatch {
                position,
                cipher: words[position].clone(),
                plain: candidate.to_string(),
            });
        }

        CrossCheck { key, matches, words: current }
    }

    /// Stage two: hill-climb over the quadgrams of already cross-checked
    /// words.
    pub fn refine(&self, words: &[String]) -> ClimbOutcome {
        let ngrams = extract_ngrams(words, self.model.n());
        HillClimber::new(&self.model).with_parallel(self.parallel).climb(&ngrams)
    }

    /// Runs both stages on `ciphertext` and decrypts it with the combined key.
    pub fn analyze(&self, ciphertext: &str) -> Result<Analysis> {
        let words = cipher_words(ciphertext);
        if words.is_empty() {
            return Err(DecypherError::NoCipherWords);
        }

        let cross_check = self.cross_check(&words);
        let refinement = self.refine(&cross_check.words);

        let mut notices = Vec::new();
        if cross_check.key.is_identity() {
            notices.push(Notice::NoDictionaryMatches);
        }
        if refinement.key.is_identity() {
            notices.push(Notice::NoHillClimbImprovement);
        }

        let key = cross_check.key.compose(&refinement.key);
        let plaintext = key.apply_preserving(ciphertext);
        info!(
            words = words.len(),
            matches = cross_check.matches.len(),
            rounds = refinement.rounds(),
            %key,
            "ciphertext analyzed"
        );

        Ok(Analysis { key, cross_check, refinement, notices, plaintext })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(dictionary: &[&str]) -> Decypher {
        let index = PatternIndex::build(dictionary.iter().copied());
        let model = NGramModel::from_counts(QUADGRAM, [("TEST", 100), ("ABCD", 1)]).unwrap();
        Decypher::new(index, model)
    }

    fn words(text: &str) -> Vec<String> {
        cipher_words(text)
    }

    #[test]
    fn ambiguous_dictionary_gives_no_fragment() {
        let engine = engine(&["CAT", "DOG"]);
        let result = engine.cross_check(&words("XYZ"));
        assert!(result.key.is_identity());
        assert!(result.matches.is_empty());
    }

    #[test]
    fn unique_pattern_produces_fragment() {
        let engine = engine(&["PUPPY"]);
        let result = engine.cross_check(&words("xaxxb"));
        assert_eq!(result.key.get(b'X' as usize - 65), b'P');
        assert_eq!(result.key.get(b'A' as usize - 65), b'U');
        assert_eq!(result.key.get(b'B' as usize - 65), b'Y');
        assert_eq!(result.words, vec!["PUPPY"]);
        assert_eq!(
            result.matches,
            vec![WordMatch { position: 0, cipher: "XAXXB".into(), plain: "PUPPY".into() }]
        );
    }

    #[test]
    fn word_already_matching_is_left_alone() {
        let engine = engine(&["PUPPY"]);
        let result = engine.cross_check(&words("PUPPY"));
        assert!(result.key.is_identity());
        assert!(result.matches.is_empty());
    }

    #[test]
    fn later_lookups_see_earlier_matches() {
        // The QUICK fragment swaps C/I and then D/C, so the first word comes
        // out as QUDIK and ECDEF as KDIKF. KDIKF still has the KICKS shape,
        // and its fragment also repairs the first word.
        let engine = engine(&["QUICK", "KICKS"]);
        let result = engine.cross_check(&words("ABCDE ECDEF"));
        assert_eq!(result.words[0], "QUICK");
        assert_eq!(result.words[1], "KICKS");
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.key.apply_to_word("ABCDE ECDEF"), "QUICK KICKS");
    }

    #[test]
    fn crossing_letters_cancel_to_identity() {
        let engine = engine(&["BA"]);
        let result = engine.cross_check(&words("AB"));
        assert!(result.key.is_identity());
        assert_eq!(result.words, vec!["AB"]);

        let analysis = engine.analyze("AB").unwrap();
        assert!(analysis.notices.contains(&Notice::NoDictionaryMatches));
    }

    #[test]
    fn analyze_layers_refinement_on_cross_check() {
        let engine = engine(&["PUPPY"]);
        let analysis = engine.analyze("xaxxb trst.").unwrap();

        assert_eq!(analysis.cross_check.words, vec!["PUPPY", "TRST"]);
        let mut expected_refinement = Key::identity();
        expected_refinement.swap(4, 17);
        assert_eq!(analysis.refinement.key, expected_refinement);
        assert_eq!(analysis.key, analysis.cross_check.key.compose(&analysis.refinement.key));
        assert_eq!(analysis.plaintext, "puppy test.");
        assert!(analysis.notices.is_empty());
    }

    #[test]
    fn notices_when_nothing_changes() {
        let engine = engine(&["CAT", "DOG"]);
        let analysis = engine.analyze("TEST").unwrap();
        assert!(analysis.key.is_identity());
        assert_eq!(
            analysis.notices,
            vec![Notice::NoDictionaryMatches, Notice::NoHillClimbImprovement]
        );
        assert_eq!(analysis.plaintext, "TEST");
    }

    #[test]
    fn text_without_letters_is_rejected() {
        let engine = engine(&["PUPPY"]);
        assert!(matches!(engine.analyze("12 -- !"), Err(DecypherError::NoCipherWords)));
    }
}

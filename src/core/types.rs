// src/core/types.rs
use crate::core::key::Key;
use crate::core::solver::ClimbOutcome;
use serde::Serialize;
use std::fmt;

/// A cipher word that matched exactly one dictionary word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordMatch {
    /// Position of the word in the ciphertext.
    pub position: usize,
    /// The word as it appeared in the ciphertext.
    pub cipher: String,
    /// The dictionary word it was matched to.
    pub plain: String,
}

/// Output of the dictionary cross-check stage.
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheck {
    pub key: Key,
    pub matches: Vec<WordMatch>,
    /// The cipher words rewritten under `key`.
    #[serde(skip)]
    pub words: Vec<String>,
}

/// Informational results. Neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoDictionaryMatches,
    NoHillClimbImprovement,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoDictionaryMatches => write!(f, "dictionary found no pattern matches"),
            Notice::NoHillClimbImprovement => write!(f, "hill climbing algorithm did nothing"),
        }
    }
}

/// Everything the pipeline produced for one ciphertext.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Cross-check key with the refinement key layered on top.
    pub key: Key,
    pub cross_check: CrossCheck,
    pub refinement: ClimbOutcome,
    pub notices: Vec<Notice>,
    /// The ciphertext decrypted under `key`, case preserved.
    #[serde(skip)]
    pub plaintext: String,
}

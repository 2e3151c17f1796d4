// File: src/core/pattern.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One pattern digit. Digits start at 1 and count distinct characters in
/// order of first appearance.
pub type PatternDigit = u32;

/// The repeated-letter structure of a word: "HELLO" -> 1.2.3.3.4.
/// Two words share a pattern iff they have the same length and the same
/// positions of repeated letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WordPattern(Vec<PatternDigit>);

impl WordPattern {
    /// Encodes `word` character by character. Each call builds its own rank
    /// table, so results never depend on earlier calls.
    pub fn encode(word: &str) -> Self {
        let mut ranks: HashMap<char, PatternDigit> = HashMap::new();
        let mut digits = Vec::with_capacity(word.len());
        for c in word.chars() {
            let next = ranks.len() as PatternDigit + 1;
            digits.push(*ranks.entry(c).or_insert(next));
        }
        WordPattern(digits)
    }

    pub fn digits(&self) -> &[PatternDigit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct characters in the encoded word.
    pub fn distinct(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0) as usize
    }
}

impl From<Vec<PatternDigit>> for WordPattern {
    fn from(digits: Vec<PatternDigit>) -> Self {
        WordPattern(digits)
    }
}

impl fmt::Display for WordPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, digit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

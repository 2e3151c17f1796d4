// --- File: src/core/trie.rs
use crate::core::pattern::{PatternDigit, WordPattern};
use crate::error::{DecypherError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

// --- PatternNode: one arena slot per pattern digit on a path ---

#[derive(Clone, Serialize, Deserialize)]
struct PatternNode {
    children: HashMap<PatternDigit, usize>,
    /// How many dictionary entries ended at this node.
    count: usize,
    /// The first entry that ended here. Cleared for good on the second one.
    word: Option<String>,
}

impl PatternNode {
    fn new() -> Self {
        Self { children: HashMap::new(), count: 0, word: None }
    }
}

/// Dictionary index keyed by word pattern. Answers one question: is there
/// exactly one dictionary word with this shape, and which is it?
///
/// Nodes live in a flat arena and parents refer to children by index, so
/// traversal is always root to leaf and no node points back up.
#[derive(Clone, Serialize, Deserialize)]
pub struct PatternIndex {
    nodes: Vec<PatternNode>,
    entries: usize,
}

impl PatternIndex {
    pub fn new() -> Self {
        Self { nodes: vec![PatternNode::new()], entries: 0 }
    }

    /// Builds an index from dictionary lines. Blank lines and surrounding
    /// whitespace (trailing carriage returns included) are ignored and words
    /// are upper-cased. Entries with punctuation such as `don't` are indexed
    /// under their full shape, so they can make a pattern ambiguous.
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        let mut blank = 0usize;
        for line in lines {
            let word = line.as_ref().trim();
            if word.is_empty() {
                blank += 1;
                continue;
            }
            let word = word.to_ascii_uppercase();
            index.insert(&WordPattern::encode(&word), &word);
        }
        debug!(entries = index.entries, blank, "dictionary lines indexed");
        index
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        Ok(Self::build(lines))
    }

    /// Reads a one-word-per-line dictionary file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DecypherError::read(path, e))?;
        let index = Self::from_reader(BufReader::new(file)).map_err(|e| DecypherError::read(path, e))?;
        info!(
            path = %path.display(),
            entries = index.entries,
            nodes = index.nodes.len(),
            "dictionary index built"
        );
        Ok(index)
    }

    /// Records `word` under `pattern`. O(k) where k is the pattern length.
    pub fn insert(&mut self, pattern: &WordPattern, word: &str) {
        let mut node_idx = 0;
        for &digit in pattern.digits() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&digit) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(PatternNode::new());
                self.nodes[node_idx].children.insert(digit, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }

        let node = &mut self.nodes[node_idx];
        if node.count == 0 {
            node.word = Some(word.to_string());
        } else {
            node.word = None;
        }
        node.count += 1;
        self.entries += 1;
    }

    /// The single dictionary word with this pattern. Returns `None` both when
    /// no word has the shape and when several do.
    pub fn lookup(&self, pattern: &WordPattern) -> Option<&str> {
        let mut node_idx = 0;
        for digit in pattern.digits() {
            node_idx = *self.nodes[node_idx].children.get(digit)?;
        }
        let node = &self.nodes[node_idx];
        if node.count == 1 {
            node.word.as_deref()
        } else {
            None
        }
    }

    /// Number of entries ever inserted, duplicates included.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for PatternIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(word: &str) -> WordPattern {
        WordPattern::encode(word)
    }

    #[test]
    fn single_word_round_trips() {
        let mut index = PatternIndex::new();
        index.insert(&pattern("PUPPY"), "PUPPY");
        assert_eq!(index.lookup(&pattern("PUPPY")), Some("PUPPY"));
        assert_eq!(index.lookup(&pattern("XAXXB")), Some("PUPPY"));
    }

    #[test]
    fn shared_pattern_is_ambiguous_forever() {
        let mut index = PatternIndex::new();
        index.insert(&pattern("CAT"), "CAT");
        index.insert(&pattern("DOG"), "DOG");
        assert_eq!(index.lookup(&pattern("XYZ")), None);

        index.insert(&pattern("EMU"), "EMU");
        assert_eq!(index.lookup(&pattern("XYZ")), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn duplicate_entry_counts_as_ambiguous() {
        let index = PatternIndex::build(["cat", "CAT"]);
        assert_eq!(index.lookup(&pattern("CAT")), None);
    }

    #[test]
    fn missing_paths_and_prefixes_yield_nothing() {
        let mut index = PatternIndex::new();
        index.insert(&pattern("HELLO"), "HELLO");
        assert_eq!(index.lookup(&pattern("ABCDE")), None);
        // 1.2.3 is a prefix of 1.2.3.3.4 but nothing ends there.
        assert_eq!(index.lookup(&pattern("ABC")), None);
        assert_eq!(index.lookup(&pattern("")), None);
        assert_eq!(index.lookup(&pattern("ABCCDE")), None);
    }

    #[test]
    fn build_skips_blank_lines_and_carriage_returns() {
        let index = PatternIndex::build(["puppy\r", "", "   ", "hello\r", "don't"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(&pattern("PUPPY")), Some("PUPPY"));
        assert_eq!(index.lookup(&pattern("HELLO")), Some("HELLO"));
        assert_eq!(index.lookup(&pattern("DON'T")), Some("DON'T"));
    }

    #[test]
    fn entries_with_punctuation_share_letter_shapes() {
        let index = PatternIndex::build(["don't", "quick"]);
        assert_eq!(index.len(), 2);
        assert_eq!(pattern("DON'T").to_string(), "1.2.3.4.5");
        assert_eq!(index.lookup(&pattern("ABCDE")), None);
    }

    #[test]
    fn from_reader_reads_lines() {
        let data = "mummy\r\npuppy\r\n\r\nquick\n";
        let index = PatternIndex::from_reader(data.as_bytes()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup(&pattern("PUPPY")), None);
        assert_eq!(index.lookup(&pattern("QUICK")), Some("QUICK"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PatternIndex::load(Path::new("/definitely/not/here.txt")).err().unwrap();
        assert!(matches!(err, DecypherError::Read { .. }));
    }
}

// File: src/core/key.rs
use crate::error::DecypherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const ALPHABET_LEN: usize = 26;

/// A substitution key: position `i` holds the uppercase plaintext letter that
/// cipher letter `i` decrypts to. Always a permutation of `A..=Z`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Key([u8; ALPHABET_LEN]);

/// Index of an ASCII letter in the alphabet, ignoring case.
#[inline]
pub fn letter_index(c: u8) -> Option<usize> {
    if c.is_ascii_alphabetic() {
        Some((c.to_ascii_uppercase() - b'A') as usize)
    } else {
        None
    }
}

impl Key {
    pub fn identity() -> Self {
        Key(*ALPHABET)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == *ALPHABET
    }

    /// Plaintext letter (uppercase) for the cipher letter at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn as_bytes(&self) -> &[u8; ALPHABET_LEN] {
        &self.0
    }

    /// Swaps two positions. A swap of a permutation is still a permutation.
    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Substitutes one byte, always producing uppercase. Non-letters pass
    /// through unchanged.
    #[inline]
    pub fn apply_byte(&self, c: u8) -> u8 {
        match letter_index(c) {
            Some(idx) => self.0[idx],
            None => c,
        }
    }

    /// Substitutes one character, keeping its case.
    #[inline]
    pub fn apply_char_preserving(&self, c: char) -> char {
        if c.is_ascii_lowercase() {
            self.0[(c as u8 - b'a') as usize].to_ascii_lowercase() as char
        } else if c.is_ascii_uppercase() {
            self.0[(c as u8 - b'A') as usize] as char
        } else {
            c
        }
    }

    /// Case-insensitive application, used for pattern and n-gram work.
    pub fn apply_to_word(&self, word: &str) -> String {
        word.chars()
            .map(|c| if c.is_ascii() { self.apply_byte(c as u8) as char } else { c })
            .collect()
    }

    pub fn apply_to_words(&self, words: &[String]) -> Vec<String> {
        words.iter().map(|word| self.apply_to_word(word)).collect()
    }

    /// Case-preserving application, used to render readable plaintext.
    pub fn apply_preserving(&self, text: &str) -> String {
        text.chars().map(|c| self.apply_char_preserving(c)).collect()
    }

    /// Layers `layer` on top of this key: every output letter of `self` is
    /// rewritten through `layer`, so `result[i] == layer[self[i]]`.
    pub fn compose(&self, layer: &Key) -> Key {
        let mut out = [0u8; ALPHABET_LEN];
        for (slot, &letter) in out.iter_mut().zip(self.0.iter()) {
            *slot = layer.apply_byte(letter);
        }
        Key(out)
    }

    /// The key mapping plaintext letters back to cipher letters.
    pub fn inverse(&self) -> Key {
        let mut out = [0u8; ALPHABET_LEN];
        for (cipher, &plain) in self.0.iter().enumerate() {
            out[(plain - b'A') as usize] = ALPHABET[cipher];
        }
        Key(out)
    }

    /// Builds the key fragment for a dictionary match: starting from the
    /// identity, swap the entries of each cipher letter and its matched
    /// letter, position by position. Pairs where either side is not a letter
    /// are skipped.
    ///
    /// A letter that repeats swaps back and forth, so only letters seen an
    /// odd number of times keep their mapping: ("XAXXB", "PUPPY") sends X to
    /// P, while ("AB", "BA") cancels out to the identity.
    pub fn fragment(cipher: &str, plain: &str) -> Key {
        let mut fragment = Key::identity();
        for (c, p) in cipher.bytes().zip(plain.bytes()) {
            if let (Some(c_idx), Some(p_idx)) = (letter_index(c), letter_index(p)) {
                fragment.swap(c_idx, p_idx);
            }
        }
        fragment
    }

    pub(crate) fn from_array(letters: [u8; ALPHABET_LEN]) -> Result<Self, DecypherError> {
        let mut seen = [false; ALPHABET_LEN];
        for &b in letters.iter() {
            let idx = letter_index(b)
                .ok_or_else(|| DecypherError::InvalidKey(format!("'{}' is not a letter", b as char)))?;
            if seen[idx] {
                return Err(DecypherError::InvalidKey(format!(
                    "letter '{}' appears more than once",
                    b.to_ascii_uppercase() as char
                )));
            }
            seen[idx] = true;
        }
        let mut upper = letters;
        upper.make_ascii_uppercase();
        Ok(Key(upper))
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::identity()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0.iter() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl FromStr for Key {
    type Err = DecypherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        let letters: [u8; ALPHABET_LEN] = bytes.try_into().map_err(|_| {
            DecypherError::InvalidKey(format!("expected {} letters, got {}", ALPHABET_LEN, bytes.len()))
        })?;
        Key::from_array(letters)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = DecypherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

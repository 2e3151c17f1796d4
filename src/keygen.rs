// File: src/keygen.rs
//! Random keys for producing encrypted test fixtures. Nothing in the solving
//! pipeline depends on this module.
use crate::core::key::{Key, ALPHABET};
use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly random substitution key drawn from `rng`.
pub fn random_key<R: Rng + ?Sized>(rng: &mut R) -> Key {
    let mut letters = *ALPHABET;
    letters.shuffle(rng);
    // A shuffle of the alphabet is always a valid permutation.
    Key::from_array(letters).unwrap_or_default()
}

/// Encrypts `text` under `key`, keeping case and non-letters.
pub fn encrypt(text: &str, key: &Key) -> String {
    key.apply_preserving(text)
}

/// Draws a key from `rng` and encrypts `text` with it.
pub fn encrypt_random<R: Rng + ?Sized>(text: &str, rng: &mut R) -> (Key, String) {
    let key = random_key(rng);
    let encrypted = encrypt(text, &key);
    (key, encrypted)
}

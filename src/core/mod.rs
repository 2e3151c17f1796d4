// src/core/mod.rs
pub mod engine;
pub mod key;
pub mod ngram;
pub mod pattern;
pub mod solver;
pub mod text;
pub mod trie;
pub mod types;

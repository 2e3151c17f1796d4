// File: src/batch.rs
//! Per-file decrypt and encrypt runs. A file that cannot be read, analyzed
//! or written only fails its own outcome; the files after it are still
//! processed.
use crate::core::engine::Decypher;
use crate::core::key::Key;
use crate::core::types::Analysis;
use crate::error::{DecypherError, Result};
use crate::keygen;
use crate::persistence::{decrypted_path, encrypted_path, write_atomic};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A decrypted file and where its plaintext was written.
#[derive(Debug)]
pub struct Decrypted {
    pub output: PathBuf,
    pub analysis: Analysis,
}

/// An encrypted fixture and the key that produced it.
#[derive(Debug)]
pub struct Encrypted {
    pub output: PathBuf,
    pub key: Key,
}

/// Result of processing one input file.
#[derive(Debug)]
pub struct FileOutcome<'a, T> {
    pub path: &'a Path,
    pub result: Result<T>,
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| DecypherError::read(path, e))
}

/// Analyzes one file and writes its plaintext next to it under the
/// `-decrypted` name.
pub fn decrypt_file(engine: &Decypher, path: &Path) -> Result<Decrypted> {
    let text = read_text(path)?;
    let analysis = engine.analyze(&text)?;
    let output = decrypted_path(path);
    write_atomic(&output, &analysis.plaintext)?;
    debug!(file = %path.display(), output = %output.display(), "file decrypted");
    Ok(Decrypted { output, analysis })
}

/// Encrypts one file under a fresh key from `rng` into `_<name>`.
pub fn encrypt_file<R: Rng + ?Sized>(path: &Path, rng: &mut R) -> Result<Encrypted> {
    let text = read_text(path)?;
    let (key, encrypted) = keygen::encrypt_random(&text, rng);
    let output = encrypted_path(path);
    write_atomic(&output, &encrypted)?;
    debug!(file = %path.display(), output = %output.display(), "file encrypted");
    Ok(Encrypted { output, key })
}

fn outcome<T>(path: &Path, result: Result<T>) -> FileOutcome<'_, T> {
    if let Err(e) = &result {
        debug!(file = %path.display(), error = ?e, "file skipped");
    }
    FileOutcome { path, result }
}

/// Decrypts `paths` in order, lazily, one outcome per file.
pub fn decrypt_files<'a>(
    engine: &'a Decypher,
    paths: &'a [PathBuf],
) -> impl Iterator<Item = FileOutcome<'a, Decrypted>> + 'a {
    paths.iter().map(move |path| outcome(path, decrypt_file(engine, path)))
}

/// Encrypts `paths` in order, lazily, drawing one key per file from `rng`.
pub fn encrypt_files<'a, R: Rng + ?Sized>(
    paths: &'a [PathBuf],
    rng: &'a mut R,
) -> impl Iterator<Item = FileOutcome<'a, Encrypted>> + 'a {
    paths.iter().map(move |path| outcome(path, encrypt_file(path, rng)))
}

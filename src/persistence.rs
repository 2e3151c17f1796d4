// File: src/persistence.rs
use crate::core::ngram::NGramModel;
use crate::core::trie::PatternIndex;
use crate::error::{DecypherError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Suffix added to the file name of decrypted output.
pub const DECRYPTED_SUFFIX: &str = "-decrypted";
/// Prefix added to the file name of encrypted fixtures.
pub const ENCRYPTED_PREFIX: &str = "_";

/// Identity of a source file at the time a snapshot was built.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceStamp {
    pub path: PathBuf,
    pub len: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl SourceStamp {
    pub fn of(path: &Path) -> Self {
        let metadata = fs::metadata(path).ok();
        Self {
            path: path.to_path_buf(),
            len: metadata.as_ref().map(|m| m.len()),
            modified: metadata.and_then(|m| m.modified().ok()),
        }
    }

    fn is_missing(&self) -> bool {
        self.len.is_none() && self.modified.is_none()
    }

    /// Same path, and unchanged on disk. A source that no longer exists is
    /// taken on trust, since the snapshot is all that is left of it.
    pub fn matches(&self, current: &SourceStamp) -> bool {
        self.path == current.path
            && (current.is_missing() || (self.len == current.len && self.modified == current.modified))
    }
}

/// The tally and dictionary a snapshot was built from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotSources {
    pub tally: SourceStamp,
    pub dictionary: SourceStamp,
}

impl SnapshotSources {
    pub fn of(tally: &Path, dictionary: &Path) -> Self {
        Self { tally: SourceStamp::of(tally), dictionary: SourceStamp::of(dictionary) }
    }

    pub fn matches(&self, current: &SnapshotSources) -> bool {
        self.tally.matches(&current.tally) && self.dictionary.matches(&current.dictionary)
    }
}

#[derive(serde::Serialize)]
struct SnapshotRef<'a> {
    sources: &'a SnapshotSources,
    index: &'a PatternIndex,
    model: &'a NGramModel,
}

/// The read-only resources of a run, as stored on disk.
#[derive(serde::Deserialize)]
struct Snapshot {
    sources: SnapshotSources,
    index: PatternIndex,
    model: NGramModel,
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Writes through a temp file in the target directory, then renames it into
/// place. Readers never see a half-written file.
fn persist_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let dir = parent_dir(path);
    fs::create_dir_all(dir).map_err(|e| DecypherError::write(dir, e))?;

    let temp_file = NamedTempFile::new_in(dir).map_err(|e| DecypherError::write(path, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush().map_err(|e| DecypherError::write(path, e))?;
    }
    temp_file.persist(path).map_err(|e| DecypherError::write(path, e.error))?;
    Ok(())
}

pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    persist_with(path, |writer| {
        writer.write_all(contents.as_bytes()).map_err(|e| DecypherError::write(path, e))
    })
}

pub fn save_snapshot(
    path: &Path,
    sources: &SnapshotSources,
    index: &PatternIndex,
    model: &NGramModel,
) -> Result<()> {
    persist_with(path, |writer| {
        bincode::serialize_into(writer, &SnapshotRef { sources, index, model })?;
        Ok(())
    })
}

pub fn load_snapshot(path: &Path) -> Result<(SnapshotSources, PatternIndex, NGramModel)> {
    let file = File::open(path).map_err(|e| DecypherError::read(path, e))?;
    let reader = BufReader::new(file);
    let state: Snapshot = bincode::deserialize_from(reader)?;
    Ok((state.sources, state.index, state.model))
}

/// `notes.txt` -> `notes-decrypted.txt`. The suffix goes before the first
/// dot of the file name, so `a.tar.gz` becomes `a-decrypted.tar.gz`.
pub fn decrypted_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let renamed = match name.find('.') {
        Some(dot) => format!("{}{}{}", &name[..dot], DECRYPTED_SUFFIX, &name[dot..]),
        None => format!("{}{}", name, DECRYPTED_SUFFIX),
    };
    path.with_file_name(renamed)
}

/// `dir/notes.txt` -> `dir/_notes.txt`.
pub fn encrypted_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{}{}", ENCRYPTED_PREFIX, name))
}

// persist.rs - Loading and self-verifying save of the manifest file

use crate::error::{LoadError, SaveError};
use crate::manifest::{self, Manifest, Parsed};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads the file back during the verification step of a save.
pub type ReadBack = fn(&Path) -> io::Result<String>;

/// A completed save cycle.
#[derive(Debug)]
pub struct Saved {
    /// The document as parsed back from the file.
    pub document: Manifest,
    /// Content of the previous file that the new file no longer holds.
    pub dropped: Vec<String>,
    /// The reread document is not the one that was written.
    pub differs: bool,
}

/// Read and parse the manifest at `path`, also listing content a save would
/// not keep.
pub fn load(path: &Path) -> Result<Parsed, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = manifest::parse_report(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "loaded {} ({} remotes, {} projects)",
        path.display(),
        parsed.manifest.remotes.len(),
        parsed.manifest.projects.len()
    );
    if !parsed.dropped.is_empty() {
        log::warn!(
            "{} holds content that will not be saved: {}",
            path.display(),
            parsed.dropped.join(", ")
        );
    }
    Ok(parsed)
}

pub fn read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Serialize, write, read back, and reparse.
///
/// Only a document that survived the full round trip through the file is
/// returned; the caller replaces its copy with it. Any failure leaves the
/// caller's document as it was.
pub fn save(path: &Path, document: &Manifest) -> Result<Saved, SaveError> {
    save_with(path, document, read_file)
}

/// [`save`] with the read-back step supplied by the caller.
pub fn save_with(
    path: &Path,
    document: &Manifest,
    read_back: ReadBack,
) -> Result<Saved, SaveError> {
    let text = manifest::serialize(document)?;
    let dropped = previous_dropped(path);

    atomic_write(path, text.as_bytes()).map_err(|source| {
        log::warn!("write to {} failed: {}", path.display(), source);
        SaveError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    log::info!("wrote {} bytes to {}", text.len(), path.display());
    if !dropped.is_empty() {
        log::warn!("dropped from {}: {}", path.display(), dropped.join(", "));
    }

    let reread = read_back(path).map_err(|source| {
        log::warn!("read back of {} failed: {}", path.display(), source);
        SaveError::ReadBack {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let fresh = manifest::parse(&reread).map_err(|source| {
        log::warn!("reparse of {} failed: {}", path.display(), source);
        SaveError::Reparse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let differs = fresh != *document;
    if differs {
        log::warn!("{} reloaded with differences from the saved document", path.display());
    }
    Ok(Saved {
        document: fresh,
        dropped,
        differs,
    })
}

/// What the file about to be replaced holds beyond the model. Empty when it
/// is missing or unparsable.
fn previous_dropped(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| manifest::parse_report(&text).ok())
        .map(|parsed| parsed.dropped)
        .unwrap_or_default()
}

/// Replace `path` with `data` via a temp file in the same directory + rename.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

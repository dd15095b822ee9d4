//! Local tree scanner.
//!
//! Walks the sync root and produces a `LocalEntry` per regular file that is
//! not excluded, with a streaming md5 digest. The walk is synchronous; the
//! engine runs it under `spawn_blocking` before any network activity.

use crate::error::{StorageError, StorageResult};
use crate::exclude::ExclusionSet;
use crate::manifest::MANIFEST_FILE_NAME;
use crate::types::LocalEntry;
use md5::{Digest, Md5};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Scans the tree rooted at `root`, returning entries sorted by relative path.
///
/// Symlinks are not followed; directories and other non-regular files are
/// skipped. The engine's own manifest file is always ignored so a manifest
/// written by one run does not perturb the next.
pub fn scan_tree(root: &Path, excludes: &ExclusionSet) -> StorageResult<Vec<LocalEntry>> {
    if !root.is_dir() {
        return Err(StorageError::Config(format!(
            "sync root {} is not a directory",
            root.display()
        )));
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry =
            entry.map_err(|e| StorageError::Io(std::io::Error::other(e.to_string())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = relative_key(root, entry.path())?;
        if rel_path == MANIFEST_FILE_NAME {
            continue;
        }
        if excludes.is_excluded(&rel_path) {
            debug!("excluding {rel_path}");
            continue;
        }

        let (size, digest) = digest_file(entry.path())?;
        entries.push(LocalEntry {
            rel_path,
            size,
            digest,
        });
    }

    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    debug!("scanned {} files under {}", entries.len(), root.display());
    Ok(entries)
}

/// Platform-independent relative key: forward slashes, no leading separator.
fn relative_key(root: &Path, path: &Path) -> StorageResult<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        StorageError::Permanent(format!("path {} escapes sync root", path.display()))
    })?;

    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Streaming md5 over the file content, returning `(size, hex digest)`.
fn digest_file(path: &Path) -> StorageResult<(u64, String)> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((size, hex::encode(hasher.finalize())))
}

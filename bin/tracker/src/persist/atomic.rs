//! Whole-file replacement using temp file + rename.
//!
//! The target is either fully replaced or left exactly as it was.

use crate::errors::WriteError;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

const EXCEL_OWNER_NAME_MAX: usize = 53;

/// Replace `path` with `bytes`
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    if let Some(lock_file) = find_lock_file(path).await {
        tracing::warn!(
            path = %path.display(),
            lock_file = %lock_file.display(),
            "File is open in a spreadsheet application; close it or delete the owner file"
        );
        return Err(WriteError::Locked {
            path: path.to_path_buf(),
            lock_file: Some(lock_file),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| io_error(path, source))?;
    }

    let temp_path = temp_path_for(path)?;
    if let Err(source) = tokio::fs::write(&temp_path, bytes).await {
        discard(&temp_path).await;
        return Err(io_error(path, source));
    }

    if let Err(source) = tokio::fs::rename(&temp_path, path).await {
        discard(&temp_path).await;
        return Err(classify_replace_error(path, source));
    }

    tracing::trace!(path = %path.display(), bytes = bytes.len(), "Replaced file");
    Ok(())
}

/// Owner/lock files that spreadsheet applications keep next to an open file.
///
/// Excel writes `~$` over the first two characters of long names and in
/// front of short ones; LibreOffice writes `.~lock.<name>#`.
pub fn lock_file_candidates(path: &Path) -> Vec<PathBuf> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };

    let mut candidates = vec![
        path.with_file_name(format!("~${}", name)),
        path.with_file_name(format!(".~lock.{}#", name)),
    ];
    if let Some(rest) = name.get(2..).filter(|r| !r.is_empty()) {
        candidates.push(path.with_file_name(format!("~${}", rest)));
    }
    candidates
}

/// First owner file that looks live; empty or malformed ones are left behind
/// by crashed sessions and ignored.
async fn find_lock_file(path: &Path) -> Option<PathBuf> {
    for candidate in lock_file_candidates(path) {
        let Ok(contents) = tokio::fs::read(&candidate).await else {
            continue;
        };
        if is_live_owner_file(&candidate, &contents) {
            return Some(candidate);
        }
        tracing::debug!(lock_file = %candidate.display(), "Ignoring stale owner file");
    }
    None
}

fn is_live_owner_file(candidate: &Path, contents: &[u8]) -> bool {
    let is_libreoffice = candidate
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(".~lock."));

    if is_libreoffice {
        is_libreoffice_lock(contents)
    } else {
        is_excel_owner(contents)
    }
}

/// `<name>,<host>,<user>,<date>,<profile dir>;`
fn is_libreoffice_lock(contents: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(contents) else {
        return false;
    };
    let fields: Vec<&str> = text.trim_end().trim_end_matches(';').split(',').collect();
    fields.len() >= 4 && !fields[1].trim().is_empty()
}

/// Length-prefixed user name in the first bytes, padded to a fixed record
fn is_excel_owner(contents: &[u8]) -> bool {
    let Some((&len, rest)) = contents.split_first() else {
        return false;
    };
    let len = len as usize;
    if len == 0 || len > EXCEL_OWNER_NAME_MAX || rest.len() < len {
        return false;
    }
    rest[..len].iter().all(|b| b.is_ascii_graphic() || *b == b' ')
}

fn temp_path_for(path: &Path) -> Result<PathBuf, WriteError> {
    let name = path.file_name().ok_or_else(|| {
        io_error(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"),
        )
    })?;

    let mut temp_name = OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

async fn discard(temp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

fn classify_replace_error(path: &Path, source: io::Error) -> WriteError {
    // 32/33: sharing and lock violations on Windows
    let sharing_violation = cfg!(windows) && matches!(source.raw_os_error(), Some(32) | Some(33));

    if source.kind() == io::ErrorKind::PermissionDenied || sharing_violation {
        WriteError::Locked {
            path: path.to_path_buf(),
            lock_file: None,
        }
    } else {
        io_error(path, source)
    }
}

fn io_error(path: &Path, source: io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

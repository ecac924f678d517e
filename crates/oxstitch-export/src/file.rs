//! Path-based export.
//!
//! Both entry points own their file handle for the duration of the call
//! and release it on every return path. The buffered writer is flushed
//! explicitly so flush failures are reported instead of lost on drop.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use oxstitch_pattern::{CodedColor, CodedImage};
use tempfile::NamedTempFile;

use crate::oxs::write_oxs;

/// Failure to produce an `.oxs` file.
///
/// Every variant is a sink I/O failure; chart content never causes an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The destination (or temporary file) could not be created.
    #[error("failed to create {}: {source}", path.display())]
    Create {
        /// File that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing or flushing the document failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The finished temporary file could not be moved into place.
    #[error("failed to replace {}: {source}", path.display())]
    Persist {
        /// Final destination.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Write a chart to `path`, creating or truncating it.
///
/// On failure the file may hold a partial document; use
/// [`export_to_file_atomic`] when that is not acceptable.
///
/// # Errors
///
/// Returns [`ExportError::Create`] if the file cannot be opened for
/// writing and [`ExportError::Write`] if a write or the final flush
/// fails.
pub fn export_to_file(
    path: &Path,
    image: &CodedImage,
    ordered_colors: &[CodedColor],
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    write_oxs(&mut writer, image, ordered_colors)
        .and_then(|()| writer.flush())
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), "exported chart");
    Ok(())
}

/// Write a chart to a temporary file beside `path`, then rename it over
/// `path`.
///
/// Either the complete document replaces `path` or `path` is left as it
/// was. The temporary file is removed on failure.
///
/// # Errors
///
/// Returns [`ExportError::Create`] if the temporary file cannot be
/// created, [`ExportError::Write`] if writing it fails, and
/// [`ExportError::Persist`] if the rename fails.
pub fn export_to_file_atomic(
    path: &Path,
    image: &CodedImage,
    ordered_colors: &[CodedColor],
) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|source| ExportError::Create {
        path: dir.to_path_buf(),
        source,
    })?;
    let temp_path = temp.path().to_path_buf();

    let mut writer = BufWriter::new(temp);
    write_oxs(&mut writer, image, ordered_colors)
        .and_then(|()| writer.flush())
        .map_err(|source| ExportError::Write {
            path: temp_path.clone(),
            source,
        })?;
    let temp = writer.into_inner().map_err(|e| ExportError::Write {
        path: temp_path,
        source: e.into_error(),
    })?;

    temp.persist(path).map_err(|e| ExportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::info!(path = %path.display(), "exported chart");
    Ok(())
}

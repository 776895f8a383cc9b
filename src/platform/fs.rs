// ImeiSift - platform/fs.rs
//
// Filesystem reads for report and query files.

use crate::util::error::InputError;
use std::path::Path;

/// Read a report file's bytes.
///
/// Rejects files larger than `max_size` before reading them. Encoding is
/// checked by `parser::extract_from_bytes`.
pub fn read_report(path: &Path, max_size: u64) -> Result<Vec<u8>, InputError> {
    let io_err = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(InputError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Report read");
    Ok(bytes)
}

/// Read a query file, replacing invalid UTF-8 rather than failing.
pub fn read_query_file(path: &Path) -> Result<String, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

//! Reading PDFs from disk and writing chunk PDFs back out.

// Memory mapping requires unsafe but is well-documented and safe for read-only access
#![allow(unsafe_code)]

use crate::core::Chunk;
use crate::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Inputs at or above this size are memory mapped (1MB).
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Largest input accepted (1GB).
const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Reads a PDF file into memory.
///
/// The bytes are not parsed here; see [`Document::from_bytes`].
///
/// [`Document::from_bytes`]: crate::core::Document::from_bytes
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing path and
/// [`IoError::ReadFailed`] or [`IoError::MmapFailed`] if the file cannot be
/// read or exceeds 1GB.
///
/// # Examples
///
/// ```no_run
/// use pdf_chat::io::read_pdf;
///
/// let bytes = read_pdf("report.pdf").unwrap();
/// assert!(bytes.starts_with(b"%PDF"));
/// ```
pub fn read_pdf<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IoError::FileNotFound {
            path: shown.clone(),
        },
        _ => read_failed(&shown, &e),
    })?;
    let size = file.metadata().map_err(|e| read_failed(&shown, &e))?.len();

    if size > MAX_FILE_SIZE {
        return Err(IoError::ReadFailed {
            path: shown,
            reason: format!("file too large: {size} bytes (max: {MAX_FILE_SIZE} bytes)"),
        }
        .into());
    }

    let bytes = if size >= MMAP_THRESHOLD {
        // Safety: the map is read-only and copied out before it is dropped
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| IoError::MmapFailed {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        mmap.to_vec()
    } else {
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|e| read_failed(&shown, &e))?;
        buffer
    };

    debug!(path = %shown, size, "read input file");
    Ok(bytes)
}

fn read_failed(path: &str, err: &std::io::Error) -> IoError {
    IoError::ReadFailed {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

/// File name of chunk `index` under `prefix`: `{prefix}_{index:04}.pdf`.
#[must_use]
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:04}.pdf")
}

/// Writes each chunk's PDF bytes to its own file in `out_dir`.
///
/// The directory is created if missing and existing files with the same
/// names are overwritten. Returns the written paths in chunk order.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_chunks<P: AsRef<Path>>(
    out_dir: P,
    chunks: &[Chunk],
    prefix: &str,
) -> Result<Vec<String>> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|e| IoError::DirectoryFailed {
        path: out_dir.display().to_string(),
        reason: e.to_string(),
    })?;

    chunks
        .iter()
        .map(|chunk| {
            let target = out_dir.join(chunk_file_name(prefix, chunk.index));
            let shown = target.display().to_string();
            fs::write(&target, &chunk.bytes).map_err(|e| IoError::WriteFailed {
                path: shown.clone(),
                reason: e.to_string(),
            })?;
            debug!(path = %shown, pages = chunk.page_count(), "wrote chunk");
            Ok(shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_read_small_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("small.pdf");
        fs::write(&path, b"%PDF-1.5\n").unwrap();

        assert_eq!(read_pdf(&path).unwrap(), b"%PDF-1.5\n");
    }

    #[test]
    fn test_read_large_file_uses_mmap() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("large.pdf");
        #[allow(clippy::cast_possible_truncation)]
        let content = vec![b'x'; MMAP_THRESHOLD as usize + 10];
        fs::write(&path, &content).unwrap();

        assert_eq!(read_pdf(&path).unwrap(), content);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_pdf("/nonexistent/file.pdf");
        assert!(matches!(
            result,
            Err(Error::Io(IoError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_chunk_file_name() {
        assert_eq!(chunk_file_name("chunk", 0), "chunk_0000.pdf");
        assert_eq!(chunk_file_name("report", 12), "report_0012.pdf");
    }

    #[test]
    fn test_write_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("nested").join("chunks");
        let chunks = vec![
            Chunk::new(0, 0, 2, b"first".to_vec()),
            Chunk::new(1, 2, 3, b"second".to_vec()),
        ];

        let paths = write_chunks(&out_dir, &chunks, "part").unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("part_0000.pdf"));
        assert!(paths[1].ends_with("part_0001.pdf"));
        assert_eq!(fs::read(&paths[1]).unwrap(), b"second");
    }
}

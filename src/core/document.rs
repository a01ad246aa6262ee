//! Loaded PDF documents.

use crate::error::Result;

/// Bytes per megabyte, used for display and limit conversion.
pub const BYTES_PER_MB: usize = 1024 * 1024;

/// An immutable PDF byte stream with its page count.
///
/// Construction parses the bytes once to validate them and count pages.
/// The bytes are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
    page_count: usize,
}

impl Document {
    /// Parses `bytes` as a PDF and records its page count.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DocumentError::Parse`] if the bytes are not a
    /// readable PDF.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let parsed = lopdf::Document::load_mem(&bytes)?;
        let page_count = parsed.get_pages().len();
        Ok(Self { bytes, page_count })
    }

    /// Returns the raw PDF bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of pages.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the size in megabytes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / BYTES_PER_MB as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, Error};
    use crate::test_support::sample_pdf;

    #[test]
    fn test_document_from_bytes() {
        let bytes = sample_pdf(3, 0);
        let doc = Document::from_bytes(bytes.clone()).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.size(), bytes.len());
        assert_eq!(doc.bytes(), bytes.as_slice());
    }

    #[test]
    fn test_document_rejects_garbage() {
        let result = Document::from_bytes(b"%PDF-1.5 definitely not a pdf".to_vec());
        assert!(matches!(
            result,
            Err(Error::Document(DocumentError::Parse(_)))
        ));
    }

    #[test]
    fn test_document_rejects_empty() {
        assert!(Document::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn test_size_mb() {
        let bytes = sample_pdf(1, 0);
        let len = bytes.len();
        let doc = Document::from_bytes(bytes).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let expected = len as f64 / BYTES_PER_MB as f64;
        assert!((doc.size_mb() - expected).abs() < f64::EPSILON);
    }
}

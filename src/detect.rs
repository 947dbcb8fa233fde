//! PDF header sniffing.
//!
//! Used by the extractor to reject non-PDF input before lopdf sees it, and by
//! upload intake to check content independently of the declared media type.

use crate::error::{Error, Result};

/// The `%PDF-M.m` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfHeader {
    /// Major version digit
    pub major: u8,
    /// Minor version digit
    pub minor: u8,
    /// Byte offset of `%PDF-` in the input
    pub offset: usize,
}

impl PdfHeader {
    /// Version as `"M.m"`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}.{}", self.major, self.minor)
    }
}

const MARKER: &[u8] = b"%PDF-";

/// Some producers emit a few junk bytes (BOM, whitespace) before the header.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Find and parse the PDF header.
///
/// The header may start anywhere in the first kilobyte.
///
/// # Errors
/// [`Error::InvalidInput`] if no well-formed `%PDF-M.m` header is found.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let offset = window
        .windows(MARKER.len())
        .position(|w| w == MARKER)
        .ok_or_else(|| Error::InvalidInput("not a PDF document".to_string()))?;

    match data.get(offset + MARKER.len()..offset + MARKER.len() + 3) {
        Some(&[major, b'.', minor]) if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(PdfHeader {
                major: major - b'0',
                minor: minor - b'0',
                offset,
            })
        }
        Some(other) => Err(Error::InvalidInput(format!(
            "malformed PDF version: {}",
            String::from_utf8_lossy(other)
        ))),
        None => Err(Error::InvalidInput("truncated PDF header".to_string())),
    }
}

/// Whether `data` carries a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

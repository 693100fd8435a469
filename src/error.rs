//! Error types for the pageblocks library.

use thiserror::Error;

/// Result type alias for pageblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during block extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// Page content is unreadable or absent. Fatal to the page; never
    /// recovered inside this crate.
    #[error("Page read error: {0}")]
    PageRead(String),

    /// The native text extraction for a page is malformed or inconsistent.
    /// Recovered by the one-shot fallback to OCR.
    #[error("Page parsing error: {0}")]
    PageParse(String),

    /// The OCR service call failed or returned a malformed response.
    /// Recovered by returning an empty block list.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Error serializing block records.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

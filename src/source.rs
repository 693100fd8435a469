//! Page source abstraction.
//!
//! Provides a trait-based interface for page content access, isolating the
//! concrete page reader (a PDF library, a scanned-image store) from the
//! block extraction logic. The crate only consumes what this seam exposes:
//! pixel dimensions, the embedded-image inventory, the flowing text
//! extraction, the positioned word tokens, and an encoded page image for
//! the OCR path.

use crate::error::Result;

/// An embedded raster image on a page, reduced to its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageImage {
    /// Image width in page pixels
    pub width: f64,
    /// Image height in page pixels
    pub height: f64,
}

impl PageImage {
    /// Create a new image entry.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Covered area in square page pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A positioned word token in pixel space, in reading order.
///
/// Tokens come from a separate extraction pass than the flowing page text
/// and are not guaranteed to segment identically: a token may be a strict
/// substring of a text word, or a text word a concatenation of several
/// consecutive tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    /// Token text fragment
    pub text: String,
    /// Left edge in page pixels
    pub x0: f64,
    /// Right edge in page pixels
    pub x1: f64,
    /// Top edge in page pixels
    pub top: f64,
    /// Bottom edge in page pixels
    pub bottom: f64,
}

impl WordToken {
    /// Create a new token.
    pub fn new(text: impl Into<String>, x0: f64, x1: f64, top: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }
}

/// Abstract interface to one page of a document.
///
/// Errors from the native-side accessors (`dimensions`, `images`, `text`,
/// `words`) trigger the one-shot fallback to OCR; an error from
/// `render_image` is a page-read failure and propagates to the caller.
pub trait PageSource {
    /// Page pixel dimensions as (width, height).
    fn dimensions(&self) -> Result<(f64, f64)>;

    /// Embedded raster image inventory for the page.
    fn images(&self) -> Result<Vec<PageImage>>;

    /// Flowing text extraction for the page, one line per `\n`.
    fn text(&self) -> Result<String>;

    /// Positioned word tokens in reading order.
    fn words(&self) -> Result<Vec<WordToken>>;

    /// Encoded page image bytes for the OCR path.
    fn render_image(&self) -> Result<Vec<u8>>;
}

/// In-memory [`PageSource`] over pre-extracted page content.
///
/// Adapter for callers that gather page content up front, and the test
/// vehicle for the extraction pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    /// Page width in pixels
    pub width: f64,
    /// Page height in pixels
    pub height: f64,
    /// Embedded images
    pub images: Vec<PageImage>,
    /// Flowing text
    pub text: String,
    /// Positioned word tokens
    pub words: Vec<WordToken>,
    /// Encoded page image for OCR
    pub image_bytes: Vec<u8>,
}

impl MemoryPage {
    /// Create an empty page with the given pixel dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the flowing text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the positioned word tokens.
    pub fn with_words(mut self, words: Vec<WordToken>) -> Self {
        self.words = words;
        self
    }

    /// Set the embedded image inventory.
    pub fn with_images(mut self, images: Vec<PageImage>) -> Self {
        self.images = images;
        self
    }

    /// Set the encoded page image bytes.
    pub fn with_image_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.image_bytes = bytes;
        self
    }
}

impl PageSource for MemoryPage {
    fn dimensions(&self) -> Result<(f64, f64)> {
        Ok((self.width, self.height))
    }

    fn images(&self) -> Result<Vec<PageImage>> {
        Ok(self.images.clone())
    }

    fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn words(&self) -> Result<Vec<WordToken>> {
        Ok(self.words.clone())
    }

    fn render_image(&self) -> Result<Vec<u8>> {
        Ok(self.image_bytes.clone())
    }
}

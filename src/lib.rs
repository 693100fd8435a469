//! # pageblocks
//!
//! Layout block extraction and alignment for document annotation.
//!
//! This library ingests a document page, from a digital-text source or
//! from OCR, and produces a normalized hierarchy of layout blocks: LINE
//! blocks and the WORD blocks composing them, each with page-relative
//! bounding geometry, stable identity, and parent/child relationships. The
//! output feeds a human-annotation UI that overlays highlightable regions
//! on a rendered page image.
//!
//! ## Quick Start
//!
//! ```
//! use pageblocks::{extract_page, ExtractOptions, MemoryPage, WordToken};
//! use pageblocks::{OcrEngine, OcrRegion, Result};
//!
//! /// Engine stub for pages that never need OCR.
//! struct NoOcr;
//!
//! impl OcrEngine for NoOcr {
//!     fn detect_text(&self, _image: &[u8]) -> Result<Vec<OcrRegion>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let page = MemoryPage::new(612.0, 792.0)
//!     .with_text("Hello world")
//!     .with_words(vec![
//!         WordToken::new("Hello", 72.0, 120.0, 100.0, 112.0),
//!         WordToken::new("world", 130.0, 180.0, 100.0, 112.0),
//!     ]);
//!
//! let result = extract_page(&page, &NoOcr, 1, &ExtractOptions::new())?;
//! assert!(result.native);
//! assert_eq!(result.blocks.len(), 3); // one LINE, two WORDs
//! # Ok::<(), pageblocks::Error>(())
//! ```
//!
//! ## Design
//!
//! - **Two extraction paths, one block shape**: the native-text aligner
//!   reconciles a page's flowing text with its separately-positioned word
//!   tokens; the OCR converter maps a service's region list. Both emit the
//!   same ordered flat sequence (each LINE followed by its WORD children).
//! - **Strategy selection with one-shot fallback**: an operator override or
//!   an image-dominance heuristic routes a page to OCR; a native-path
//!   failure falls back to OCR exactly once, and an OCR failure yields an
//!   empty block list rather than an error.
//! - **Collaborators behind seams**: page reading and the OCR service live
//!   behind the [`PageSource`] and [`OcrEngine`] traits; this crate does no
//!   I/O of its own.

pub mod error;
pub mod extract;
pub mod model;
pub mod source;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{
    align_page, convert_regions, extract_page, extract_page_with_ids, extract_pages,
    is_image_dominated, ExtractOptions, OcrEngine, OcrGeometry, OcrRegion, OcrRelationship,
    OcrRelationshipType, PageBlocks, IMAGE_AREA_RATIO_THRESHOLD,
};
pub use model::{
    Block, BlockMeta, BlockRecord, BlockType, BoundingBox, Geometry, IdGenerator, Point,
    Relationship, RelationshipType, SequentialIdGenerator, UuidGenerator,
};
pub use source::{MemoryPage, PageImage, PageSource, WordToken};

/// JSON output format for emitted block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize block records to JSON in the wire shape the annotation UI
/// consumes.
pub fn to_json(records: &[BlockRecord], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(records),
        JsonFormat::Compact => serde_json::to_string(records),
    };
    result.map_err(|e| Error::Serialize(format!("JSON serialization error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<BlockRecord> {
        let tokens = vec![
            WordToken::new("Hello", 10.0, 40.0, 20.0, 32.0),
            WordToken::new("world", 50.0, 90.0, 20.0, 32.0),
        ];
        let mut ids = SequentialIdGenerator::default();
        let blocks = align_page("Hello world", &tokens, 1, 100.0, 100.0, &mut ids);
        PageBlocks {
            blocks,
            native: true,
        }
        .into_records()
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample_records(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"BlockType\""));
        assert!(json.contains("\"LINE\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample_records(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"Page\":1"));
    }
}

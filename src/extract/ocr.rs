//! OCR output conversion.
//!
//! Maps the OCR service's flat region list into the same block tree shape
//! the native-text path produces. The crate performs no network I/O; the
//! [`OcrEngine`] seam hands it the already-parsed response regions, and
//! this module only interprets that shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Block, BlockType, BoundingBox, Geometry, Relationship};
use crate::source::PageSource;

/// Relationship kind attached to an OCR region. Kinds other than CHILD are
/// ignored by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrRelationshipType {
    /// The related ids are the region's children, in reading order.
    #[serde(rename = "CHILD")]
    Child,
    /// Any other relationship kind the service may emit.
    #[serde(other)]
    Other,
}

/// One relationship entry of an OCR region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrRelationship {
    /// Relationship kind
    #[serde(rename = "Type")]
    pub relationship_type: OcrRelationshipType,
    /// Related region ids, in reading order
    pub ids: Vec<String>,
}

/// Geometry envelope of an OCR region. The bounding box is already
/// page-normalized by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrGeometry {
    /// Normalized enclosing box
    pub bounding_box: BoundingBox,
}

/// A typed text region from the OCR service response.
///
/// Field naming mirrors the service's wire shape, so a raw response region
/// deserializes directly into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrRegion {
    /// Service-assigned region id
    pub id: String,
    /// LINE or WORD
    pub block_type: BlockType,
    /// Recognized text
    #[serde(default)]
    pub text: String,
    /// Region geometry
    pub geometry: OcrGeometry,
    /// Child links (LINE regions only)
    #[serde(default)]
    pub relationships: Vec<OcrRelationship>,
}

/// Interface to the OCR collaborator.
///
/// Given encoded page image bytes, returns the flat region list from the
/// service response. A single synchronous request/response; timeout and
/// retry policy, if any, belong to the implementation, not this crate.
pub trait OcrEngine {
    /// Detect text regions on a page image.
    fn detect_text(&self, image: &[u8]) -> Result<Vec<OcrRegion>>;
}

/// Convert OCR regions into the ordered flat block sequence.
///
/// OCR-assigned ids are preserved verbatim, unlike the native path which
/// mints fresh ids. The service's own line geometry is authoritative and
/// already encloses its words, so no geometry merging happens here.
///
/// Errors when a LINE's CHILD relationship references a WORD id absent from
/// the region list.
pub fn convert_regions(regions: &[OcrRegion], page_number: u32) -> Result<Vec<Block>> {
    let line_regions: Vec<&OcrRegion> = regions
        .iter()
        .filter(|r| r.block_type == BlockType::Line)
        .collect();
    let word_regions: HashMap<&str, &OcrRegion> = regions
        .iter()
        .filter(|r| r.block_type == BlockType::Word)
        .map(|r| (r.id.as_str(), r))
        .collect();
    log::debug!(
        "converting {} OCR regions ({} lines, {} words) on page {}",
        regions.len(),
        line_regions.len(),
        word_regions.len(),
        page_number
    );

    let mut blocks = Vec::new();
    let mut index = 0usize;
    for line_region in line_regions {
        let line_index = index;
        let child_ids = child_ids(&line_region.relationships);
        let mut line = Block::new(
            line_region.id.clone(),
            BlockType::Line,
            line_region.text.clone(),
            page_number,
            line_index,
        )
        .with_geometry(Geometry::new(line_region.geometry.bounding_box));
        line.relationships.push(Relationship::child(child_ids.clone()));
        index += 1;
        blocks.push(line);

        for child_id in &child_ids {
            let region = word_regions.get(child_id.as_str()).ok_or_else(|| {
                Error::Ocr(format!(
                    "line {} references unknown word id {}",
                    line_region.id, child_id
                ))
            })?;
            let word = Block::new(
                region.id.clone(),
                BlockType::Word,
                region.text.clone(),
                page_number,
                index,
            )
            .with_geometry(Geometry::new(region.geometry.bounding_box))
            .with_parent(line_index);
            index += 1;
            blocks.push(word);
        }
    }

    Ok(blocks)
}

/// Id list of the first CHILD relationship; other kinds are ignored.
fn child_ids(relationships: &[OcrRelationship]) -> Vec<String> {
    relationships
        .iter()
        .find(|r| r.relationship_type == OcrRelationshipType::Child)
        .map(|r| r.ids.clone())
        .unwrap_or_default()
}

/// Run the OCR path for one page: render the page image, detect text, and
/// convert the regions.
///
/// A service error or a malformed response is absorbed into an empty block
/// list and logged; it is never raised past this boundary. A failure to
/// render the page image is a page-read failure and propagates.
pub(crate) fn ocr_blocks<S: PageSource + ?Sized, O: OcrEngine + ?Sized>(
    source: &S,
    engine: &O,
    page_number: u32,
) -> Result<Vec<Block>> {
    let image = source.render_image()?;
    let regions = match engine.detect_text(&image) {
        Ok(regions) => regions,
        Err(e) => {
            log::error!("OCR failed for page {page_number}: {e}");
            return Ok(Vec::new());
        }
    };
    match convert_regions(&regions, page_number) {
        Ok(blocks) => Ok(blocks),
        Err(e) => {
            log::error!("malformed OCR response for page {page_number}: {e}");
            Ok(Vec::new())
        }
    }
}

//! Block extraction: strategy selection and page-level entry points.
//!
//! Per page, the selector either runs the native-text aligner or routes to
//! OCR, based on an operator override and an image-dominance heuristic. A
//! native-path failure falls back to OCR exactly once; an OCR failure
//! yields an empty block list. Pages are independent of each other, so the
//! multi-page entry point maps them in parallel.

mod native;
mod ocr;

pub use native::align_page;
pub use ocr::{
    convert_regions, OcrEngine, OcrGeometry, OcrRegion, OcrRelationship, OcrRelationshipType,
};

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{Block, BlockRecord, IdGenerator, UuidGenerator};
use crate::source::{PageImage, PageSource};

/// Ratio of total embedded-image area to page area at or above which a page
/// is treated as image-dominated and routed to OCR.
pub const IMAGE_AREA_RATIO_THRESHOLD: f64 = 0.25;

/// Options for page block extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Route to OCR unconditionally, skipping the native-text path.
    pub force_ocr: bool,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the unconditional OCR route.
    pub fn with_force_ocr(mut self, force_ocr: bool) -> Self {
        self.force_ocr = force_ocr;
        self
    }
}

/// Blocks extracted from one page, plus which strategy produced them.
///
/// The annotation UI renders native and OCR pages differently, so the
/// strategy travels with the blocks.
#[derive(Debug, Clone, Default)]
pub struct PageBlocks {
    /// Ordered flat block sequence: each LINE followed by its WORD children
    pub blocks: Vec<Block>,
    /// True when the native-text path produced the blocks
    pub native: bool,
}

impl PageBlocks {
    /// Whether the page yielded no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Project the blocks into their emitted shape, stripping construction
    /// metadata.
    pub fn into_records(self) -> Vec<BlockRecord> {
        self.blocks.into_iter().map(BlockRecord::from).collect()
    }
}

/// Whether a page is image-dominated: the summed area of its embedded
/// raster images covers at least [`IMAGE_AREA_RATIO_THRESHOLD`] of the page
/// area. Pages without images are never image-dominated.
pub fn is_image_dominated(images: &[PageImage], page_width: f64, page_height: f64) -> bool {
    if images.is_empty() {
        return false;
    }
    let page_area = page_width * page_height;
    let image_area: f64 = images.iter().map(PageImage::area).sum();
    let ratio = image_area / page_area;
    log::debug!(
        "image_area = {image_area}, page_area = {page_area}, ratio = {ratio}, threshold = {IMAGE_AREA_RATIO_THRESHOLD}"
    );
    ratio >= IMAGE_AREA_RATIO_THRESHOLD
}

/// Extract the block tree for one page, minting fresh block ids on the
/// native path.
///
/// Strategy: the `force_ocr` override or an image-dominated page routes to
/// OCR; otherwise the native-text aligner runs. Any native-path error is
/// caught, logged, and the page routed to OCR as a single one-shot fallback
/// rather than a retry loop. If OCR also fails the page yields an empty
/// block list.
/// Only a failure to render the page image for OCR propagates.
pub fn extract_page<S, O>(
    source: &S,
    engine: &O,
    page_number: u32,
    options: &ExtractOptions,
) -> Result<PageBlocks>
where
    S: PageSource + ?Sized,
    O: OcrEngine + ?Sized,
{
    extract_page_with_ids(source, engine, page_number, options, &mut UuidGenerator)
}

/// [`extract_page`] with an injected identity-assignment strategy for the
/// native path. The OCR path preserves service-assigned ids and never
/// consults the generator.
pub fn extract_page_with_ids<S, O>(
    source: &S,
    engine: &O,
    page_number: u32,
    options: &ExtractOptions,
    ids: &mut dyn IdGenerator,
) -> Result<PageBlocks>
where
    S: PageSource + ?Sized,
    O: OcrEngine + ?Sized,
{
    match attempt_native(source, page_number, options, ids) {
        Ok(Some(blocks)) => Ok(PageBlocks {
            blocks,
            native: true,
        }),
        Ok(None) => {
            log::debug!(
                "force_ocr = {} or image-dominated page, extracting page {} blocks via OCR",
                options.force_ocr,
                page_number
            );
            Ok(PageBlocks {
                blocks: ocr::ocr_blocks(source, engine, page_number)?,
                native: false,
            })
        }
        Err(e) => {
            log::warn!("native extraction failed for page {page_number} ({e}), falling back to OCR");
            Ok(PageBlocks {
                blocks: ocr::ocr_blocks(source, engine, page_number)?,
                native: false,
            })
        }
    }
}

/// Run the native side: heuristic first, then alignment.
///
/// `Ok(None)` means the page was routed to OCR by policy; `Err` means the
/// native path itself failed and the caller applies the fallback.
fn attempt_native<S: PageSource + ?Sized>(
    source: &S,
    page_number: u32,
    options: &ExtractOptions,
    ids: &mut dyn IdGenerator,
) -> Result<Option<Vec<Block>>> {
    let (width, height) = source.dimensions()?;
    if options.force_ocr || is_image_dominated(&source.images()?, width, height) {
        return Ok(None);
    }
    log::debug!("extracting page {page_number} blocks from native text");
    let text = source.text()?;
    let tokens = source.words()?;
    Ok(Some(align_page(
        &text,
        &tokens,
        page_number,
        width,
        height,
        ids,
    )))
}

/// Extract blocks for a run of pages in parallel.
///
/// Pages are processed independently (blocks, indices, and ids are scoped
/// to a single page invocation) so this is a plain data-parallel map. Page
/// numbers are assigned 1-based in slice order.
pub fn extract_pages<S, O>(
    sources: &[S],
    engine: &O,
    options: &ExtractOptions,
) -> Result<Vec<PageBlocks>>
where
    S: PageSource + Sync,
    O: OcrEngine + Sync,
{
    sources
        .par_iter()
        .enumerate()
        .map(|(i, source)| extract_page(source, engine, (i + 1) as u32, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ExtractOptions::new().with_force_ocr(true);
        assert!(options.force_ocr);
        assert!(!ExtractOptions::default().force_ocr);
    }

    #[test]
    fn test_image_dominated_threshold_is_inclusive() {
        // Area 25 over a 100-pixel page sits exactly on the 0.25 threshold.
        let images = [PageImage::new(20.0, 1.25)];
        assert!(is_image_dominated(&images, 10.0, 10.0));
    }

    #[test]
    fn test_image_dominated_below_threshold() {
        let images = [PageImage::new(20.0, 1.2)];
        assert!(!is_image_dominated(&images, 10.0, 10.0));
    }

    #[test]
    fn test_no_images_is_never_dominated() {
        assert!(!is_image_dominated(&[], 10.0, 10.0));
    }

    #[test]
    fn test_multiple_images_areas_are_summed() {
        let images = [PageImage::new(10.0, 1.5), PageImage::new(10.0, 1.0)];
        assert!(is_image_dominated(&images, 10.0, 10.0));
    }
}

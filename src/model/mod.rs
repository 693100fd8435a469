//! Block model types for page layout representation.
//!
//! This module defines the block tree shared by both extraction paths:
//! LINE and WORD blocks with normalized geometry, parent/child
//! relationships, and identity assignment. The model is source-agnostic and
//! can represent content from digital text or OCR.

mod block;
mod geometry;

pub use block::{
    Block, BlockMeta, BlockRecord, BlockType, IdGenerator, Relationship, RelationshipType,
    SequentialIdGenerator, UuidGenerator,
};
pub use geometry::{BoundingBox, Geometry, Point};

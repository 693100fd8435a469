//! Layout block entities and identity assignment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::Geometry;

/// The kind of a layout block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    /// A line of text
    #[serde(rename = "LINE")]
    Line,
    /// A single word within a line
    #[serde(rename = "WORD")]
    Word,
}

/// The kind of a relationship between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    /// The related ids are this block's children, in reading order.
    #[serde(rename = "CHILD")]
    Child,
}

/// An ordered link from a LINE block to its WORD children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    /// Related block ids, in reading order
    pub ids: Vec<String>,
    /// Relationship kind
    #[serde(rename = "Type")]
    pub relationship_type: RelationshipType,
}

impl Relationship {
    /// Create a CHILD relationship over the given ids.
    pub fn child(ids: Vec<String>) -> Self {
        Self {
            ids,
            relationship_type: RelationshipType::Child,
        }
    }
}

/// Construction-only bookkeeping used while assembling the block tree.
///
/// Links WORD blocks to their LINE by local sequential index during a single
/// page-processing invocation. Stripped by the [`BlockRecord`] projection
/// before blocks leave the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockMeta {
    /// Local sequential index of this block within the page's output.
    pub index: usize,
    /// Index of the owning LINE block; `None` for LINE blocks.
    pub parent_index: Option<usize>,
}

/// A layout block: a LINE of text or one of the WORD blocks composing it.
///
/// WORD blocks may lack geometry only transiently during construction; LINE
/// blocks carry at most one relationship, of type CHILD, listing their WORD
/// children in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block identity; assigned once at creation, never reassigned.
    pub id: String,
    /// LINE or WORD
    pub block_type: BlockType,
    /// Text content
    pub text: String,
    /// Normalized geometry
    pub geometry: Option<Geometry>,
    /// Relationships to other blocks
    pub relationships: Vec<Relationship>,
    /// 1-based page number
    pub page: u32,
    /// Construction-only metadata
    pub meta: BlockMeta,
}

impl Block {
    /// Create a new block with no geometry, relationships, or parent.
    pub fn new(
        id: String,
        block_type: BlockType,
        text: impl Into<String>,
        page: u32,
        index: usize,
    ) -> Self {
        Self {
            id,
            block_type,
            text: text.into(),
            geometry: None,
            relationships: Vec::new(),
            page,
            meta: BlockMeta {
                index,
                parent_index: None,
            },
        }
    }

    /// Set the block geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the owning LINE block's local index.
    pub fn with_parent(mut self, parent_index: usize) -> Self {
        self.meta.parent_index = Some(parent_index);
        self
    }

    /// Extend the block geometry to cover `other`, adopting a copy of
    /// `other` when the block has no geometry yet.
    pub fn extend_geometry(&mut self, other: &Geometry) {
        match &mut self.geometry {
            Some(geometry) => geometry.extend(other),
            None => self.geometry = Some(other.clone()),
        }
    }
}

/// The externally emitted shape of a [`Block`], with construction metadata
/// stripped.
///
/// Field names follow the wire shape the annotation UI consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockRecord {
    /// Block identity
    pub id: String,
    /// LINE or WORD
    pub block_type: BlockType,
    /// Text content
    pub text: String,
    /// Normalized geometry
    pub geometry: Option<Geometry>,
    /// Relationships to other blocks
    pub relationships: Vec<Relationship>,
    /// 1-based page number
    pub page: u32,
}

impl From<Block> for BlockRecord {
    fn from(block: Block) -> Self {
        Self {
            id: block.id,
            block_type: block.block_type,
            text: block.text,
            geometry: block.geometry,
            relationships: block.relationships,
            page: block.page,
        }
    }
}

/// Strategy for assigning block identity.
///
/// The native-text path mints fresh ids; the OCR path preserves the ids the
/// service assigned and bypasses the generator entirely. Tests inject
/// [`SequentialIdGenerator`] for deterministic output.
pub trait IdGenerator {
    /// Produce the next block id.
    fn next_id(&mut self) -> String;
}

/// Default generator producing random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator producing "block-0", "block-1", ...
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIdGenerator {
    next: usize,
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("block-{}", self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::BoundingBox;

    #[test]
    fn test_extend_geometry_copies_when_absent() {
        let mut block = Block::new("b0".to_string(), BlockType::Line, "text", 1, 0);
        assert!(block.geometry.is_none());

        let geometry = Geometry::new(BoundingBox::new(0.1, 0.2, 0.3, 0.4));
        block.extend_geometry(&geometry);
        assert_eq!(block.geometry, Some(geometry));
    }

    #[test]
    fn test_extend_geometry_merges_when_present() {
        let mut block = Block::new("b0".to_string(), BlockType::Line, "text", 1, 0)
            .with_geometry(Geometry::new(BoundingBox::new(5.0, 10.0, 10.0, 20.0)));
        block.extend_geometry(&Geometry::new(BoundingBox::new(10.0, 25.0, 10.0, 10.0)));
        assert_eq!(
            block.geometry.unwrap().bounding_box,
            BoundingBox::new(5.0, 10.0, 15.0, 25.0)
        );
    }

    #[test]
    fn test_record_projection_strips_metadata() {
        let block = Block::new("b1".to_string(), BlockType::Word, "hello", 2, 7).with_parent(3);
        let record = BlockRecord::from(block);
        assert_eq!(record.id, "b1");
        assert_eq!(record.page, 2);

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("Index"));
        assert!(!json.contains("index"));
        assert!(!json.contains("parent"));
    }

    #[test]
    fn test_record_wire_field_names() {
        let mut block = Block::new("b2".to_string(), BlockType::Line, "hi there", 1, 0)
            .with_geometry(Geometry::new(BoundingBox::new(0.1, 0.2, 0.3, 0.4)));
        block
            .relationships
            .push(Relationship::child(vec!["w1".to_string()]));
        let json = serde_json::to_string(&BlockRecord::from(block)).unwrap();

        for key in [
            "\"Id\"",
            "\"BlockType\"",
            "\"LINE\"",
            "\"Text\"",
            "\"Geometry\"",
            "\"BoundingBox\"",
            "\"Polygon\"",
            "\"Left\"",
            "\"Top\"",
            "\"Width\"",
            "\"Height\"",
            "\"X\"",
            "\"Y\"",
            "\"Relationships\"",
            "\"Ids\"",
            "\"Type\"",
            "\"CHILD\"",
            "\"Page\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn test_sequential_id_generator() {
        let mut ids = SequentialIdGenerator::default();
        assert_eq!(ids.next_id(), "block-0");
        assert_eq!(ids.next_id(), "block-1");
    }

    #[test]
    fn test_uuid_generator_is_unique() {
        let mut ids = UuidGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}

//! Normalized geometry primitives.
//!
//! All coordinates are page-normalized: 0.0–1.0 relative to the page width
//! and height. The annotation UI scales them back to the rendered image.

use serde::{Deserialize, Serialize};

/// A point in page-normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in page-normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Box width (>= 0)
    pub width: f64,
    /// Box height (>= 0)
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (left + width).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (top + height).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Minimal box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        BoundingBox {
            left,
            top,
            width: self.right().max(other.right()) - left,
            height: self.bottom().max(other.bottom()) - top,
        }
    }

    /// Whether `other` lies entirely within `self`.
    ///
    /// Edges are compared with a tiny tolerance: boxes store origin plus
    /// extent, so a reconstructed right or bottom edge can land an ulp off
    /// the value it was merged from.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        const EDGE_EPS: f64 = 1e-12;
        self.left <= other.left + EDGE_EPS
            && self.top <= other.top + EDGE_EPS
            && self.right() + EDGE_EPS >= other.right()
            && self.bottom() + EDGE_EPS >= other.bottom()
    }

    /// The four corners in fixed winding order: top-left, top-right,
    /// bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left, self.bottom()),
        ]
    }
}

/// A bounding box together with its four-corner polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// Enclosing box
    pub bounding_box: BoundingBox,
    /// The box corners: top-left, top-right, bottom-right, bottom-left
    pub polygon: Vec<Point>,
}

impl Geometry {
    /// Create a geometry from a bounding box; the polygon is derived from
    /// the box corners.
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            polygon: bounding_box.corners().to_vec(),
        }
    }

    /// Extend to cover `other`. The polygon is regenerated from the merged
    /// box, never unioned point-by-point.
    pub fn extend(&mut self, other: &Geometry) {
        self.bounding_box = self.bounding_box.union(&other.bounding_box);
        self.polygon = self.bounding_box.corners().to_vec();
    }
}

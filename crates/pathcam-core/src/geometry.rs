//! Geometry model for layered vector documents
//!
//! The host pipeline supplies documents as ordered layers of polyline
//! paths, all in a single coordinate system. Layers are processed in
//! document order, paths within a layer in order, points within a path
//! in order.

use serde::{Deserialize, Serialize};

/// A 2D point in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in document units
    pub x: f64,
    /// Y coordinate in document units
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards another point
    ///
    /// `t` in [0, 1]; 0 yields `self`, 1 yields `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// An ordered sequence of points traced as connected segments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    /// The points of the path, in traversal order
    pub points: Vec<Point>,
}

impl Polyline {
    /// Create a polyline from a point sequence
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create a polyline from (x, y) pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            points: pairs.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    /// Total traced length of the path
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Check whether the path is degenerate
    ///
    /// A path with fewer than two points, or whose total length is zero,
    /// produces no motion and is skipped with a warning.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.length() == 0.0
    }
}

/// An ordered subset of the document's paths sharing one resolved
/// configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    /// The paths of the layer, in document order
    pub paths: Vec<Polyline>,
}

impl Layer {
    /// Create a layer from a path collection
    pub fn new(paths: Vec<Polyline>) -> Self {
        Self { paths }
    }
}

/// A complete vector document: ordered layers of paths
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// The layers of the document, in processing order
    pub layers: Vec<Layer>,
}

impl Document {
    /// Create a document from a layer collection
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }
}

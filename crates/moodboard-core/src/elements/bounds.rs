//! Axis-aligned bounds shared by every canvas element.

use kurbo::Rect;
use serde::Serialize;

/// Axis-aligned rectangle with its derived edges and center.
///
/// The derived fields are filled in by the constructors from
/// `x, y, width, height` and are never stored separately on an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `x + width`.
    pub right: f64,
    /// `y + height`.
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Bounds {
    /// Create bounds from a top-left corner and a size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            right: x + width,
            bottom: y + height,
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
        }
    }

    /// Create bounds from the left, top, right and bottom edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Convert a kurbo rectangle (normalized first).
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::from_edges(rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Get the bounds as a kurbo Rect, for renderers.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right, self.bottom)
    }

    /// Point hit test. All four edges count as inside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right && y >= self.y && y <= self.bottom
    }

    /// Overlap test. Boxes that only share an edge or a corner do not intersect.
    ///
    /// The comparisons are non-strict on purpose: the strict `<` form of this
    /// test reports touching boxes as overlapping.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.right <= other.x
            || self.x >= other.right
            || self.bottom <= other.y
            || self.y >= other.bottom)
    }

    /// Smallest bounds enclosing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Self::from_rect(self.to_rect().union(other.to_rect()))
    }

    /// Smallest bounds enclosing every item, or `None` when there are none.
    pub fn union_all(items: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        items
            .into_iter()
            .map(|b| b.to_rect())
            .reduce(|acc, rect| acc.union(rect))
            .map(Self::from_rect)
    }

    /// Grow each side by its own amount.
    pub fn expand(&self, left: f64, top: f64, right: f64, bottom: f64) -> Bounds {
        Self::from_edges(self.x - left, self.y - top, self.right + right, self.bottom + bottom)
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        bounds.to_rect()
    }
}

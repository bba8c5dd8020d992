//! Canvas elements: the shared spatial contract, cards and groups.

mod analysis;
mod bounds;
mod card;
mod color;
mod group;
pub mod sizing;

pub use analysis::{
    CardAnalysis, Composition, CompositionStyle, FramingType, Lighting, LightingDirection,
    LightingQuality, LightingType, PerspectiveType,
};
pub use bounds::Bounds;
pub use card::{CardElement, CardRole, CardSource, CardType};
pub use color::{GroupColor, GroupTheme, SerializableColor};
pub use group::GroupElement;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for canvas elements.
pub type ElementId = Uuid;

/// Identifier of the board an element lives on.
pub type BoardId = Uuid;

/// Offset applied to both axes when an element is duplicated.
pub const CLONE_OFFSET: f64 = 20.0;

/// Size used when an element is created without explicit geometry.
pub const DEFAULT_ELEMENT_SIZE: f64 = 280.0;

/// Runtime kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Card,
    Group,
    /// Reserved for free-standing text labels.
    Label,
}

/// Identity, geometry and bookkeeping shared by every element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBase {
    pub(crate) id: ElementId,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) notes: Option<String>,
    pub(crate) is_selected: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl ElementBase {
    /// Create a base at the origin with the default size.
    pub fn new(id: ElementId) -> Self {
        let now = Utc::now();
        Self {
            id,
            x: 0.0,
            y: 0.0,
            width: DEFAULT_ELEMENT_SIZE,
            height: DEFAULT_ELEMENT_SIZE,
            notes: None,
            is_selected: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the modification timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_origin(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.touch();
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        self.touch();
    }

    /// Set the size, clamping each axis to its floor.
    pub(crate) fn set_extent(&mut self, width: f64, height: f64, min_width: f64, min_height: f64) {
        // f64::max drops NaN in favour of the floor.
        self.width = width.max(min_width);
        self.height = height.max(min_height);
        self.touch();
    }

    /// Commit computed bounds as the element's own geometry.
    pub(crate) fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
        self.touch();
    }
}

/// Replace a stored extent that can't be drawn with the element's floor.
pub(crate) fn sanitize_extent(value: f64, floor: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        floor
    }
}

/// Common contract for everything placed on the canvas.
pub trait CanvasElement {
    /// Shared identity and geometry.
    fn base(&self) -> &ElementBase;

    /// Mutable access to shared identity and geometry.
    fn base_mut(&mut self) -> &mut ElementBase;

    /// Runtime kind.
    fn kind(&self) -> ElementKind;

    /// Width floor applied by [`CanvasElement::resize`].
    fn min_width(&self) -> f64;

    /// Height floor applied by [`CanvasElement::resize`].
    fn min_height(&self) -> f64;

    /// Plain JSON form for clipboard and export.
    fn to_json(&self) -> serde_json::Value;

    /// Copy with a fresh id, offset by [`CLONE_OFFSET`].
    fn duplicate(&self) -> Self
    where
        Self: Sized;

    fn id(&self) -> ElementId {
        self.base().id
    }

    fn x(&self) -> f64 {
        self.base().x
    }

    fn y(&self) -> f64 {
        self.base().y
    }

    fn width(&self) -> f64 {
        self.base().width
    }

    fn height(&self) -> f64 {
        self.base().height
    }

    fn notes(&self) -> Option<&str> {
        self.base().notes.as_deref()
    }

    fn is_selected(&self) -> bool {
        self.base().is_selected
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.base().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.base().updated_at
    }

    /// Current bounds, derived from the live geometry.
    fn bounds(&self) -> Bounds {
        let base = self.base();
        Bounds::new(base.x, base.y, base.width, base.height)
    }

    /// Move the top-left corner to an absolute position.
    fn move_to(&mut self, x: f64, y: f64) {
        self.base_mut().set_origin(x, y);
    }

    /// Move by a relative offset.
    fn move_by(&mut self, dx: f64, dy: f64) {
        self.base_mut().translate(dx, dy);
    }

    /// Resize, clamping each axis to the element's minimum.
    fn resize(&mut self, width: f64, height: f64) {
        let (min_width, min_height) = (self.min_width(), self.min_height());
        self.base_mut().set_extent(width, height, min_width, min_height);
    }

    fn select(&mut self) {
        self.base_mut().is_selected = true;
    }

    fn deselect(&mut self) {
        self.base_mut().is_selected = false;
    }

    fn toggle_selection(&mut self) {
        let base = self.base_mut();
        base.is_selected = !base.is_selected;
    }

    /// Replace the notes.
    fn set_notes(&mut self, notes: Option<String>) {
        let base = self.base_mut();
        base.notes = notes;
        base.touch();
    }

    /// Check if a canvas point lies on or inside the element.
    fn contains_point(&self, x: f64, y: f64) -> bool {
        self.bounds().contains_point(x, y)
    }

    /// Check if the element overlaps the given bounds.
    fn intersects(&self, other: &Bounds) -> bool {
        self.bounds().intersects(other)
    }

    /// Check if the element overlaps another element.
    fn intersects_element(&self, other: &dyn CanvasElement) -> bool {
        self.intersects(&other.bounds())
    }
}

/// Enum wrapper for all element types, as stored in the selection arena.
#[derive(Debug, Clone)]
pub enum Element {
    Card(CardElement),
    Group(GroupElement),
}

impl Element {
    /// Check if this element is a card.
    pub fn is_card(&self) -> bool {
        matches!(self, Element::Card(_))
    }

    /// Check if this element is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Element::Group(_))
    }

    pub fn as_card(&self) -> Option<&CardElement> {
        match self {
            Element::Card(c) => Some(c),
            Element::Group(_) => None,
        }
    }

    pub fn as_card_mut(&mut self) -> Option<&mut CardElement> {
        match self {
            Element::Card(c) => Some(c),
            Element::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupElement> {
        match self {
            Element::Group(g) => Some(g),
            Element::Card(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupElement> {
        match self {
            Element::Group(g) => Some(g),
            Element::Card(_) => None,
        }
    }
}

// Geometry mutators are forwarded explicitly so that per-type overrides
// (locked groups) apply when elements are driven through the arena.
impl CanvasElement for Element {
    fn base(&self) -> &ElementBase {
        match self {
            Element::Card(c) => c.base(),
            Element::Group(g) => g.base(),
        }
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        match self {
            Element::Card(c) => c.base_mut(),
            Element::Group(g) => g.base_mut(),
        }
    }

    fn kind(&self) -> ElementKind {
        match self {
            Element::Card(c) => c.kind(),
            Element::Group(g) => g.kind(),
        }
    }

    fn min_width(&self) -> f64 {
        match self {
            Element::Card(c) => c.min_width(),
            Element::Group(g) => g.min_width(),
        }
    }

    fn min_height(&self) -> f64 {
        match self {
            Element::Card(c) => c.min_height(),
            Element::Group(g) => g.min_height(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Element::Card(c) => c.to_json(),
            Element::Group(g) => g.to_json(),
        }
    }

    fn duplicate(&self) -> Self {
        match self {
            Element::Card(c) => Element::Card(c.duplicate()),
            Element::Group(g) => Element::Group(g.duplicate()),
        }
    }

    fn move_to(&mut self, x: f64, y: f64) {
        match self {
            Element::Card(c) => c.move_to(x, y),
            Element::Group(g) => g.move_to(x, y),
        }
    }

    fn move_by(&mut self, dx: f64, dy: f64) {
        match self {
            Element::Card(c) => c.move_by(dx, dy),
            Element::Group(g) => g.move_by(dx, dy),
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        match self {
            Element::Card(c) => c.resize(width, height),
            Element::Group(g) => g.resize(width, height),
        }
    }
}

impl From<CardElement> for Element {
    fn from(card: CardElement) -> Self {
        Element::Card(card)
    }
}

impl From<GroupElement> for Element {
    fn from(group: GroupElement) -> Self {
        Element::Group(group)
    }
}

//! Group element: a titled frame around a set of cards.
//!
//! A group stores only the ids of its children. Geometry that depends on the
//! children is computed from the elements the caller passes in, so the group
//! never reaches into a registry on its own.

use super::{
    BoardId, Bounds, CLONE_OFFSET, CanvasElement, CardElement, ElementBase, ElementId,
    ElementKind, GroupColor, sanitize_extent,
};
use crate::records::GroupRecord;
use serde_json::json;
use uuid::Uuid;

/// A group of cards that can be moved and styled as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupElement {
    base: ElementBase,
    board_id: BoardId,
    title: String,
    color: GroupColor,
    collapsed: bool,
    locked: bool,
    child_ids: Vec<ElementId>,
    /// Cleared by an explicit resize, restored by `fit_to_children`.
    auto_fit: bool,
}

impl GroupElement {
    /// Height of the title bar above the content.
    pub const HEADER_HEIGHT: f64 = 48.0;
    /// Space between the content and the group frame.
    pub const PADDING: f64 = 16.0;
    pub const MIN_WIDTH: f64 = 200.0;
    pub const MIN_HEIGHT: f64 = 150.0;
    pub const DEFAULT_WIDTH: f64 = 400.0;
    pub const DEFAULT_HEIGHT: f64 = 300.0;
    pub const DEFAULT_TITLE: &'static str = "Untitled Group";

    /// Create an empty group at the origin.
    pub fn new(board_id: BoardId) -> Self {
        let mut base = ElementBase::new(Uuid::new_v4());
        base.width = Self::DEFAULT_WIDTH;
        base.height = Self::DEFAULT_HEIGHT;

        Self {
            base,
            board_id,
            title: Self::DEFAULT_TITLE.to_string(),
            color: GroupColor::default(),
            collapsed: false,
            locked: false,
            child_ids: Vec::new(),
            auto_fit: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_color(mut self, color: GroupColor) -> Self {
        self.color = color;
        self
    }

    /// Build a group around `cards`, sized to enclose them.
    ///
    /// Callers check that at least two cards are supplied.
    pub fn create_from_cards<'a>(
        board_id: BoardId,
        cards: impl IntoIterator<Item = &'a CardElement>,
    ) -> Self {
        let cards: Vec<&CardElement> = cards.into_iter().collect();
        let mut group = Self::new(board_id).with_title("New Group");
        group.add_children(cards.iter().map(|c| c.id()));
        group.fit_to_children(cards.iter().copied());
        group
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color(&self) -> GroupColor {
        self.color
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the bounds follow the children.
    pub fn auto_fit(&self) -> bool {
        self.auto_fit
    }

    pub fn child_ids(&self) -> &[ElementId] {
        &self.child_ids
    }

    pub fn is_empty(&self) -> bool {
        self.child_ids.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.child_ids.len()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.base.touch();
    }

    pub fn set_color(&mut self, color: GroupColor) {
        self.color = color;
        self.base.touch();
    }

    pub fn collapse(&mut self) {
        self.collapsed = true;
        self.base.touch();
    }

    pub fn expand(&mut self) {
        self.collapsed = false;
        self.base.touch();
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
        self.base.touch();
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.base.touch();
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.base.touch();
    }

    pub fn toggle_locked(&mut self) {
        self.locked = !self.locked;
        self.base.touch();
    }

    /// Add a child id. Returns false if it was already a child.
    pub fn add_child(&mut self, id: ElementId) -> bool {
        if id == self.base.id || self.child_ids.contains(&id) {
            return false;
        }
        self.child_ids.push(id);
        self.base.touch();
        true
    }

    pub fn add_children(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        for id in ids {
            self.add_child(id);
        }
    }

    /// Remove a child id. Returns false if it was not a child.
    pub fn remove_child(&mut self, id: ElementId) -> bool {
        let Some(index) = self.child_ids.iter().position(|c| *c == id) else {
            return false;
        };
        self.child_ids.remove(index);
        self.base.touch();
        true
    }

    pub fn has_child(&self, id: ElementId) -> bool {
        self.child_ids.contains(&id)
    }

    pub fn clear_children(&mut self) {
        if !self.child_ids.is_empty() {
            self.child_ids.clear();
            self.base.touch();
        }
    }

    /// Frame that encloses `children` with padding and room for the header.
    ///
    /// Returns `None` when no children are given.
    pub fn calculate_bounds_from_children<'a, E>(
        children: impl IntoIterator<Item = &'a E>,
    ) -> Option<Bounds>
    where
        E: CanvasElement + ?Sized + 'a,
    {
        let content = Bounds::union_all(children.into_iter().map(|c| c.bounds()))?;
        Some(content.expand(
            Self::PADDING,
            Self::PADDING + Self::HEADER_HEIGHT,
            Self::PADDING,
            Self::PADDING,
        ))
    }

    /// Snap the group's bounds around `children` and resume auto-fitting.
    ///
    /// Does nothing for an empty slice or a locked group. Returns whether the
    /// bounds were applied.
    pub fn fit_to_children<'a, E>(&mut self, children: impl IntoIterator<Item = &'a E>) -> bool
    where
        E: CanvasElement + ?Sized + 'a,
    {
        let Some(bounds) = Self::calculate_bounds_from_children(children) else {
            return false;
        };
        if !self.set_fitted_bounds(bounds) {
            return false;
        }
        self.auto_fit = true;
        true
    }

    /// Commit bounds computed from the children, leaving `auto_fit` alone.
    pub(crate) fn set_fitted_bounds(&mut self, bounds: Bounds) -> bool {
        if self.locked {
            return false;
        }
        self.base.set_bounds(bounds);
        true
    }

    /// Move the group and exactly the supplied children by the same delta.
    ///
    /// Returns false, moving nothing, when the group is locked.
    pub fn move_with_children<'a, E>(
        &mut self,
        dx: f64,
        dy: f64,
        children: impl IntoIterator<Item = &'a mut E>,
    ) -> bool
    where
        E: CanvasElement + ?Sized + 'a,
    {
        if self.locked {
            return false;
        }
        self.base.translate(dx, dy);
        for child in children {
            child.move_by(dx, dy);
        }
        true
    }

    /// Flatten into the persisted record shape.
    pub fn to_record(&self) -> GroupRecord {
        GroupRecord {
            id: self.base.id,
            board_id: self.board_id,
            title: self.title.clone(),
            color: self.color,
            collapsed: self.collapsed,
            locked: self.locked,
            notes: self.base.notes.clone(),
            x: self.base.x,
            y: self.base.y,
            width: self.base.width,
            height: self.base.height,
            created_at: self.base.created_at,
        }
    }

    /// Rebuild a group from its record. Membership lives on the cards, so the
    /// caller supplies the child ids.
    pub fn from_record(record: &GroupRecord, child_ids: Vec<ElementId>) -> Self {
        let mut base = ElementBase::new(record.id);
        base.x = record.x;
        base.y = record.y;
        base.width = sanitize_extent(record.width, Self::MIN_WIDTH);
        base.height = sanitize_extent(record.height, Self::MIN_HEIGHT);
        base.notes = record.notes.clone();
        base.created_at = record.created_at;

        let mut group = Self {
            base,
            board_id: record.board_id,
            title: record.title.clone(),
            color: record.color,
            collapsed: record.collapsed,
            locked: record.locked,
            child_ids: Vec::new(),
            auto_fit: true,
        };
        group.add_children(child_ids);
        group
    }
}

impl CanvasElement for GroupElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Group
    }

    fn min_width(&self) -> f64 {
        Self::MIN_WIDTH
    }

    fn min_height(&self) -> f64 {
        Self::MIN_HEIGHT
    }

    fn move_to(&mut self, x: f64, y: f64) {
        if !self.locked {
            self.base.set_origin(x, y);
        }
    }

    fn move_by(&mut self, dx: f64, dy: f64) {
        if !self.locked {
            self.base.translate(dx, dy);
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        if self.locked {
            return;
        }
        self.base
            .set_extent(width, height, Self::MIN_WIDTH, Self::MIN_HEIGHT);
        self.auto_fit = false;
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.base.id,
            "type": self.kind(),
            "boardId": self.board_id,
            "title": self.title,
            "color": self.color,
            "collapsed": self.collapsed,
            "locked": self.locked,
            "childIds": self.child_ids,
            "notes": self.base.notes,
            "x": self.base.x,
            "y": self.base.y,
            "width": self.base.width,
            "height": self.base.height,
            "createdAt": self.base.created_at,
            "updatedAt": self.base.updated_at,
        })
    }

    fn duplicate(&self) -> Self {
        let mut base = ElementBase::new(Uuid::new_v4());
        base.x = self.base.x + CLONE_OFFSET;
        base.y = self.base.y + CLONE_OFFSET;
        base.width = self.base.width;
        base.height = self.base.height;
        base.notes = self.base.notes.clone();

        Self {
            base,
            board_id: self.board_id,
            title: format!("{} (copy)", self.title),
            color: self.color,
            collapsed: false,
            locked: false,
            child_ids: Vec::new(),
            auto_fit: self.auto_fit,
        }
    }
}

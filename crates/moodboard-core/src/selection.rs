//! Selection and grouping state for one open board.
//!
//! The manager owns every live element in an id-keyed arena. Relations
//! between elements (card to group, group to children) are ids only, and
//! every removal cascades so no id is left pointing at nothing.

use crate::elements::{
    BoardId, Bounds, CanvasElement, CardElement, Element, ElementId, GroupElement,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// What `delete_selection` removed and what it left to persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Every element that was unregistered, cards and groups alike.
    pub deleted_ids: Vec<ElementId>,
    /// Subset of `deleted_ids` that were groups.
    pub deleted_group_ids: Vec<ElementId>,
    /// Cards that survived but lost their group.
    pub orphaned_card_ids: Vec<ElementId>,
    /// Surviving groups whose bounds changed after losing children.
    pub refitted_group_ids: Vec<ElementId>,
}

impl DeleteOutcome {
    pub fn is_empty(&self) -> bool {
        self.deleted_ids.is_empty()
    }
}

/// What `group_selection` created and what else it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub group_id: ElementId,
    /// Cards now carrying `group_id`.
    pub card_ids: Vec<ElementId>,
    /// Previous groups of those cards whose bounds changed.
    pub refitted_group_ids: Vec<ElementId>,
}

/// Clipboard form of the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SerializedSelection {
    pub cards: Vec<serde_json::Value>,
    pub groups: Vec<serde_json::Value>,
}

/// Registry of live elements plus the current multi-selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    elements: HashMap<ElementId, Element>,
    /// Registration order, for deterministic iteration.
    order: Vec<ElementId>,
    /// Ids of registered groups.
    groups: HashSet<ElementId>,
    selected: HashSet<ElementId>,
}

impl SelectionManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, replacing any element with the same id.
    pub fn register_element(&mut self, element: Element) {
        let id = element.id();
        if element.is_group() {
            self.groups.insert(id);
        } else {
            self.groups.remove(&id);
        }
        if element.is_selected() {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
        log::trace!("Registered {:?} {}", element.kind(), id);
        if self.elements.insert(id, element).is_none() {
            self.order.push(id);
        }
    }

    pub fn register_elements(&mut self, elements: impl IntoIterator<Item = Element>) {
        for element in elements {
            self.register_element(element);
        }
    }

    /// Remove an element and every reference to it.
    ///
    /// The id leaves the selection and every group's children. Removing a
    /// group clears `group_id` on its registered cards. Auto-fitting groups
    /// that lost a child are refitted.
    pub fn unregister_element(&mut self, id: ElementId) -> Option<Element> {
        self.remove_element(id).map(|(element, _)| element)
    }

    /// Like `unregister_element`, also returning the groups whose bounds
    /// changed because they lost `id`.
    pub fn remove_element(&mut self, id: ElementId) -> Option<(Element, Vec<ElementId>)> {
        self.remove_entry(id)
    }

    /// Drop every element and the selection.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
        self.groups.clear();
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn card(&self, id: ElementId) -> Option<&CardElement> {
        self.elements.get(&id).and_then(Element::as_card)
    }

    pub fn card_mut(&mut self, id: ElementId) -> Option<&mut CardElement> {
        self.elements.get_mut(&id).and_then(Element::as_card_mut)
    }

    pub fn group(&self, id: ElementId) -> Option<&GroupElement> {
        self.elements.get(&id).and_then(Element::as_group)
    }

    pub fn group_mut(&mut self, id: ElementId) -> Option<&mut GroupElement> {
        self.elements.get_mut(&id).and_then(Element::as_group_mut)
    }

    /// All elements in registration order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// All groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupElement> {
        self.elements().filter_map(Element::as_group)
    }

    // --- Selection set ---

    /// Add an element to the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.select();
            self.selected.insert(id);
        }
    }

    /// Make `id` the only selected element.
    pub fn select_only(&mut self, id: ElementId) {
        self.deselect_all();
        self.select(id);
    }

    pub fn select_multiple(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        for id in ids {
            self.select(id);
        }
    }

    pub fn select_all(&mut self) {
        for (id, element) in &mut self.elements {
            element.select();
            self.selected.insert(*id);
        }
    }

    pub fn deselect(&mut self, id: ElementId) {
        if self.selected.remove(&id) {
            if let Some(element) = self.elements.get_mut(&id) {
                element.deselect();
            }
        }
    }

    pub fn deselect_all(&mut self) {
        for id in self.selected.drain() {
            if let Some(element) = self.elements.get_mut(&id) {
                element.deselect();
            }
        }
    }

    pub fn toggle(&mut self, id: ElementId) {
        if self.selected.contains(&id) {
            self.deselect(id);
        } else {
            self.select(id);
        }
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in registration order.
    pub fn selected_ids(&self) -> Vec<ElementId> {
        self.order
            .iter()
            .filter(|id| self.selected.contains(*id))
            .copied()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn selected_cards(&self) -> Vec<&CardElement> {
        self.selected_elements().filter_map(Element::as_card).collect()
    }

    pub fn selected_groups(&self) -> Vec<&GroupElement> {
        self.selected_elements().filter_map(Element::as_group).collect()
    }

    fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements().filter(|e| self.selected.contains(&e.id()))
    }

    /// Add every element overlapping `bounds` to the selection.
    ///
    /// The current selection is kept. Returns the ids that overlap.
    pub fn select_in_bounds(&mut self, bounds: &Bounds) -> Vec<ElementId> {
        let hits: Vec<ElementId> = self
            .elements()
            .filter(|e| e.intersects(bounds))
            .map(|e| e.id())
            .collect();
        for id in &hits {
            self.select(*id);
        }
        hits
    }

    /// Union of the selected elements' bounds.
    pub fn selection_bounds(&self) -> Option<Bounds> {
        Bounds::union_all(self.selected_elements().map(|e| e.bounds()))
    }

    // --- Grouping ---

    /// At least two cards and no groups are selected.
    pub fn can_group(&self) -> bool {
        let mut cards = 0;
        for element in self.selected_elements() {
            match element {
                Element::Card(_) => cards += 1,
                Element::Group(_) => return false,
            }
        }
        cards >= 2
    }

    /// Wrap the selected cards in a new group and register it.
    ///
    /// Returns the new group's id. Use `group_selection` to also learn which
    /// existing groups were refitted.
    pub fn create_group_from_selection(&mut self, board_id: BoardId) -> Option<ElementId> {
        self.group_selection(board_id).map(|outcome| outcome.group_id)
    }

    /// Wrap the selected cards in a new group and register it.
    ///
    /// Cards already in another group are moved out of it first, and that
    /// group is refitted. The caller persists the new group, the cards and
    /// every refitted group.
    pub fn group_selection(&mut self, board_id: BoardId) -> Option<GroupOutcome> {
        if !self.can_group() {
            return None;
        }

        let card_ids: Vec<ElementId> = self.selected_cards().iter().map(|c| c.id()).collect();

        let mut previous_groups = Vec::new();
        for card_id in &card_ids {
            let Some(old_group) = self.card(*card_id).and_then(CardElement::group_id) else {
                continue;
            };
            if let Some(group) = self.group_mut(old_group) {
                group.remove_child(*card_id);
            }
            if !previous_groups.contains(&old_group) {
                previous_groups.push(old_group);
            }
        }

        let group = {
            let cards: Vec<&CardElement> =
                card_ids.iter().filter_map(|id| self.card(*id)).collect();
            GroupElement::create_from_cards(board_id, cards)
        };
        let group_id = group.id();

        for card_id in &card_ids {
            if let Some(card) = self.card_mut(*card_id) {
                card.set_group_id(Some(group_id));
            }
        }
        self.register_element(group.into());
        let refitted_group_ids = self.refit_upwards(previous_groups, &HashSet::new());

        log::debug!("Grouped {} cards into {}", card_ids.len(), group_id);
        Some(GroupOutcome {
            group_id,
            card_ids,
            refitted_group_ids,
        })
    }

    /// Dissolve every selected group.
    ///
    /// Returns the cards that were freed. Children that aren't registered are
    /// skipped.
    pub fn ungroup_selection(&mut self) -> Vec<ElementId> {
        let group_ids: Vec<ElementId> = self.selected_groups().iter().map(|g| g.id()).collect();
        let mut freed = Vec::new();

        for group_id in group_ids {
            let child_ids = self
                .group(group_id)
                .map(|g| g.child_ids().to_vec())
                .unwrap_or_default();
            for child_id in child_ids {
                if let Some(card) = self.card_mut(child_id) {
                    card.set_group_id(None);
                    freed.push(child_id);
                }
            }
            self.remove_entry(group_id);
            log::debug!("Ungrouped {}", group_id);
        }

        freed
    }

    // --- Move and delete ---

    /// Move the selection by a delta.
    ///
    /// A selected group carries its whole subtree, so an element moves at most
    /// once even when it is also selected. Locked groups stay put. Groups whose
    /// children moved without them are refitted. Returns every id whose
    /// geometry changed.
    pub fn move_selection(&mut self, dx: f64, dy: f64) -> Vec<ElementId> {
        let selected = self.selected_ids();
        let mut moved: HashSet<ElementId> = HashSet::new();
        let mut changed = Vec::new();

        let selected_groups: Vec<ElementId> = selected
            .iter()
            .filter(|id| self.groups.contains(*id))
            .copied()
            .collect();
        for id in selected_groups {
            if moved.contains(&id) || self.group(id).is_some_and(GroupElement::is_locked) {
                continue;
            }
            for member in self.subtree(id) {
                if !moved.insert(member) {
                    continue;
                }
                // Descendants travel with the group even if they are locked.
                if let Some(element) = self.elements.get_mut(&member) {
                    element.base_mut().translate(dx, dy);
                    changed.push(member);
                }
            }
        }

        let mut independent = Vec::new();
        for id in &selected {
            if moved.contains(id) || self.groups.contains(id) {
                continue;
            }
            if let Some(element) = self.elements.get_mut(id) {
                element.move_by(dx, dy);
                moved.insert(*id);
                changed.push(*id);
                independent.push(*id);
            }
        }

        // Selected groups that moved on their own also leave their parent.
        for id in &selected {
            if self.groups.contains(id) && moved.contains(id) {
                independent.push(*id);
            }
        }

        let owners: Vec<ElementId> = independent
            .iter()
            .flat_map(|id| self.parents_of(*id))
            .collect();
        changed.extend(self.refit_upwards(owners, &moved));

        log::trace!("Moved {} elements by ({}, {})", changed.len(), dx, dy);
        changed
    }

    /// Delete everything selected.
    ///
    /// Unselected children of a deleted group survive as loose cards and are
    /// reported in `orphaned_card_ids`. A selected child is deleted outright.
    pub fn delete_selection(&mut self) -> DeleteOutcome {
        let selected = self.selected_ids();
        let mut outcome = DeleteOutcome::default();

        for id in &selected {
            let Some(group) = self.group(*id) else {
                continue;
            };
            let group_id = group.id();
            let children: Vec<ElementId> = group
                .child_ids()
                .iter()
                .filter(|c| !self.selected.contains(*c))
                .copied()
                .collect();
            for child_id in children {
                if let Some(card) = self.card_mut(child_id) {
                    if card.group_id() == Some(group_id) {
                        card.set_group_id(None);
                        outcome.orphaned_card_ids.push(child_id);
                    }
                }
            }
        }

        for id in selected {
            let Some((element, refitted)) = self.remove_entry(id) else {
                continue;
            };
            if element.is_group() {
                outcome.deleted_group_ids.push(id);
            }
            outcome.deleted_ids.push(id);
            for group_id in refitted {
                if !outcome.refitted_group_ids.contains(&group_id) {
                    outcome.refitted_group_ids.push(group_id);
                }
            }
        }
        outcome
            .refitted_group_ids
            .retain(|id| self.elements.contains_key(id));

        log::debug!(
            "Deleted {} elements, orphaned {} cards",
            outcome.deleted_ids.len(),
            outcome.orphaned_card_ids.len()
        );
        outcome
    }

    /// JSON form of the selected cards and groups. Does not mutate state.
    pub fn serialize_selection(&self) -> SerializedSelection {
        let mut out = SerializedSelection::default();
        for element in self.selected_elements() {
            match element {
                Element::Card(card) => out.cards.push(card.to_json()),
                Element::Group(group) => out.groups.push(group.to_json()),
            }
        }
        out
    }

    // --- Internals ---

    fn remove_entry(&mut self, id: ElementId) -> Option<(Element, Vec<ElementId>)> {
        let mut element = self.elements.remove(&id)?;
        self.order.retain(|e| *e != id);
        self.groups.remove(&id);
        self.selected.remove(&id);
        element.deselect();

        let mut owners = Vec::new();
        let group_ids: Vec<ElementId> = self
            .order
            .iter()
            .filter(|g| self.groups.contains(*g))
            .copied()
            .collect();
        for group_id in group_ids {
            if let Some(group) = self.group_mut(group_id) {
                if group.remove_child(id) {
                    owners.push(group_id);
                }
            }
        }

        if let Element::Group(group) = &element {
            for child_id in group.child_ids() {
                if let Some(card) = self.card_mut(*child_id) {
                    if card.group_id() == Some(id) {
                        card.set_group_id(None);
                    }
                }
            }
        }

        let refitted = self.refit_upwards(owners, &HashSet::new());
        log::trace!("Unregistered {:?} {}", element.kind(), id);
        Some((element, refitted))
    }

    /// The root followed by every registered descendant, depth first.
    fn subtree(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) || !self.elements.contains_key(&id) {
                continue;
            }
            out.push(id);
            if let Some(group) = self.group(id) {
                stack.extend(group.child_ids().iter().rev().copied());
            }
        }
        out
    }

    /// Registered groups listing `id` as a child.
    fn parents_of(&self, id: ElementId) -> Vec<ElementId> {
        self.groups()
            .filter(|g| g.has_child(id))
            .map(|g| g.id())
            .collect()
    }

    /// Refit `start` and, for each group that changed, its own parents.
    fn refit_upwards(
        &mut self,
        start: Vec<ElementId>,
        skip: &HashSet<ElementId>,
    ) -> Vec<ElementId> {
        let mut stack = start;
        let mut seen = HashSet::new();
        let mut refitted = Vec::new();
        while let Some(group_id) = stack.pop() {
            if skip.contains(&group_id) || !seen.insert(group_id) {
                continue;
            }
            if self.refit_group(group_id) {
                refitted.push(group_id);
                stack.extend(self.parents_of(group_id));
            }
        }
        refitted
    }

    fn refit_group(&mut self, group_id: ElementId) -> bool {
        let bounds = {
            let Some(group) = self.group(group_id) else {
                return false;
            };
            if !group.auto_fit() || group.is_locked() {
                return false;
            }
            let children = group
                .child_ids()
                .iter()
                .filter_map(|id| self.elements.get(id));
            GroupElement::calculate_bounds_from_children(children)
        };
        let Some(bounds) = bounds else {
            return false;
        };
        let Some(group) = self.group_mut(group_id) else {
            return false;
        };
        if group.bounds() == bounds {
            return false;
        }
        let applied = group.set_fitted_bounds(bounds);
        if applied {
            log::trace!("Refitted group {}", group_id);
        }
        applied
    }
}

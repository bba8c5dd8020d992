//! Flat record shapes exchanged with the persistence layer.
//!
//! Records mirror the board's tables: one row per card and per group. Group
//! membership is stored only on the card (`group_id`); groups' child lists
//! are rebuilt when a board is loaded.

use crate::elements::{
    BoardId, CanvasElement, CardAnalysis, CardElement, CardRole, CardSource, CardType, Element,
    ElementId, GroupColor, GroupElement,
};
use crate::selection::SelectionManager;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised while converting records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Unknown group color: {0}")]
    UnknownColor(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for record conversions.
pub type RecordResult<T> = Result<T, RecordError>;

/// Persisted card row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCard {
    pub id: ElementId,
    pub board_id: BoardId,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub source: CardSource,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub role: Option<CardRole>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub position: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub embed_html: Option<String>,
    #[serde(default)]
    pub analysis: Option<CardAnalysis>,
    #[serde(default)]
    pub group_id: Option<ElementId>,
    pub created_at: DateTime<Utc>,
}

/// Persisted group row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: ElementId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default)]
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
}

/// Every record of one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board_id: BoardId,
    #[serde(default)]
    pub cards: Vec<ReferenceCard>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

impl BoardSnapshot {
    /// Create an empty snapshot for a board.
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            cards: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Capture every element registered with `manager`.
    pub fn from_manager(board_id: BoardId, manager: &SelectionManager) -> Self {
        let mut snapshot = Self::new(board_id);
        for element in manager.elements() {
            match element {
                Element::Card(card) => snapshot.cards.push(card.to_reference_card()),
                Element::Group(group) => snapshot.groups.push(group.to_record()),
            }
        }
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.groups.is_empty()
    }

    /// Insert or replace a card row.
    pub fn upsert_card(&mut self, record: ReferenceCard) {
        match self.cards.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => self.cards.push(record),
        }
    }

    /// Insert or replace a group row.
    pub fn upsert_group(&mut self, record: GroupRecord) {
        match self.groups.iter_mut().find(|g| g.id == record.id) {
            Some(existing) => *existing = record,
            None => self.groups.push(record),
        }
    }

    /// Remove a card row. Returns false if it was absent.
    pub fn remove_card(&mut self, id: ElementId) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        self.cards.len() != before
    }

    /// Remove a group row. Returns false if it was absent.
    pub fn remove_group(&mut self, id: ElementId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        self.groups.len() != before
    }

    /// Build a live manager for the board.
    ///
    /// Groups get their children from the cards' `group_id`, in card order. A
    /// card pointing at a group that isn't in the snapshot loses the link.
    pub fn into_manager(self) -> SelectionManager {
        let known_groups: HashSet<ElementId> = self.groups.iter().map(|g| g.id).collect();
        let mut children: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
        let mut manager = SelectionManager::new();

        let mut cards = Vec::with_capacity(self.cards.len());
        for record in &self.cards {
            let mut card = CardElement::from_reference_card(record);
            if let Some(group_id) = card.group_id() {
                if known_groups.contains(&group_id) {
                    children.entry(group_id).or_default().push(card.id());
                } else {
                    log::warn!("Card {} references unknown group {}", card.id(), group_id);
                    card.set_group_id(None);
                }
            }
            cards.push(Element::from(card));
        }
        manager.register_elements(cards);

        for record in &self.groups {
            let child_ids = children.remove(&record.id).unwrap_or_default();
            manager.register_element(GroupElement::from_record(record, child_ids).into());
        }

        manager
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> RecordResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> RecordResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn card_record(board_id: BoardId, group_id: Option<ElementId>) -> ReferenceCard {
        let card = CardElement::new(board_id, CardType::Image, CardSource::Upload, "ref")
            .with_origin(10.0, 10.0);
        let mut record = card.to_reference_card();
        record.group_id = group_id;
        record
    }

    #[test]
    fn test_record_json_is_snake_case() {
        let board = Uuid::new_v4();
        let record = card_record(board, None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["board_id"], board.to_string());
        assert!(value.get("thumbnail_url").is_some());
        assert!(value.get("card_type").is_none());
    }

    #[test]
    fn test_group_record_rejects_unknown_color() {
        let json = r#"{
            "id": "6b3c0a4e-8f7e-4f43-9a53-1f0c7d4a2b10",
            "board_id": "0d5e2c8a-3b1f-4c6e-8a9d-7e2f1b3c4d5e",
            "title": "Looks",
            "color": "mauve",
            "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0,
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let result: Result<GroupRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let ok = json.replace("mauve", "teal");
        let record: GroupRecord = serde_json::from_str(&ok).unwrap();
        assert_eq!(record.color, GroupColor::Teal);
        assert!(!record.locked);
    }

    #[test]
    fn test_into_manager_rebuilds_membership() {
        let board = Uuid::new_v4();
        let group = GroupElement::new(board);
        let a = card_record(board, Some(group.id()));
        let b = card_record(board, Some(group.id()));
        let loose = card_record(board, None);

        let snapshot = BoardSnapshot {
            board_id: board,
            cards: vec![a.clone(), loose.clone(), b.clone()],
            groups: vec![group.to_record()],
        };
        let manager = snapshot.into_manager();

        let restored = manager.group(group.id()).unwrap();
        assert_eq!(restored.child_ids(), [a.id, b.id]);
        assert_eq!(manager.groups().count(), 1);
        assert_eq!(manager.elements().count(), 4);
    }

    #[test]
    fn test_into_manager_clears_dangling_group() {
        let board = Uuid::new_v4();
        let record = card_record(board, Some(Uuid::new_v4()));
        let id = record.id;
        let mut snapshot = BoardSnapshot::new(board);
        snapshot.upsert_card(record);

        let manager = snapshot.into_manager();
        assert!(manager.card(id).unwrap().group_id().is_none());
    }

    #[test]
    fn test_snapshot_round_trip_through_manager() {
        let board = Uuid::new_v4();
        let group = GroupElement::new(board).with_title("Set");
        let mut snapshot = BoardSnapshot::new(board);
        snapshot.upsert_group(group.to_record());
        snapshot.upsert_card(card_record(board, Some(group.id())));
        snapshot.upsert_card(card_record(board, None));

        let json = snapshot.to_json().unwrap();
        let parsed = BoardSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let manager = parsed.into_manager();
        let again = BoardSnapshot::from_manager(board, &manager);
        assert_eq!(again.cards, snapshot.cards);
        assert_eq!(again.groups, snapshot.groups);
    }

    #[test]
    fn test_upsert_and_remove() {
        let board = Uuid::new_v4();
        let mut snapshot = BoardSnapshot::new(board);
        let mut record = card_record(board, None);
        snapshot.upsert_card(record.clone());
        record.title = "renamed".to_string();
        snapshot.upsert_card(record.clone());

        assert_eq!(snapshot.cards.len(), 1);
        assert_eq!(snapshot.cards[0].title, "renamed");
        assert!(snapshot.remove_card(record.id));
        assert!(!snapshot.remove_card(record.id));
        assert!(!snapshot.remove_group(record.id));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_from_json_reports_errors() {
        assert!(matches!(
            BoardSnapshot::from_json("{not json"),
            Err(RecordError::Json(_))
        ));
    }
}

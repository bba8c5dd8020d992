//! Card element: a single reference item placed on the board.

use super::sizing::{self, CARD_MIN_HEIGHT, CARD_MIN_WIDTH};
use super::{
    BoardId, CLONE_OFFSET, CanvasElement, CardAnalysis, ElementBase, ElementId, ElementKind,
    sanitize_extent,
};
use crate::records::ReferenceCard;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

/// What a card holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Image,
    File,
    Link,
    Text,
}

/// Where a card's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
    Upload,
    Instagram,
    Tiktok,
    Youtube,
    Twitter,
    Pinterest,
    Arena,
    Googledoc,
    Notion,
    Web,
}

impl CardSource {
    /// Detect the platform from a URL's host. Unparseable URLs are `Web`.
    pub fn from_url(url: &str) -> Self {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return CardSource::Web;
        };

        let on = |domains: &[&str]| domains.iter().any(|d| host_matches(&host, d));
        if on(&["instagram.com"]) {
            CardSource::Instagram
        } else if on(&["tiktok.com"]) {
            CardSource::Tiktok
        } else if on(&["youtube.com", "youtu.be"]) {
            CardSource::Youtube
        } else if on(&["twitter.com", "x.com"]) {
            CardSource::Twitter
        } else if on(&["pinterest.com"]) {
            CardSource::Pinterest
        } else if on(&["are.na"]) {
            CardSource::Arena
        } else if on(&["docs.google.com"]) {
            CardSource::Googledoc
        } else if on(&["notion.so", "notion.site"]) {
            CardSource::Notion
        } else {
            CardSource::Web
        }
    }

    /// Platforms whose links can be shown as an inline player.
    pub fn is_embeddable(&self) -> bool {
        matches!(
            self,
            CardSource::Tiktok | CardSource::Youtube | CardSource::Twitter
        )
    }
}

/// What aspect of the shoot a reference speaks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardRole {
    Lighting,
    Styling,
    Pose,
    Composition,
    Set,
    Color,
    General,
}

/// A reference card on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CardElement {
    base: ElementBase,
    board_id: BoardId,
    card_type: CardType,
    source: CardSource,
    title: String,
    thumbnail_url: Option<String>,
    source_url: Option<String>,
    file_path: Option<String>,
    tags: Vec<String>,
    role: Option<CardRole>,
    pinned: bool,
    position: i64,
    embed_html: Option<String>,
    analysis: Option<CardAnalysis>,
    group_id: Option<ElementId>,
}

impl CardElement {
    /// Create a card with a fresh id, sized from its type and source.
    pub fn new(
        board_id: BoardId,
        card_type: CardType,
        source: CardSource,
        title: impl Into<String>,
    ) -> Self {
        let size = sizing::default_dimensions(card_type, source, false);
        let mut base = ElementBase::new(Uuid::new_v4());
        base.width = size.width;
        base.height = size.height;

        Self {
            base,
            board_id,
            card_type,
            source,
            title: title.into(),
            thumbnail_url: None,
            source_url: None,
            file_path: None,
            tags: Vec::new(),
            role: None,
            pinned: false,
            position: 0,
            embed_html: None,
            analysis: None,
            group_id: None,
        }
    }

    /// Place the card's top-left corner.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.base.x = x;
        self.base.y = y;
        self
    }

    /// Set the display size. Non-positive values fall back to the minimum.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.base.width = sanitize_extent(width, CARD_MIN_WIDTH);
        self.base.height = sanitize_extent(height, CARD_MIN_HEIGHT);
        self
    }

    /// Set the thumbnail, switching an image card to its thumbnail size.
    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        let size = self.default_dimensions();
        self.base.width = size.width;
        self.base.height = size.height;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedup_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_group_id(mut self, group_id: ElementId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn source(&self) -> CardSource {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn role(&self) -> Option<CardRole> {
        self.role
    }

    pub fn pinned(&self) -> bool {
        self.pinned
    }

    /// Order index among siblings.
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn embed_html(&self) -> Option<&str> {
        self.embed_html.as_deref()
    }

    pub fn analysis(&self) -> Option<&CardAnalysis> {
        self.analysis.as_ref()
    }

    /// Owning group, if any.
    pub fn group_id(&self) -> Option<ElementId> {
        self.group_id
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.base.touch();
    }

    pub fn set_thumbnail_url(&mut self, url: Option<String>) {
        self.thumbnail_url = url;
        self.base.touch();
    }

    pub fn set_embed_html(&mut self, html: Option<String>) {
        self.embed_html = html;
        self.base.touch();
    }

    /// Replace all tags. Later duplicates are dropped.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedup_tags(tags.into_iter().map(Into::into));
        self.base.touch();
    }

    /// Append a tag unless it is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.base.touch();
        }
    }

    /// Remove a tag if present.
    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(index) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(index);
            self.base.touch();
        }
    }

    pub fn set_role(&mut self, role: Option<CardRole>) {
        self.role = role;
        self.base.touch();
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
        self.base.touch();
    }

    pub fn set_position(&mut self, position: i64) {
        self.position = position;
        self.base.touch();
    }

    pub fn set_analysis(&mut self, analysis: Option<CardAnalysis>) {
        self.analysis = analysis;
        self.base.touch();
    }

    pub fn set_group_id(&mut self, group_id: Option<ElementId>) {
        self.group_id = group_id;
        self.base.touch();
    }

    /// Size this card should take for an image of the given natural size.
    pub fn calculate_dimensions_from_image(&self, image_width: f64, image_height: f64) -> Size {
        sizing::dimensions_from_image(image_width, image_height)
    }

    /// Resize to fit a freshly loaded image.
    pub fn apply_image_dimensions(&mut self, image_width: f64, image_height: f64) {
        let size = self.calculate_dimensions_from_image(image_width, image_height);
        self.resize(size.width, size.height);
    }

    /// Type/source based size, used until content-driven sizing applies.
    pub fn default_dimensions(&self) -> Size {
        sizing::default_dimensions(self.card_type, self.source, self.thumbnail_url.is_some())
    }

    /// Flatten into the persisted record shape.
    pub fn to_reference_card(&self) -> ReferenceCard {
        ReferenceCard {
            id: self.base.id,
            board_id: self.board_id,
            card_type: self.card_type,
            source: self.source,
            title: self.title.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            source_url: self.source_url.clone(),
            file_path: self.file_path.clone(),
            notes: self.base.notes.clone(),
            tags: self.tags.clone(),
            role: self.role,
            pinned: self.pinned,
            position: self.position,
            x: self.base.x,
            y: self.base.y,
            width: self.base.width,
            height: self.base.height,
            embed_html: self.embed_html.clone(),
            analysis: self.analysis.clone(),
            group_id: self.group_id,
            created_at: self.base.created_at,
        }
    }

    /// Rebuild a card from its persisted record.
    pub fn from_reference_card(record: &ReferenceCard) -> Self {
        let mut base = ElementBase::new(record.id);
        base.x = record.x;
        base.y = record.y;
        base.width = sanitize_extent(record.width, CARD_MIN_WIDTH);
        base.height = sanitize_extent(record.height, CARD_MIN_HEIGHT);
        base.notes = record.notes.clone();
        base.created_at = record.created_at;

        Self {
            base,
            board_id: record.board_id,
            card_type: record.card_type,
            source: record.source,
            title: record.title.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            source_url: record.source_url.clone(),
            file_path: record.file_path.clone(),
            tags: dedup_tags(record.tags.iter().cloned()),
            role: record.role,
            pinned: record.pinned,
            position: record.position,
            embed_html: record.embed_html.clone(),
            analysis: record.analysis.clone(),
            group_id: record.group_id,
        }
    }
}

impl CanvasElement for CardElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Card
    }

    fn min_width(&self) -> f64 {
        CARD_MIN_WIDTH
    }

    fn min_height(&self) -> f64 {
        CARD_MIN_HEIGHT
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.base.id,
            "type": self.kind(),
            "boardId": self.board_id,
            "cardType": self.card_type,
            "source": self.source,
            "title": self.title,
            "thumbnailUrl": self.thumbnail_url,
            "sourceUrl": self.source_url,
            "filePath": self.file_path,
            "notes": self.base.notes,
            "tags": self.tags,
            "role": self.role,
            "pinned": self.pinned,
            "position": self.position,
            "x": self.base.x,
            "y": self.base.y,
            "width": self.base.width,
            "height": self.base.height,
            "embedHtml": self.embed_html,
            "analysis": self.analysis,
            "groupId": self.group_id,
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
            pinned: false,
            ..self.clone()
        }
    }
}

/// `host` is `domain` or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}

fn dedup_tags(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn image_card() -> CardElement {
        CardElement::new(Uuid::new_v4(), CardType::Image, CardSource::Upload, "Moodshot")
            .with_origin(40.0, 60.0)
            .with_size(240.0, 280.0)
    }

    fn sample_record() -> ReferenceCard {
        ReferenceCard {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            card_type: CardType::Link,
            source: CardSource::Youtube,
            title: "Lookbook".to_string(),
            thumbnail_url: Some("https://img.example/thumb.jpg".to_string()),
            source_url: Some("https://youtube.com/watch?v=abc".to_string()),
            file_path: None,
            notes: Some("use the blue hour".to_string()),
            tags: vec!["dusk".to_string(), "street".to_string()],
            role: Some(CardRole::Lighting),
            pinned: true,
            position: 3,
            x: 12.5,
            y: -40.0,
            width: 320.0,
            height: 240.0,
            embed_html: Some("<iframe></iframe>".to_string()),
            analysis: None,
            group_id: Some(Uuid::new_v4()),
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    #[test]
    fn test_new_card_uses_default_size() {
        let card = CardElement::new(Uuid::new_v4(), CardType::Text, CardSource::Upload, "Note");
        assert!((card.width() - 240.0).abs() < f64::EPSILON);
        assert!((card.height() - 160.0).abs() < f64::EPSILON);
        assert_eq!(card.kind(), ElementKind::Card);
        assert!(card.group_id().is_none());
    }

    #[test]
    fn test_minimums() {
        let mut card = image_card();
        card.resize(10.0, 10.0);
        assert!((card.width() - 120.0).abs() < f64::EPSILON);
        assert!((card.height() - CARD_MIN_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tags_are_unique() {
        let mut card = image_card();
        card.set_tags(["warm", "film", "warm"]);
        assert_eq!(card.tags(), ["warm", "film"]);

        card.add_tag("film");
        assert_eq!(card.tags().len(), 2);
        card.add_tag("grain");
        assert_eq!(card.tags(), ["warm", "film", "grain"]);

        card.remove_tag("missing");
        assert_eq!(card.tags().len(), 3);
        card.remove_tag("warm");
        assert_eq!(card.tags(), ["film", "grain"]);
    }

    #[test]
    fn test_apply_image_dimensions() {
        let mut card = image_card();
        card.apply_image_dimensions(1200.0, 1200.0);
        assert!((card.width() - 240.0).abs() < f64::EPSILON);
        assert!((card.height() - 280.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_thumbnail_switches_default_size() {
        let card = CardElement::new(Uuid::new_v4(), CardType::Image, CardSource::Upload, "img");
        assert!((card.height() - 200.0).abs() < f64::EPSILON);
        let card = card.with_thumbnail_url("https://img.example/a.png");
        assert!((card.height() - 280.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reference_card_round_trip() {
        let record = sample_record();
        let card = CardElement::from_reference_card(&record);
        assert_eq!(card.to_reference_card(), record);

        let again = CardElement::from_reference_card(&card.to_reference_card());
        assert_eq!(again.to_reference_card(), record);
    }

    #[test]
    fn test_duplicate() {
        let mut card = CardElement::from_reference_card(&sample_record());
        card.select();
        let copy = card.duplicate();

        assert_ne!(copy.id(), card.id());
        assert!(!copy.pinned());
        assert!(!copy.is_selected());
        assert!((copy.x() - (card.x() + CLONE_OFFSET)).abs() < f64::EPSILON);
        assert!((copy.y() - (card.y() + CLONE_OFFSET)).abs() < f64::EPSILON);
        assert_eq!(copy.group_id(), card.group_id());
        assert_eq!(copy.tags(), card.tags());
        assert_eq!(copy.title(), card.title());
    }

    #[test]
    fn test_to_json_shape() {
        let card = CardElement::from_reference_card(&sample_record());
        let value = card.to_json();
        assert_eq!(value["type"], "card");
        assert_eq!(value["cardType"], "link");
        assert_eq!(value["source"], "youtube");
        assert_eq!(value["role"], "lighting");
        assert_eq!(value["position"], 3);
        assert!(value["updatedAt"].is_string());
    }

    #[test]
    fn test_source_detection() {
        assert_eq!(
            CardSource::from_url("https://www.instagram.com/p/xyz"),
            CardSource::Instagram
        );
        assert_eq!(CardSource::from_url("https://youtu.be/abc"), CardSource::Youtube);
        assert_eq!(CardSource::from_url("https://x.com/someone"), CardSource::Twitter);
        assert_eq!(CardSource::from_url("https://www.are.na/block/1"), CardSource::Arena);
        assert_eq!(
            CardSource::from_url("https://docs.google.com/document/d/1"),
            CardSource::Googledoc
        );
        assert_eq!(CardSource::from_url("https://team.notion.site/page"), CardSource::Notion);
        assert_eq!(CardSource::from_url("https://example.com"), CardSource::Web);
        assert_eq!(CardSource::from_url("https://www.netflix.com/title/1"), CardSource::Web);
        assert_eq!(CardSource::from_url("https://m.youtube.com/watch?v=1"), CardSource::Youtube);
        assert_eq!(CardSource::from_url("not a url"), CardSource::Web);
        assert!(CardSource::Tiktok.is_embeddable());
        assert!(!CardSource::Pinterest.is_embeddable());
    }
}

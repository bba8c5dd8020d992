//! Card sizing rules.
//!
//! Cards start at a size looked up from their type and source. Image cards
//! switch to an aspect-ratio driven size once the image's natural pixel size
//! is known.

use super::{CardSource, CardType};
use kurbo::Size;

/// Smallest card width.
pub const CARD_MIN_WIDTH: f64 = 120.0;
/// Smallest card height (the card header).
pub const CARD_MIN_HEIGHT: f64 = 80.0;
/// Width every image card settles on once its image has loaded.
pub const IMAGE_CARD_WIDTH: f64 = 240.0;
/// Tallest an image card may grow from its aspect ratio.
pub const IMAGE_CARD_MAX_HEIGHT: f64 = 600.0;
/// Room reserved under an image for the title bar.
pub const TITLE_BAR_HEIGHT: f64 = 40.0;
/// Fallback size when no table entry applies.
pub const DEFAULT_CARD_SIZE: Size = Size::new(240.0, 280.0);

/// Default size for a card, before any content-driven sizing.
pub fn default_dimensions(card_type: CardType, source: CardSource, has_thumbnail: bool) -> Size {
    match (card_type, source) {
        (CardType::Image, _) if has_thumbnail => DEFAULT_CARD_SIZE,
        (CardType::Image, _) => Size::new(240.0, 200.0),
        (CardType::Link, CardSource::Youtube) => Size::new(320.0, 240.0),
        (CardType::Link, CardSource::Tiktok) => Size::new(240.0, 430.0),
        (CardType::Link, CardSource::Instagram | CardSource::Pinterest) => Size::new(240.0, 320.0),
        (CardType::Link, CardSource::Twitter) => Size::new(280.0, 260.0),
        (CardType::Link, _) => Size::new(280.0, 200.0),
        (CardType::Text, _) => Size::new(240.0, 160.0),
        (CardType::File, _) => Size::new(240.0, 120.0),
    }
}

/// Size for an image card given the image's natural pixel size.
///
/// Width is fixed; height follows the aspect ratio plus the title bar and is
/// kept within `[CARD_MIN_HEIGHT, IMAGE_CARD_MAX_HEIGHT]`.
pub fn dimensions_from_image(image_width: f64, image_height: f64) -> Size {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(image_width) || !usable(image_height) {
        return DEFAULT_CARD_SIZE;
    }

    let scaled = IMAGE_CARD_WIDTH * image_height / image_width;
    let height = (scaled + TITLE_BAR_HEIGHT).clamp(CARD_MIN_HEIGHT, IMAGE_CARD_MAX_HEIGHT);
    Size::new(IMAGE_CARD_WIDTH, height)
}

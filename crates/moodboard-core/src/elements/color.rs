//! Group color tokens and their themes.

use crate::records::RecordError;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Colors used to draw a group of a given token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTheme {
    pub bg: SerializableColor,
    pub border: SerializableColor,
    pub text: SerializableColor,
    pub header: SerializableColor,
}

impl GroupTheme {
    const fn new(bg: u32, border: u32, text: u32, header: u32) -> Self {
        Self {
            bg: SerializableColor::from_rgb(bg),
            border: SerializableColor::from_rgb(border),
            text: SerializableColor::from_rgb(text),
            header: SerializableColor::from_rgb(header),
        }
    }
}

/// Color token of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Neutral,
    Red,
    Orange,
    Amber,
    Yellow,
    Lime,
    Green,
    Emerald,
    Teal,
    Cyan,
    Sky,
    Blue,
    Indigo,
    Violet,
    Purple,
    Fuchsia,
    Pink,
    Rose,
}

impl GroupColor {
    /// All tokens in picker order.
    pub const ALL: [GroupColor; 18] = [
        GroupColor::Neutral,
        GroupColor::Red,
        GroupColor::Orange,
        GroupColor::Amber,
        GroupColor::Yellow,
        GroupColor::Lime,
        GroupColor::Green,
        GroupColor::Emerald,
        GroupColor::Teal,
        GroupColor::Cyan,
        GroupColor::Sky,
        GroupColor::Blue,
        GroupColor::Indigo,
        GroupColor::Violet,
        GroupColor::Purple,
        GroupColor::Fuchsia,
        GroupColor::Pink,
        GroupColor::Rose,
    ];

    /// The token as stored in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Neutral => "neutral",
            GroupColor::Red => "red",
            GroupColor::Orange => "orange",
            GroupColor::Amber => "amber",
            GroupColor::Yellow => "yellow",
            GroupColor::Lime => "lime",
            GroupColor::Green => "green",
            GroupColor::Emerald => "emerald",
            GroupColor::Teal => "teal",
            GroupColor::Cyan => "cyan",
            GroupColor::Sky => "sky",
            GroupColor::Blue => "blue",
            GroupColor::Indigo => "indigo",
            GroupColor::Violet => "violet",
            GroupColor::Purple => "purple",
            GroupColor::Fuchsia => "fuchsia",
            GroupColor::Pink => "pink",
            GroupColor::Rose => "rose",
        }
    }

    /// Background, border, text and header colors for this token.
    pub fn theme(&self) -> GroupTheme {
        match self {
            GroupColor::Neutral => GroupTheme::new(0xf5f2ed, 0xd0c8ba, 0x1a1816, 0xe8e0d4),
            GroupColor::Red => GroupTheme::new(0xfef2f2, 0xfecaca, 0xdc2626, 0xfee2e2),
            GroupColor::Orange => GroupTheme::new(0xfff7ed, 0xfed7aa, 0xea580c, 0xffedd5),
            GroupColor::Amber => GroupTheme::new(0xfffbeb, 0xfde68a, 0xd97706, 0xfef3c7),
            GroupColor::Yellow => GroupTheme::new(0xfefce8, 0xfef08a, 0xca8a04, 0xfef9c3),
            GroupColor::Lime => GroupTheme::new(0xf7fee7, 0xd9f99d, 0x65a30d, 0xecfccb),
            GroupColor::Green => GroupTheme::new(0xf0fdf4, 0xbbf7d0, 0x16a34a, 0xdcfce7),
            GroupColor::Emerald => GroupTheme::new(0xecfdf5, 0xa7f3d0, 0x059669, 0xd1fae5),
            GroupColor::Teal => GroupTheme::new(0xf0fdfa, 0x99f6e4, 0x0d9488, 0xccfbf1),
            GroupColor::Cyan => GroupTheme::new(0xecfeff, 0xa5f3fc, 0x0891b2, 0xcffafe),
            GroupColor::Sky => GroupTheme::new(0xf0f9ff, 0xbae6fd, 0x0284c7, 0xe0f2fe),
            GroupColor::Blue => GroupTheme::new(0xeff6ff, 0xbfdbfe, 0x2563eb, 0xdbeafe),
            GroupColor::Indigo => GroupTheme::new(0xeef2ff, 0xc7d2fe, 0x4f46e5, 0xe0e7ff),
            GroupColor::Violet => GroupTheme::new(0xf5f3ff, 0xddd6fe, 0x7c3aed, 0xede9fe),
            GroupColor::Purple => GroupTheme::new(0xfaf5ff, 0xe9d5ff, 0x9333ea, 0xf3e8ff),
            GroupColor::Fuchsia => GroupTheme::new(0xfdf4ff, 0xf5d0fe, 0xc026d3, 0xfae8ff),
            GroupColor::Pink => GroupTheme::new(0xfdf2f8, 0xfbcfe8, 0xdb2777, 0xfce7f3),
            GroupColor::Rose => GroupTheme::new(0xfff1f2, 0xfecdd3, 0xe11d48, 0xffe4e6),
        }
    }

    /// Cycle to the next token.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupColor {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RecordError::UnknownColor(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(
            SerializableColor::from_hex("#f5f2ed"),
            Some(SerializableColor::from_rgb(0xf5f2ed))
        );
        assert_eq!(
            SerializableColor::from_hex("#fff"),
            Some(SerializableColor::new(255, 255, 255, 255))
        );
        assert_eq!(SerializableColor::from_hex("f5f2ed"), None);
        assert_eq!(SerializableColor::from_hex("#zzzzzz"), None);
        assert_eq!(SerializableColor::from_rgb(0xe94560).to_hex(), "#e94560");
    }

    #[test]
    fn test_token_round_trip() {
        for color in GroupColor::ALL {
            assert_eq!(color.as_str().parse::<GroupColor>().unwrap(), color);
            let json = serde_json::to_string(&color).unwrap();
            assert_eq!(json, format!("\"{}\"", color.as_str()));
        }
        assert!(matches!(
            "mauve".parse::<GroupColor>(),
            Err(RecordError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(GroupColor::Rose.next(), GroupColor::Neutral);
        assert_eq!(GroupColor::Neutral.next(), GroupColor::Red);
    }

    #[test]
    fn test_theme_into_peniko() {
        let header: Color = GroupColor::Neutral.theme().header.into();
        let rgba = header.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b), (0xe8, 0xe0, 0xd4));
    }
}

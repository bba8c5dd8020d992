//! Structured visual analysis attached to a card.
//!
//! Produced by the vision collaborator and carried through unchanged; the
//! canvas engine never reads inside it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingType {
    Natural,
    Studio,
    Mixed,
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingDirection {
    Front,
    Side,
    Back,
    Diffused,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingQuality {
    Hard,
    Soft,
    Dramatic,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionStyle {
    Centered,
    RuleOfThirds,
    Symmetrical,
    Asymmetrical,
    Diagonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingType {
    Tight,
    Medium,
    Wide,
    ExtremeClose,
    FullBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerspectiveType {
    EyeLevel,
    HighAngle,
    LowAngle,
    BirdsEye,
    WormsEye,
}

/// Lighting read from the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    #[serde(rename = "type")]
    pub kind: LightingType,
    pub direction: LightingDirection,
    pub quality: LightingQuality,
    /// Free-form, e.g. "Soft window light from camera-left".
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub style: CompositionStyle,
    pub framing: FramingType,
    pub perspective: PerspectiveType,
}

/// AI vision result for a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAnalysis {
    /// Hex color codes, dominant first.
    pub palette: Vec<String>,
    pub lighting: Lighting,
    pub composition: Composition,
    pub mood: Vec<String>,
    pub tags: Vec<String>,
    /// One-sentence description.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_collaborator_payload() {
        let json = r##"{
            "palette": ["#1a1a2e", "#e94560"],
            "lighting": {
                "type": "natural",
                "direction": "side",
                "quality": "soft",
                "description": "Window light from camera-left"
            },
            "composition": {
                "style": "rule-of-thirds",
                "framing": "full-body",
                "perspective": "eye-level"
            },
            "mood": ["intimate"],
            "tags": ["portrait"],
            "summary": "A portrait by a window."
        }"##;

        let analysis: CardAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.lighting.kind, LightingType::Natural);
        assert_eq!(analysis.composition.style, CompositionStyle::RuleOfThirds);
        assert_eq!(analysis.composition.framing, FramingType::FullBody);

        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["composition"]["perspective"], "eye-level");
        assert_eq!(value["lighting"]["type"], "natural");
    }
}

pub mod validate;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scene::Scene;
use crate::sync::WordTimestamp;
use crate::trigger::TriggerMode;

pub use validate::DeckError;

const DEFAULT_SLIDE_MS: u64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Presentation-level default, used by every slide without an override.
    #[serde(default)]
    pub trigger_mode: TriggerMode,

    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default = "default_slide_ms")]
    pub duration_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_mode: Option<TriggerMode>,

    /// Voice-over audio for this slide. When present, the audio clock drives auto-advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    /// Reveal count for slides without scenes.
    #[serde(default)]
    pub reveal_steps: usize,

    #[serde(default)]
    pub elements: Vec<SlideElement>,

    #[serde(default)]
    pub words: Vec<WordTimestamp>,

    #[serde(default)]
    pub scenes: Vec<Scene>,
}

fn default_slide_ms() -> u64 {
    DEFAULT_SLIDE_MS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    #[default]
    Text,
    Heading,
    Icon,
    Image,
    Shape,
    Card,
}

impl ElementKind {
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Heading)
    }
}

/// One node of a slide's element tree. The tree is stored flat in
/// `Slide::elements`; `parent` indexes into that same vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideElement {
    pub id: String,

    #[serde(default)]
    pub kind: ElementKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

impl SlideElement {
    /// Text used for keyword matching: the body text, or the title when there is none.
    pub fn match_text(&self) -> Option<&str> {
        self.text.as_deref().or(self.title.as_deref())
    }
}

impl Slide {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn has_scenes(&self) -> bool {
        !self.scenes.is_empty()
    }

    /// Display titles keyed by element id, used for step labels.
    pub fn widget_titles(&self) -> HashMap<String, String> {
        self.elements
            .iter()
            .filter_map(|e| {
                e.title
                    .as_deref()
                    .or(e.text.as_deref())
                    .map(|t| (e.id.clone(), t.to_string()))
            })
            .collect()
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = &SlideElement> {
        self.elements
            .iter()
            .filter(move |e| e.parent == Some(index))
    }

    /// Elements in sync priority order: text elements first, then everything
    /// else, each group in arena order.
    pub fn sync_order(&self) -> Vec<&SlideElement> {
        let (text, other): (Vec<&SlideElement>, Vec<&SlideElement>) =
            self.elements.iter().partition(|e| e.kind.is_text());
        text.into_iter().chain(other).collect()
    }
}

impl Deck {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let deck = Self::parse(&content)
            .with_context(|| format!("Invalid deck {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            slides = deck.slides.len(),
            "Deck loaded"
        );
        Ok(deck)
    }

    pub fn parse(content: &str) -> Result<Self, DeckError> {
        let mut deck: Deck = serde_yaml::from_str(content)?;
        validate::validate(&deck)?;
        for slide in &mut deck.slides {
            slide.scenes.sort_by_key(|s| s.order);
        }
        Ok(deck)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled deck")
    }

    /// The sparse per-slide override map. Slides without an override are absent.
    pub fn slide_trigger_overrides(&self) -> BTreeMap<usize, TriggerMode> {
        self.slides
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.trigger_mode.map(|m| (i, m)))
            .collect()
    }
}

//! Trigger mode resolution.
//!
//! A step advances either on a timer (`auto`) or on an explicit user action
//! (`click`). The effective mode comes from an override chain where the most
//! specific level wins: animation behavior, then scene, then slide, then the
//! presentation default. Every override level is an `Option`; `None` means
//! "inherit from the level above" and is never confused with an explicit
//! `auto`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scene::{AnimationBehavior, Scene, StepKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    #[default]
    Auto,
    Click,
}

impl TriggerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Click => "click",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::Click,
            Self::Click => Self::Auto,
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "click" => Ok(Self::Click),
            _ => Err(format!("Invalid trigger mode: {s}. Must be 'auto' or 'click'.")),
        }
    }
}

/// Presentation default plus the sparse per-slide override map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerModes {
    default: TriggerMode,
    slide_overrides: BTreeMap<usize, TriggerMode>,
}

impl TriggerModes {
    pub fn new(default: TriggerMode) -> Self {
        Self {
            default,
            slide_overrides: BTreeMap::new(),
        }
    }

    pub fn with_overrides(
        default: TriggerMode,
        overrides: impl IntoIterator<Item = (usize, TriggerMode)>,
    ) -> Self {
        Self {
            default,
            slide_overrides: overrides.into_iter().collect(),
        }
    }

    pub fn presentation_default(&self) -> TriggerMode {
        self.default
    }

    pub fn set_presentation_default(&mut self, mode: TriggerMode) {
        self.default = mode;
    }

    /// The explicit override for a slide, if it has one.
    pub fn slide_override(&self, slide_index: usize) -> Option<TriggerMode> {
        self.slide_overrides.get(&slide_index).copied()
    }

    pub fn set_slide(&mut self, slide_index: usize, mode: TriggerMode) {
        self.slide_overrides.insert(slide_index, mode);
    }

    /// Remove a slide's override so it follows the presentation default again.
    pub fn clear_slide(&mut self, slide_index: usize) {
        self.slide_overrides.remove(&slide_index);
    }

    pub fn resolve(&self, slide_index: usize) -> TriggerMode {
        self.slide_override(slide_index).unwrap_or(self.default)
    }

    pub fn resolve_scene(&self, slide_index: usize, scene: &Scene) -> TriggerMode {
        scene
            .trigger_mode
            .unwrap_or_else(|| self.resolve(slide_index))
    }

    /// Resolve for one phase (enter or exit) of a scene.
    pub fn resolve_behavior(
        &self,
        slide_index: usize,
        scene: &Scene,
        behavior: &AnimationBehavior,
    ) -> TriggerMode {
        behavior
            .trigger_mode
            .unwrap_or_else(|| self.resolve_scene(slide_index, scene))
    }

    /// Resolve for one step of a scene: the exit behavior on the exit step,
    /// the enter behavior everywhere else.
    pub fn resolve_step(&self, slide_index: usize, scene: &Scene, step: usize) -> TriggerMode {
        let layer = &scene.layer;
        let behavior = match (layer.step_kind(step), &layer.exit_behavior) {
            (StepKind::Exit, Some(exit)) => exit,
            _ => &layer.enter_behavior,
        };
        self.resolve_behavior(slide_index, scene, behavior)
    }
}

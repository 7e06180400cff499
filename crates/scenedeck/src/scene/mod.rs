pub mod widget_state;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::trigger::TriggerMode;

pub use widget_state::{
    DisplayMode, InteractionAction, InteractionBehavior, InteractionTrigger, StepKind,
    Visibility, WidgetInitialState, WidgetState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealMode {
    #[default]
    AllAtOnce,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationBehavior {
    #[serde(default)]
    pub reveal_mode: RevealMode,

    #[serde(default = "default_animation_ms")]
    pub duration_ms: u32,

    /// Delay between consecutive widgets in sequential mode.
    #[serde(default)]
    pub stagger_ms: u32,

    #[serde(default)]
    pub delay_ms: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_mode: Option<TriggerMode>,

    /// Sequential mode only: prepend a step with every widget visible and none focused.
    #[serde(default)]
    pub include_overview_step: bool,
}

fn default_animation_ms() -> u32 {
    400
}

impl Default for AnimationBehavior {
    fn default() -> Self {
        Self {
            reveal_mode: RevealMode::AllAtOnce,
            duration_ms: default_animation_ms(),
            stagger_ms: 0,
            delay_ms: 0,
            trigger_mode: None,
            include_overview_step: false,
        }
    }
}

impl AnimationBehavior {
    pub fn is_sequential(&self) -> bool {
        self.reveal_mode == RevealMode::Sequential
    }

    fn has_overview(&self) -> bool {
        self.is_sequential() && self.include_overview_step
    }
}

/// Animation and interaction rules for the widgets of one scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetStateLayer {
    #[serde(default)]
    pub initial_states: Vec<WidgetInitialState>,

    #[serde(default)]
    pub enter_behavior: AnimationBehavior,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_behavior: Option<AnimationBehavior>,

    #[serde(default)]
    pub interaction_behaviors: Vec<InteractionBehavior>,

    /// Reveal order for sequential mode.
    #[serde(default)]
    pub animated_widget_ids: Vec<String>,

    /// Whether the viewer may jump to any step out of order.
    #[serde(default)]
    pub allow_step_jump: bool,
}

impl WidgetStateLayer {
    /// Steps contributed by the enter phase, overview included.
    fn enter_steps(&self) -> usize {
        let widgets = self.animated_widget_ids.len();
        let reveal = if self.enter_behavior.is_sequential() {
            widgets
        } else {
            usize::from(widgets > 0)
        };
        reveal + usize::from(self.enter_behavior.has_overview())
    }

    pub fn step_count(&self) -> usize {
        let exit = usize::from(self.exit_behavior.is_some());
        (self.enter_steps() + exit).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    pub order: usize,

    #[serde(default)]
    pub layer: WidgetStateLayer,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_mode: Option<TriggerMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Number of navigable steps in a scene. Never less than one, so a scene
/// without animated content can still be reached.
pub fn calc_scene_steps(scene: &Scene) -> usize {
    scene.layer.step_count()
}

/// Breadcrumb labels for a scene's steps, one per step.
pub fn generate_scene_step_labels(
    scene: &Scene,
    widget_titles: &HashMap<String, String>,
) -> Vec<String> {
    let layer = &scene.layer;
    let enter = &layer.enter_behavior;
    let mut labels = Vec::with_capacity(layer.step_count());

    if enter.is_sequential() {
        if enter.include_overview_step {
            labels.push("Overview".to_string());
        }
        for id in &layer.animated_widget_ids {
            let label = widget_titles
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("Widget {id}"));
            labels.push(label);
        }
    } else if !layer.animated_widget_ids.is_empty() {
        labels.push(non_empty_or(&scene.title, "Enter"));
    }

    if layer.exit_behavior.is_some() {
        labels.push("Exit".to_string());
    }

    if labels.is_empty() {
        labels.push(non_empty_or(&scene.title, "Scene"));
    }
    labels
}

fn non_empty_or(title: &str, fallback: &str) -> String {
    if title.trim().is_empty() {
        fallback.to_string()
    } else {
        title.to_string()
    }
}

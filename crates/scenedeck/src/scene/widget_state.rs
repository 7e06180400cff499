//! Per-step widget visibility and focus for one scene.

use serde::{Deserialize, Serialize};

use super::WidgetStateLayer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Full,
    Compact,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetInitialState {
    pub widget_id: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub focused: bool,

    #[serde(default)]
    pub display_mode: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionTrigger {
    Click,
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionAction {
    Expand,
    Focus,
    ToggleVisibility,
}

/// A user-triggered reaction. These are independent of step navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionBehavior {
    pub widget_id: String,
    pub trigger: InteractionTrigger,
    pub action: InteractionAction,
}

/// What a given step of a scene does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Every animated widget visible, none focused.
    Overview,
    /// All-at-once reveal of every animated widget.
    Enter,
    /// Sequential reveal of the widget at this index of `animated_widget_ids`.
    Reveal(usize),
    Exit,
    /// Placeholder step of a scene with nothing to animate.
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub widget_id: String,
    pub visibility: Visibility,
    pub focused: bool,
    pub display_mode: DisplayMode,
}

impl WidgetState {
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

impl WidgetStateLayer {
    /// Classify a step. Steps past the end clamp to the last step.
    pub fn step_kind(&self, step: usize) -> StepKind {
        let step = step.min(self.step_count() - 1);
        let enter_steps = self.enter_steps();

        if step >= enter_steps {
            return if self.exit_behavior.is_some() {
                StepKind::Exit
            } else {
                StepKind::Hold
            };
        }

        if !self.enter_behavior.is_sequential() {
            return StepKind::Enter;
        }
        if self.enter_behavior.include_overview_step {
            if step == 0 {
                StepKind::Overview
            } else {
                StepKind::Reveal(step - 1)
            }
        } else {
            StepKind::Reveal(step)
        }
    }

    /// Widget states the renderer should show at `step`.
    ///
    /// Widgets listed in `initial_states` keep their order; animated widgets
    /// without an initial state are appended in reveal order.
    pub fn widget_states_at(&self, step: usize) -> Vec<WidgetState> {
        let kind = self.step_kind(step);
        let mut states: Vec<WidgetState> = self
            .initial_states
            .iter()
            .map(|s| WidgetState {
                widget_id: s.widget_id.clone(),
                visibility: s.visibility,
                focused: s.focused,
                display_mode: s.display_mode,
            })
            .collect();
        for id in &self.animated_widget_ids {
            if !states.iter().any(|s| &s.widget_id == id) {
                states.push(WidgetState {
                    widget_id: id.clone(),
                    visibility: Visibility::Hidden,
                    focused: false,
                    display_mode: DisplayMode::Full,
                });
            }
        }

        for state in &mut states {
            let Some(position) = self
                .animated_widget_ids
                .iter()
                .position(|id| id == &state.widget_id)
            else {
                continue;
            };
            let (visible, focused) = match kind {
                StepKind::Overview | StepKind::Enter => (true, false),
                StepKind::Reveal(current) => (position <= current, position == current),
                StepKind::Exit => (false, false),
                StepKind::Hold => continue,
            };
            state.visibility = if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            state.focused = focused;
        }
        states
    }

    pub fn interaction_for(
        &self,
        widget_id: &str,
        trigger: InteractionTrigger,
    ) -> Option<InteractionAction> {
        self.interaction_behaviors
            .iter()
            .find(|b| b.widget_id == widget_id && b.trigger == trigger)
            .map(|b| b.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AnimationBehavior, RevealMode};

    fn sequential(overview: bool, exit: bool) -> WidgetStateLayer {
        WidgetStateLayer {
            initial_states: vec![WidgetInitialState {
                widget_id: "logo".to_string(),
                visibility: Visibility::Visible,
                focused: false,
                display_mode: DisplayMode::Compact,
            }],
            enter_behavior: AnimationBehavior {
                reveal_mode: RevealMode::Sequential,
                include_overview_step: overview,
                ..AnimationBehavior::default()
            },
            exit_behavior: exit.then(AnimationBehavior::default),
            animated_widget_ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..WidgetStateLayer::default()
        }
    }

    fn visible_ids(states: &[WidgetState]) -> Vec<&str> {
        states
            .iter()
            .filter(|s| s.is_visible())
            .map(|s| s.widget_id.as_str())
            .collect()
    }

    fn focused_ids(states: &[WidgetState]) -> Vec<&str> {
        states
            .iter()
            .filter(|s| s.focused)
            .map(|s| s.widget_id.as_str())
            .collect()
    }

    #[test]
    fn test_step_kinds_with_overview_and_exit() {
        let layer = sequential(true, true);
        assert_eq!(layer.step_kind(0), StepKind::Overview);
        assert_eq!(layer.step_kind(1), StepKind::Reveal(0));
        assert_eq!(layer.step_kind(3), StepKind::Reveal(2));
        assert_eq!(layer.step_kind(4), StepKind::Exit);
        assert_eq!(layer.step_kind(99), StepKind::Exit);
    }

    #[test]
    fn test_sequential_reveal_focuses_latest_widget() {
        let layer = sequential(false, false);
        let states = layer.widget_states_at(1);
        assert_eq!(visible_ids(&states), vec!["logo", "a", "b"]);
        assert_eq!(focused_ids(&states), vec!["b"]);
    }

    #[test]
    fn test_overview_shows_everything_without_focus() {
        let layer = sequential(true, false);
        let states = layer.widget_states_at(0);
        assert_eq!(visible_ids(&states), vec!["logo", "a", "b", "c"]);
        assert!(focused_ids(&states).is_empty());
    }

    #[test]
    fn test_exit_hides_animated_widgets_only() {
        let layer = sequential(false, true);
        let states = layer.widget_states_at(3);
        assert_eq!(visible_ids(&states), vec!["logo"]);
        assert_eq!(states[0].display_mode, DisplayMode::Compact);
    }

    #[test]
    fn test_empty_layer_holds() {
        let layer = WidgetStateLayer::default();
        assert_eq!(layer.step_kind(0), StepKind::Hold);
        assert!(layer.widget_states_at(0).is_empty());
    }

    #[test]
    fn test_looks_up_interactions() {
        let layer = WidgetStateLayer {
            interaction_behaviors: vec![InteractionBehavior {
                widget_id: "card".to_string(),
                trigger: InteractionTrigger::Click,
                action: InteractionAction::Expand,
            }],
            ..WidgetStateLayer::default()
        };
        assert_eq!(
            layer.interaction_for("card", InteractionTrigger::Click),
            Some(InteractionAction::Expand)
        );
        assert_eq!(layer.interaction_for("card", InteractionTrigger::Hover), None);
    }
}

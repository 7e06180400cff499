//! When the steps inside a slide fire on their own in auto mode.
//!
//! Every slide gets one cue per step, in the order `Session::advance` walks
//! them. The first cue is the slide's starting position at time zero. On a
//! slide with voice-over, a step that reveals widgets fires at the earliest
//! sync point of those widgets. Every other step is planned on the slide's
//! duration: each scene gets its own `duration_ms` or an equal share of what
//! is left, and its steps are spread evenly across that window, shifted by
//! the behavior's `delay_ms`. A step never fires before the previous step's
//! animation (`duration_ms`) has finished, plus `stagger_ms` between
//! sequential reveals.

use crate::deck::Slide;
use crate::scene::{AnimationBehavior, Scene, StepKind, WidgetStateLayer, calc_scene_steps};
use crate::sync::SlideSync;

/// A step position and the slide-local time (seconds) at which it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub scene: usize,
    pub step: usize,
    pub at: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSchedule {
    cues: Vec<Cue>,
}

impl StepSchedule {
    pub fn for_slide(slide: &Slide, sync: Option<&SlideSync>, duration: f64) -> Self {
        if !slide.has_scenes() {
            let steps = slide.reveal_steps + 1;
            let cues = (0..steps)
                .map(|step| Cue {
                    scene: 0,
                    step,
                    at: step as f64 * duration / steps as f64,
                })
                .collect();
            return Self { cues };
        }

        let mut cues: Vec<Cue> = Vec::new();
        // Earliest time the next step may fire.
        let mut ready = 0.0;
        for (index, (scene, (start, length))) in slide
            .scenes
            .iter()
            .zip(scene_windows(&slide.scenes, duration))
            .enumerate()
        {
            let layer = &scene.layer;
            let steps = calc_scene_steps(scene);
            for step in 0..steps {
                let kind = layer.step_kind(step);
                let behavior = behavior_for(layer, kind);
                let at = if cues.is_empty() {
                    0.0
                } else {
                    let planned = start
                        + step as f64 * length / steps as f64
                        + behavior.map_or(0.0, |b| secs(b.delay_ms.into()));
                    let stagger = match kind {
                        StepKind::Reveal(i) if i > 0 => {
                            secs(layer.enter_behavior.stagger_ms.into())
                        }
                        _ => 0.0,
                    };
                    let spoken = sync.and_then(|s| spoken_at(layer, kind, s));
                    spoken.unwrap_or(planned).max(ready + stagger)
                };
                ready = at + behavior.map_or(0.0, |b| secs(b.duration_ms.into()));
                cues.push(Cue {
                    scene: index,
                    step,
                    at,
                });
            }
        }
        Self { cues }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Index of the cue for a position. Steps past a scene's last step map to
    /// that last step.
    pub fn index_of(&self, scene: usize, step: usize) -> Option<usize> {
        self.cues
            .iter()
            .rposition(|c| c.scene == scene && c.step <= step)
    }

    /// The cue that follows a position within the same slide.
    pub fn next_after(&self, scene: usize, step: usize) -> Option<&Cue> {
        self.index_of(scene, step)
            .and_then(|index| self.cues.get(index + 1))
    }
}

fn secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// `(start, length)` of each scene within a slide of `duration` seconds.
fn scene_windows(scenes: &[Scene], duration: f64) -> Vec<(f64, f64)> {
    let fixed: f64 = scenes.iter().filter_map(|s| s.duration_ms).map(secs).sum();
    let flexible = scenes.iter().filter(|s| s.duration_ms.is_none()).count();
    let share = if flexible == 0 {
        0.0
    } else {
        (duration - fixed).max(0.0) / flexible as f64
    };

    let mut start = 0.0;
    scenes
        .iter()
        .map(|scene| {
            let length = scene.duration_ms.map_or(share, secs);
            let window = (start, length);
            start += length;
            window
        })
        .collect()
}

fn behavior_for(layer: &WidgetStateLayer, kind: StepKind) -> Option<&AnimationBehavior> {
    match kind {
        StepKind::Overview | StepKind::Enter | StepKind::Reveal(_) => Some(&layer.enter_behavior),
        StepKind::Exit => layer.exit_behavior.as_ref(),
        StepKind::Hold => None,
    }
}

/// Earliest sync point of the widgets a step reveals.
fn spoken_at(layer: &WidgetStateLayer, kind: StepKind, sync: &SlideSync) -> Option<f64> {
    let widgets: &[String] = match kind {
        StepKind::Reveal(i) => layer.animated_widget_ids.get(i..=i)?,
        StepKind::Enter => &layer.animated_widget_ids,
        StepKind::Overview | StepKind::Exit | StepKind::Hold => return None,
    };
    sync.sync_points
        .iter()
        .filter(|p| widgets.contains(&p.element_id))
        .map(|p| p.timestamp)
        .reduce(f64::min)
}

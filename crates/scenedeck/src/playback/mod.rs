//! Playback position state machine.
//!
//! [`PlayerState`] tracks the current slide, scene and step and is only
//! mutated through its navigation operations (or the equivalent
//! [`Command`]s). Out-of-range targets never fail: they clamp to the nearest
//! valid index. The totals (`total_slides`, `total_scenes`, `total_steps`)
//! are upper bounds supplied by the owner through [`PlayerState::init_player`]
//! and [`PlayerState::set_scene_counts`]; the state machine does not know how
//! to derive them from scene data.

pub mod driver;
pub mod schedule;
pub mod session;
pub mod timeline;

use crate::trigger::{TriggerMode, TriggerModes};

/// A `(slide, scene, step)` triple, all zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub slide: usize,
    pub scene: usize,
    pub step: usize,
}

/// Every mutation of [`PlayerState`], for callers that prefer a reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePlay,
    GoToSlide(isize),
    NextSlide,
    PrevSlide,
    GoToScene(isize),
    AdvanceScene,
    RetreatScene,
    AdvanceStep,
    RetreatStep,
    GoToStep(isize),
    SetCurrentTime(f64),
    SetSceneCounts { total_scenes: usize, total_steps: usize },
    SetPresentationTriggerMode(TriggerMode),
    SetSlideTriggerMode(usize, TriggerMode),
    ClearSlideTriggerMode(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    is_playing: bool,
    trigger_modes: TriggerModes,
    current_slide_index: usize,
    current_scene_index: usize,
    total_scenes: usize,
    current_step_index: usize,
    total_steps: usize,
    current_time: f64,
    total_duration: f64,
    total_slides: usize,
}

/// Clamp a possibly negative target into `[0, upper]`.
fn clamp_index(target: isize, upper: usize) -> usize {
    usize::try_from(target).map_or(0, |t| t.min(upper))
}

impl PlayerState {
    pub fn new(trigger_modes: TriggerModes) -> Self {
        Self {
            trigger_modes,
            ..Self::default()
        }
    }

    /// Establish bounds for a freshly loaded presentation and rewind to `(0, 0, 0)`.
    pub fn init_player(
        &mut self,
        total_slides: usize,
        total_duration: f64,
        total_scenes: usize,
        total_steps: usize,
    ) {
        self.total_slides = total_slides;
        self.total_duration = total_duration;
        self.total_scenes = total_scenes;
        self.total_steps = total_steps;
        self.current_slide_index = 0;
        self.current_scene_index = 0;
        self.current_step_index = 0;
        self.current_time = 0.0;
        self.is_playing = false;
        tracing::debug!(total_slides, total_duration, "Player initialized");
    }

    pub fn set_scene_counts(&mut self, total_scenes: usize, total_steps: usize) {
        self.total_scenes = total_scenes;
        self.total_steps = total_steps;
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::TogglePlay => self.toggle_play(),
            Command::GoToSlide(i) => self.go_to_slide(i),
            Command::NextSlide => self.next_slide(),
            Command::PrevSlide => self.prev_slide(),
            Command::GoToScene(i) => self.go_to_scene(i),
            Command::AdvanceScene => self.advance_scene(),
            Command::RetreatScene => self.retreat_scene(),
            Command::AdvanceStep => self.advance_step(),
            Command::RetreatStep => self.retreat_step(),
            Command::GoToStep(n) => self.go_to_step(n),
            Command::SetCurrentTime(t) => self.set_current_time(t),
            Command::SetSceneCounts {
                total_scenes,
                total_steps,
            } => self.set_scene_counts(total_scenes, total_steps),
            Command::SetPresentationTriggerMode(mode) => {
                self.trigger_modes.set_presentation_default(mode)
            }
            Command::SetSlideTriggerMode(slide, mode) => self.trigger_modes.set_slide(slide, mode),
            Command::ClearSlideTriggerMode(slide) => self.trigger_modes.clear_slide(slide),
        }
    }

    // --- transport ---

    pub fn play(&mut self) {
        self.is_playing = true;
        tracing::debug!(time = self.current_time, "Playback started");
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
        tracing::debug!(time = self.current_time, "Playback paused");
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.total_duration.max(0.0));
    }

    // --- slides ---

    fn enter_slide(&mut self, index: usize) {
        self.current_slide_index = index;
        self.current_scene_index = 0;
        self.current_step_index = 0;
        tracing::debug!(slide = index, "Slide entered");
    }

    fn last_slide(&self) -> usize {
        self.total_slides.saturating_sub(1)
    }

    pub fn go_to_slide(&mut self, index: isize) {
        let index = clamp_index(index, self.last_slide());
        self.enter_slide(index);
    }

    pub fn next_slide(&mut self) {
        if self.current_slide_index < self.last_slide() {
            self.enter_slide(self.current_slide_index + 1);
        }
    }

    pub fn prev_slide(&mut self) {
        if self.current_slide_index > 0 {
            self.enter_slide(self.current_slide_index - 1);
        }
    }

    // --- scenes ---

    pub fn go_to_scene(&mut self, index: isize) {
        self.current_scene_index = clamp_index(index, self.total_scenes.saturating_sub(1));
        self.current_step_index = 0;
    }

    /// Next scene, or the first scene of the next slide after the last scene.
    pub fn advance_scene(&mut self) {
        if self.current_scene_index + 1 < self.total_scenes {
            self.current_scene_index += 1;
            self.current_step_index = 0;
        } else if self.current_slide_index < self.last_slide() {
            self.enter_slide(self.current_slide_index + 1);
        }
    }

    /// Previous scene. Crossing into the previous slide lands on its first
    /// scene, not its last.
    pub fn retreat_scene(&mut self) {
        if self.current_scene_index > 0 {
            self.current_scene_index -= 1;
            self.current_step_index = 0;
        } else if self.current_slide_index > 0 {
            self.enter_slide(self.current_slide_index - 1);
        }
    }

    // --- steps ---

    pub fn advance_step(&mut self) {
        if self.current_step_index < self.total_steps {
            self.current_step_index += 1;
        } else if self.current_slide_index < self.last_slide() {
            self.enter_slide(self.current_slide_index + 1);
        }
    }

    /// Previous step. Crossing into the previous slide lands on step 0.
    pub fn retreat_step(&mut self) {
        if self.current_step_index > 0 {
            self.current_step_index -= 1;
        } else if self.current_slide_index > 0 {
            self.enter_slide(self.current_slide_index - 1);
        }
    }

    pub fn go_to_step(&mut self, step: isize) {
        self.current_step_index = clamp_index(step, self.total_steps);
    }

    // --- queries ---

    pub fn position(&self) -> Position {
        Position {
            slide: self.current_slide_index,
            scene: self.current_scene_index,
            step: self.current_step_index,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_slide_index(&self) -> usize {
        self.current_slide_index
    }

    pub fn current_scene_index(&self) -> usize {
        self.current_scene_index
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn total_slides(&self) -> usize {
        self.total_slides
    }

    pub fn total_scenes(&self) -> usize {
        self.total_scenes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn trigger_modes(&self) -> &TriggerModes {
        &self.trigger_modes
    }

    /// Trigger mode of the current slide (slide override or presentation default).
    pub fn resolved_trigger_mode(&self) -> TriggerMode {
        self.trigger_modes.resolve(self.current_slide_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(slides: usize, scenes: usize, steps: usize) -> PlayerState {
        let mut state = PlayerState::new(TriggerModes::new(TriggerMode::Auto));
        state.init_player(slides, slides as f64 * 5.0, scenes, steps);
        state
    }

    fn pos(slide: usize, scene: usize, step: usize) -> Position {
        Position { slide, scene, step }
    }

    #[test]
    fn test_go_to_slide_clamps_and_resets() {
        let mut state = player(3, 2, 4);
        state.go_to_scene(1);
        state.go_to_step(2);
        state.go_to_slide(1);
        assert_eq!(state.position(), pos(1, 0, 0));
        state.go_to_slide(99);
        assert_eq!(state.current_slide_index(), 2);
        state.go_to_slide(-5);
        assert_eq!(state.current_slide_index(), 0);
    }

    #[test]
    fn test_next_and_prev_slide_do_not_wrap() {
        let mut state = player(2, 1, 1);
        state.prev_slide();
        assert_eq!(state.position(), pos(0, 0, 0));
        state.next_slide();
        state.next_slide();
        assert_eq!(state.current_slide_index(), 1);
    }

    #[test]
    fn test_go_to_scene_clamps() {
        let mut state = player(1, 3, 2);
        state.go_to_step(2);
        state.go_to_scene(7);
        assert_eq!(state.position(), pos(0, 2, 0));
        state.go_to_scene(-1);
        assert_eq!(state.current_scene_index(), 0);
    }

    #[test]
    fn test_advance_scene_crosses_into_next_slide() {
        let mut state = player(2, 2, 3);
        state.advance_scene();
        assert_eq!(state.position(), pos(0, 1, 0));
        state.go_to_step(2);
        state.advance_scene();
        assert_eq!(state.position(), pos(1, 0, 0));
    }

    #[test]
    fn test_advance_scene_at_very_end_is_noop() {
        let mut state = player(2, 2, 3);
        state.go_to_slide(1);
        state.go_to_scene(1);
        state.go_to_step(1);
        let before = state.clone();
        for _ in 0..5 {
            state.advance_scene();
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_retreat_scene_at_very_start_is_noop() {
        let mut state = player(2, 2, 3);
        state.go_to_step(2);
        let before = state.clone();
        for _ in 0..5 {
            state.retreat_scene();
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_retreat_scene_lands_on_first_scene_of_previous_slide() {
        let mut state = player(2, 3, 3);
        state.go_to_slide(1);
        state.retreat_scene();
        assert_eq!(state.position(), pos(0, 0, 0));
    }

    #[test]
    fn test_advance_step_runs_through_total_then_next_slide() {
        let mut state = player(2, 1, 2);
        state.advance_step();
        state.advance_step();
        assert_eq!(state.current_step_index(), 2);
        state.advance_step();
        assert_eq!(state.position(), pos(1, 0, 0));
        state.advance_step();
        state.advance_step();
        let before = state.clone();
        state.advance_step();
        assert_eq!(state, before);
    }

    #[test]
    fn test_retreat_step_does_not_restore_previous_slide_step() {
        let mut state = player(2, 1, 3);
        state.go_to_step(3);
        state.next_slide();
        state.retreat_step();
        assert_eq!(state.position(), pos(0, 0, 0));
        state.retreat_step();
        assert_eq!(state.position(), pos(0, 0, 0));
    }

    #[test]
    fn test_go_to_step_clamps_to_total_steps() {
        let mut state = player(1, 1, 4);
        state.go_to_step(4);
        assert_eq!(state.current_step_index(), 4);
        state.go_to_step(isize::MAX);
        assert_eq!(state.current_step_index(), 4);
        state.go_to_step(isize::MIN);
        assert_eq!(state.current_step_index(), 0);
    }

    #[test]
    fn test_arbitrary_navigation_stays_in_bounds() {
        let mut state = player(4, 1, 3);
        // Deterministic pseudo-random walk over the step operations.
        let mut seed: u64 = 0x5eed;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            match (seed >> 33) % 3 {
                0 => state.advance_step(),
                1 => state.retreat_step(),
                _ => state.go_to_step(((seed >> 40) as i64 - (1 << 23)) as isize),
            }
            assert!(state.current_step_index() <= state.total_steps());
            assert!(state.current_slide_index() < state.total_slides());
        }
    }

    #[test]
    fn test_reducer_matches_direct_calls() {
        let mut direct = player(3, 2, 2);
        let mut reduced = player(3, 2, 2);
        direct.advance_scene();
        direct.advance_step();
        direct.set_current_time(2.5);
        direct.play();
        for command in [
            Command::AdvanceScene,
            Command::AdvanceStep,
            Command::SetCurrentTime(2.5),
            Command::Play,
        ] {
            reduced.apply(command);
        }
        assert_eq!(direct, reduced);
    }

    #[test]
    fn test_trigger_commands_update_resolution() {
        let mut state = player(4, 1, 1);
        state.apply(Command::SetSlideTriggerMode(2, TriggerMode::Click));
        state.go_to_slide(2);
        assert_eq!(state.resolved_trigger_mode(), TriggerMode::Click);
        state.apply(Command::ClearSlideTriggerMode(2));
        assert_eq!(state.resolved_trigger_mode(), TriggerMode::Auto);
        state.apply(Command::SetPresentationTriggerMode(TriggerMode::Click));
        assert_eq!(state.resolved_trigger_mode(), TriggerMode::Click);
    }

    #[test]
    fn test_current_time_is_clamped_to_duration() {
        let mut state = player(2, 1, 1);
        state.set_current_time(-1.0);
        assert_eq!(state.current_time(), 0.0);
        state.set_current_time(100.0);
        assert_eq!(state.current_time(), 10.0);
    }

    #[test]
    fn test_toggle_play_flips_transport() {
        let mut state = player(1, 1, 1);
        state.toggle_play();
        assert!(state.is_playing());
        state.apply(Command::TogglePlay);
        assert!(!state.is_playing());
    }
}

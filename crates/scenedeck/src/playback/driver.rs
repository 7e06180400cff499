//! Auto-advance drivers.
//!
//! In auto mode the presentation moves from slide to slide by elapsed time.
//! Time comes from exactly one source per slide: a fixed 100 ms timer, or
//! the slide's voice-over audio clock when the slide has audio. The driver
//! only ever changes the slide index; the session fires the steps inside a
//! slide from the same clock.

use std::time::Duration;

use super::PlayerState;
use super::timeline::Timeline;
use crate::trigger::TriggerMode;

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Timer,
    Audio,
}

#[derive(Debug, Clone, Default)]
pub struct AutoAdvance {
    timeline: Timeline,
    audio_slides: Vec<bool>,
}

impl AutoAdvance {
    pub fn new(timeline: Timeline, audio_slides: Vec<bool>) -> Self {
        Self {
            timeline,
            audio_slides,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn clock_source(&self, slide_index: usize) -> ClockSource {
        if self.audio_slides.get(slide_index).copied().unwrap_or(false) {
            ClockSource::Audio
        } else {
            ClockSource::Timer
        }
    }

    /// Whether elapsed time may move the presentation at all right now.
    pub fn is_active(&self, state: &PlayerState) -> bool {
        state.is_playing() && state.resolved_trigger_mode() == TriggerMode::Auto
    }

    /// One timer tick. Inert unless the current slide is timer-driven.
    /// Returns true when the slide index changed.
    pub fn tick(&self, state: &mut PlayerState) -> bool {
        if !self.is_active(state)
            || self.clock_source(state.current_slide_index()) != ClockSource::Timer
        {
            return false;
        }
        state.set_current_time(state.current_time() + TICK_INTERVAL.as_secs_f64());
        self.follow_time(state)
    }

    /// Audio clock update with the audio element's own (slide-local) time.
    /// Inert unless the current slide is audio-driven.
    pub fn on_audio_time_update(&self, state: &mut PlayerState, audio_time: f64) -> bool {
        let slide = state.current_slide_index();
        if !self.is_active(state) || self.clock_source(slide) != ClockSource::Audio {
            return false;
        }
        state.set_current_time(self.timeline.slide_start(slide) + audio_time.max(0.0));
        self.follow_time(state)
    }

    fn follow_time(&self, state: &mut PlayerState) -> bool {
        let target = self.timeline.slide_index_at(state.current_time());
        let changed = target != state.current_slide_index();
        if changed {
            state.go_to_slide(target as isize);
        }
        if state.current_time() >= state.total_duration() {
            state.pause();
            tracing::info!("Reached end of presentation");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerModes;

    fn setup(durations: &[f64], audio: &[bool], modes: TriggerModes) -> (AutoAdvance, PlayerState) {
        let timeline = Timeline::from_durations(durations.iter().copied());
        let mut state = PlayerState::new(modes);
        state.init_player(durations.len(), timeline.total(), 1, 2);
        (AutoAdvance::new(timeline, audio.to_vec()), state)
    }

    #[test]
    fn test_timer_moves_to_next_slide_by_elapsed_time() {
        let (driver, mut state) = setup(&[1.0, 1.0], &[], TriggerModes::default());
        state.play();
        let changes = (0..15).filter(|_| driver.tick(&mut state)).count();
        assert_eq!(changes, 1);
        assert_eq!(state.current_slide_index(), 1);
        assert_eq!(state.current_step_index(), 0);
    }

    #[test]
    fn test_timer_is_inert_while_paused() {
        let (driver, mut state) = setup(&[1.0, 1.0], &[], TriggerModes::default());
        assert!(!driver.tick(&mut state));
        assert_eq!(state.current_time(), 0.0);
    }

    #[test]
    fn test_click_slide_is_not_advanced_by_timer() {
        let modes = TriggerModes::with_overrides(TriggerMode::Auto, [(0, TriggerMode::Click)]);
        let (driver, mut state) = setup(&[1.0, 1.0], &[], modes);
        state.play();
        for _ in 0..50 {
            driver.tick(&mut state);
        }
        assert_eq!(state.position(), super::super::Position::default());
        assert_eq!(state.current_time(), 0.0);

        // Explicit input still moves the step.
        state.advance_step();
        assert_eq!(state.current_step_index(), 1);
    }

    #[test]
    fn test_timer_and_audio_are_exclusive() {
        let (driver, mut state) = setup(&[1.0, 1.0], &[true, false], TriggerModes::default());
        state.play();
        assert_eq!(driver.clock_source(0), ClockSource::Audio);
        assert!(!driver.tick(&mut state));
        assert_eq!(state.current_time(), 0.0);

        assert!(driver.on_audio_time_update(&mut state, 1.2));
        assert_eq!(state.current_slide_index(), 1);
        assert!((state.current_time() - 1.2).abs() < 1e-9);

        // Slide 1 has no audio: the audio callback no longer applies.
        assert!(!driver.on_audio_time_update(&mut state, 0.1));
        assert!((state.current_time() - 1.2).abs() < 1e-9);
        driver.tick(&mut state);
        assert!((state.current_time() - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_playback_pauses_at_the_end() {
        let (driver, mut state) = setup(&[0.3], &[], TriggerModes::default());
        state.play();
        for _ in 0..5 {
            driver.tick(&mut state);
        }
        assert!(!state.is_playing());
        assert_eq!(state.current_slide_index(), 0);
        assert!((state.current_time() - 0.3).abs() < 1e-9);
    }
}

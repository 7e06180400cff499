use std::collections::HashMap;

use super::driver::{AutoAdvance, ClockSource};
use super::schedule::{Cue, StepSchedule};
use super::timeline::Timeline;
use super::{Command, PlayerState, Position};
use crate::deck::{Deck, Slide};
use crate::scene::{Scene, WidgetState, calc_scene_steps, generate_scene_step_labels};
use crate::sync::{self, SlideSync, SyncPoint};
use crate::trigger::{TriggerMode, TriggerModes};

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackView {
    pub position: Position,
    pub total_slides: usize,
    pub total_scenes: usize,
    pub total_steps: usize,
    pub trigger_mode: TriggerMode,
    pub clock: ClockSource,
    pub step_labels: Vec<String>,
    pub is_playing: bool,
    /// A click-triggered step is due and playback waits for input.
    pub waiting_for_click: bool,
    pub current_time: f64,
    pub total_duration: f64,
}

/// One playback session over a deck. Owns the only [`PlayerState`] and keeps
/// its scene and step totals in line with the active slide and scene.
///
/// While playing in auto mode, the driver moves between slides by elapsed
/// time and the session fires the steps inside a slide from that slide's
/// [`StepSchedule`]. A click-triggered step stops the walk until the viewer
/// advances; on a timer-driven slide the clock waits with it.
pub struct Session {
    deck: Deck,
    state: PlayerState,
    driver: AutoAdvance,
    syncs: Vec<Option<SlideSync>>,
    schedules: Vec<StepSchedule>,
    widget_titles: Vec<HashMap<String, String>>,
    /// Slide-local time of the last manual step back. Cues up to it have
    /// already fired once and wait for the next later cue.
    replay_floor: Option<f64>,
}

impl Session {
    pub fn new(deck: Deck) -> Self {
        let computed = sync::sync_deck(&deck);
        let timeline = Timeline::for_deck(&deck, &computed);
        let syncs: Vec<Option<SlideSync>> = deck
            .slides
            .iter()
            .map(|slide| computed.iter().find(|s| s.slide_id == slide.id).cloned())
            .collect();
        let schedules = deck
            .slides
            .iter()
            .zip(&syncs)
            .enumerate()
            .map(|(index, (slide, sync))| {
                StepSchedule::for_slide(slide, sync.as_ref(), timeline.slide_duration(index))
            })
            .collect();
        let widget_titles = deck.slides.iter().map(Slide::widget_titles).collect();
        let audio_slides = deck.slides.iter().map(Slide::has_audio).collect();

        let modes = TriggerModes::with_overrides(deck.trigger_mode, deck.slide_trigger_overrides());
        let mut state = PlayerState::new(modes);
        state.init_player(deck.slides.len(), timeline.total(), 0, 0);

        let mut session = Self {
            deck,
            state,
            driver: AutoAdvance::new(timeline, audio_slides),
            syncs,
            schedules,
            widget_titles,
            replay_floor: None,
        };
        session.refresh_counts();
        session
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        self.driver.timeline()
    }

    pub fn slide(&self) -> &Slide {
        &self.deck.slides[self.state.current_slide_index()]
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.slide().scenes.get(self.state.current_scene_index())
    }

    /// Re-derive scene and step totals for the active slide and scene.
    fn refresh_counts(&mut self) {
        let slide = &self.deck.slides[self.state.current_slide_index()];
        let (scenes, steps) = match slide.scenes.get(self.state.current_scene_index()) {
            Some(scene) => (slide.scenes.len(), calc_scene_steps(scene)),
            None => (1, slide.reveal_steps),
        };
        self.state.set_scene_counts(scenes, steps);
    }

    /// Apply a command. A slide change moves the clock to the new slide's start
    /// so the auto-advance driver continues from there.
    pub fn apply(&mut self, command: Command) {
        let slide = self.state.current_slide_index();
        let before = self.walk_index();
        self.state.apply(command);
        let current = self.state.current_slide_index();
        if current != slide {
            let start = self.timeline().slide_start(current);
            self.state.set_current_time(start);
            self.replay_floor = None;
        }
        self.refresh_counts();
        if current == slide && self.walk_index() < before {
            self.replay_floor = Some(self.local_time());
        }
    }

    fn walk_index(&self) -> Option<usize> {
        let position = self.state.position();
        self.schedules[position.slide].index_of(position.scene, position.step)
    }

    /// Seconds since the start of the current slide.
    fn local_time(&self) -> f64 {
        self.state.current_time() - self.timeline().slide_start(self.state.current_slide_index())
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedules[self.state.current_slide_index()]
    }

    /// The next step of the current slide, once the clock has reached it.
    fn due_cue(&self) -> Option<Cue> {
        let position = self.state.position();
        let schedule = &self.schedules[position.slide];
        let cue = *schedule.next_after(position.scene, position.step)?;
        let resume = match self.replay_floor {
            Some(floor) => schedule
                .cues()
                .iter()
                .find(|c| c.at > floor)
                .map_or(f64::INFINITY, |c| c.at),
            None => 0.0,
        };
        (cue.at.max(resume) <= self.local_time()).then_some(cue)
    }

    fn cue_trigger_mode(&self, cue: &Cue) -> TriggerMode {
        let slide_index = self.state.current_slide_index();
        let modes = self.state.trigger_modes();
        match self.slide().scenes.get(cue.scene) {
            Some(scene) => modes.resolve_step(slide_index, scene, cue.step),
            None => modes.resolve(slide_index),
        }
    }

    /// Whether a due step is waiting for a click.
    pub fn is_waiting_for_click(&self) -> bool {
        self.due_cue()
            .is_some_and(|cue| self.cue_trigger_mode(&cue) == TriggerMode::Click)
    }

    /// Advance through every due auto-triggered step. Returns whether any fired.
    fn fire_due_steps(&mut self) -> bool {
        let mut fired = false;
        while let Some(cue) = self.due_cue() {
            if self.cue_trigger_mode(&cue) != TriggerMode::Auto {
                break;
            }
            tracing::debug!(
                slide = self.state.current_slide_index(),
                scene = cue.scene,
                step = cue.step,
                at = cue.at,
                "Step fired"
            );
            self.advance();
            fired = true;
        }
        fired
    }

    fn after_clock(&mut self, slide_changed: bool) -> bool {
        if slide_changed {
            self.replay_floor = None;
            self.refresh_counts();
        }
        let fired = self.fire_due_steps();
        slide_changed || fired
    }

    /// Next step of the current scene, then the next scene or slide.
    pub fn advance(&mut self) {
        if self.slide().has_scenes() {
            if self.state.current_step_index() + 1 < self.state.total_steps() {
                let next = self.state.current_step_index() + 1;
                self.apply(Command::GoToStep(next as isize));
            } else {
                self.apply(Command::AdvanceScene);
            }
        } else {
            self.apply(Command::AdvanceStep);
        }
    }

    pub fn retreat(&mut self) {
        if self.slide().has_scenes() {
            if self.state.current_step_index() > 0 {
                self.apply(Command::RetreatStep);
            } else {
                self.apply(Command::RetreatScene);
            }
        } else {
            self.apply(Command::RetreatStep);
        }
    }

    /// Out-of-order jump within the current scene. Honoured only when the
    /// scene allows it; returns whether the jump happened.
    pub fn jump_to_step(&mut self, step: isize) -> bool {
        let allowed = self.scene().is_some_and(|s| s.layer.allow_step_jump);
        if allowed {
            let last = self.state.total_steps().saturating_sub(1);
            let step = step.min(last as isize);
            self.apply(Command::GoToStep(step));
        }
        allowed
    }

    /// One 100 ms timer tick from the player loop. Returns true when the
    /// position changed.
    pub fn tick(&mut self) -> bool {
        if !self.driver.is_active(&self.state) || self.is_waiting_for_click() {
            return false;
        }
        let changed = self.driver.tick(&mut self.state);
        self.after_clock(changed)
    }

    /// Audio clock update with slide-local audio time. The audio keeps
    /// playing while a click-triggered step waits.
    pub fn on_audio_time_update(&mut self, audio_time: f64) -> bool {
        if !self.driver.is_active(&self.state) {
            return false;
        }
        let changed = self.driver.on_audio_time_update(&mut self.state, audio_time);
        self.after_clock(changed)
    }

    pub fn clock_source(&self) -> ClockSource {
        self.driver.clock_source(self.state.current_slide_index())
    }

    /// Trigger mode at the current step: the active enter/exit behavior,
    /// then the scene, then the slide override, then the deck default.
    pub fn trigger_mode(&self) -> TriggerMode {
        let slide_index = self.state.current_slide_index();
        let modes = self.state.trigger_modes();
        match self.scene() {
            Some(scene) => modes.resolve_step(slide_index, scene, self.state.current_step_index()),
            None => modes.resolve(slide_index),
        }
    }

    /// Toggle the current slide between following the deck default and an
    /// explicit override of the opposite mode.
    pub fn toggle_slide_trigger_mode(&mut self) -> TriggerMode {
        let slide_index = self.state.current_slide_index();
        let modes = self.state.trigger_modes();
        let command = match modes.slide_override(slide_index) {
            Some(_) => Command::ClearSlideTriggerMode(slide_index),
            None => Command::SetSlideTriggerMode(
                slide_index,
                modes.presentation_default().toggled(),
            ),
        };
        self.apply(command);
        self.state.resolved_trigger_mode()
    }

    pub fn step_labels(&self) -> Vec<String> {
        let slide_index = self.state.current_slide_index();
        match self.scene() {
            Some(scene) => generate_scene_step_labels(scene, &self.widget_titles[slide_index]),
            None => (0..=self.slide().reveal_steps)
                .map(|i| format!("Step {i}"))
                .collect(),
        }
    }

    pub fn widget_states(&self) -> Vec<WidgetState> {
        self.scene()
            .map(|s| s.layer.widget_states_at(self.state.current_step_index()))
            .unwrap_or_default()
    }

    pub fn slide_sync(&self) -> Option<&SlideSync> {
        self.syncs[self.state.current_slide_index()].as_ref()
    }

    /// Sync points of the current slide whose time has been reached.
    pub fn fired_sync_points(&self) -> Vec<&SyncPoint> {
        let Some(sync) = self.slide_sync() else {
            return Vec::new();
        };
        let slide_start = self.timeline().slide_start(self.state.current_slide_index());
        sync.fired(self.state.current_time() - slide_start).collect()
    }

    pub fn widget_title(&self, widget_id: &str) -> String {
        self.widget_titles[self.state.current_slide_index()]
            .get(widget_id)
            .cloned()
            .unwrap_or_else(|| format!("Widget {widget_id}"))
    }

    pub fn view(&self) -> PlaybackView {
        PlaybackView {
            position: self.state.position(),
            total_slides: self.state.total_slides(),
            total_scenes: self.state.total_scenes(),
            total_steps: self.state.total_steps(),
            trigger_mode: self.trigger_mode(),
            clock: self.clock_source(),
            step_labels: self.step_labels(),
            is_playing: self.state.is_playing(),
            waiting_for_click: self.is_waiting_for_click(),
            current_time: self.state.current_time(),
            total_duration: self.state.total_duration(),
        }
    }
}

/// Number of steps each scene of a slide contributes, in scene order.
pub fn scene_step_counts(slide: &Slide) -> Vec<usize> {
    slide.scenes.iter().map(calc_scene_steps).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        let content = include_str!("../../../../sample-presentations/quarterly-review.yaml");
        Session::new(Deck::parse(content).unwrap())
    }

    fn pos(slide: usize, scene: usize, step: usize) -> Position {
        Position { slide, scene, step }
    }

    #[test]
    fn test_starts_at_origin_with_first_scene_counts() {
        let session = sample();
        let view = session.view();
        assert_eq!(view.position, pos(0, 0, 0));
        assert_eq!(view.total_slides, 4);
        assert_eq!(view.total_scenes, 2);
        assert_eq!(view.total_steps, 4);
        assert_eq!(
            view.step_labels,
            vec!["Overview", "Quarterly revenue", "Operating margin", "Headcount"]
        );
        assert!(!view.is_playing);
    }

    #[test]
    fn test_advance_walks_steps_then_scenes_then_slides() {
        let mut session = sample();
        for _ in 0..3 {
            session.advance();
        }
        assert_eq!(session.state().position(), pos(0, 0, 3));

        session.advance();
        assert_eq!(session.state().position(), pos(0, 1, 0));
        assert_eq!(session.state().total_steps(), 2);
        assert_eq!(session.step_labels(), vec!["Thanks", "Exit"]);

        session.advance();
        session.advance();
        assert_eq!(session.state().position(), pos(1, 0, 0));
        assert_eq!(session.state().total_scenes(), 1);
    }

    #[test]
    fn test_retreat_crosses_back_to_first_scene() {
        let mut session = sample();
        session.apply(Command::GoToSlide(1));
        session.retreat();
        assert_eq!(session.state().position(), pos(0, 0, 0));
        assert_eq!(session.state().total_steps(), 4);
    }

    #[test]
    fn test_legacy_slide_uses_reveal_steps() {
        let mut session = sample();
        session.apply(Command::GoToSlide(3));
        assert_eq!(session.state().total_steps(), 3);
        assert_eq!(session.scene(), None);
        assert_eq!(session.step_labels().len(), 4);
        for _ in 0..10 {
            session.advance();
        }
        assert_eq!(session.state().position(), pos(3, 0, 3));
        session.retreat();
        assert_eq!(session.state().current_step_index(), 2);
    }

    #[test]
    fn test_trigger_mode_follows_slide_override_and_behavior() {
        let mut session = sample();
        assert_eq!(session.trigger_mode(), TriggerMode::Auto);
        session.apply(Command::GoToSlide(1));
        assert_eq!(session.trigger_mode(), TriggerMode::Click);

        // Scene "closing" on slide 0 has a click-triggered exit.
        session.apply(Command::GoToSlide(0));
        session.apply(Command::GoToScene(1));
        assert_eq!(session.trigger_mode(), TriggerMode::Auto);
        session.advance();
        assert_eq!(session.trigger_mode(), TriggerMode::Click);
    }

    #[test]
    fn test_toggling_slide_trigger_mode_sets_then_clears_override() {
        let mut session = sample();
        assert_eq!(session.toggle_slide_trigger_mode(), TriggerMode::Click);
        assert_eq!(
            session.state().trigger_modes().slide_override(0),
            Some(TriggerMode::Click)
        );
        assert_eq!(session.toggle_slide_trigger_mode(), TriggerMode::Auto);
        assert_eq!(session.state().trigger_modes().slide_override(0), None);
    }

    #[test]
    fn test_step_jump_requires_scene_permission() {
        let mut session = sample();
        assert!(session.jump_to_step(2));
        assert_eq!(session.state().current_step_index(), 2);
        assert!(session.jump_to_step(50));
        assert_eq!(session.state().current_step_index(), 3);

        session.apply(Command::GoToScene(1));
        assert!(!session.jump_to_step(1));
        assert_eq!(session.state().current_step_index(), 0);
    }

    #[test]
    fn test_click_slide_ignores_timer_ticks() {
        let mut session = sample();
        session.apply(Command::GoToSlide(1));
        session.apply(Command::Play);
        for _ in 0..100 {
            assert!(!session.tick());
        }
        assert_eq!(session.state().position(), pos(1, 0, 0));
    }

    #[test]
    fn test_audio_slide_is_driven_by_audio_clock() {
        let mut session = sample();
        session.apply(Command::Play);
        assert_eq!(session.clock_source(), ClockSource::Audio);
        assert!(!session.tick());

        let intro_end = session.slide_sync().unwrap().end_time;
        assert!(session.on_audio_time_update(intro_end + 0.05));
        assert_eq!(session.state().current_slide_index(), 1);
        assert_eq!(session.state().total_scenes(), 1);
    }

    #[test]
    fn test_widget_states_track_steps() {
        let mut session = sample();
        session.advance();
        let states = session.widget_states();
        let focused: Vec<&str> = states
            .iter()
            .filter(|s| s.focused)
            .map(|s| s.widget_id.as_str())
            .collect();
        assert_eq!(focused, vec!["revenue"]);
        assert_eq!(session.widget_title("revenue"), "Quarterly revenue");
        assert_eq!(session.widget_title("nope"), "Widget nope");
    }

    #[test]
    fn test_fired_sync_points_use_slide_local_time() {
        let mut session = sample();
        assert!(session.fired_sync_points().is_empty());
        session.apply(Command::Play);
        session.on_audio_time_update(1.0);
        let fired = session.fired_sync_points();
        assert!(!fired.is_empty());
        assert!(fired.iter().all(|p| p.timestamp <= 1.0));
    }

    #[test]
    fn test_manual_slide_change_realigns_clock() {
        let mut session = sample();
        session.apply(Command::GoToSlide(2));
        let start = session.timeline().slide_start(2);
        assert_eq!(session.state().current_time(), start);

        // A timer-driven slide continues from its own start, not from zero.
        session.apply(Command::GoToSlide(3));
        session.apply(Command::Play);
        assert!(!session.tick());
        assert_eq!(session.state().current_slide_index(), 3);
    }

    #[test]
    fn test_auto_audio_slide_walks_its_steps() {
        let mut session = sample();
        session.apply(Command::Play);
        assert!(session.on_audio_time_update(2.1));
        assert_eq!(session.state().position(), pos(0, 0, 1));

        session.on_audio_time_update(5.3);
        assert_eq!(session.state().position(), pos(0, 0, 3));
        assert_eq!(session.fired_sync_points().len(), 4);

        session.on_audio_time_update(7.1);
        assert_eq!(session.state().position(), pos(0, 1, 0));
        assert_eq!(session.state().total_steps(), 2);
    }

    #[test]
    fn test_click_triggered_exit_step_holds() {
        let mut session = sample();
        session.apply(Command::Play);
        let end = session.slide_sync().unwrap().end_time;
        session.on_audio_time_update(end - 0.1);
        assert_eq!(session.state().position(), pos(0, 1, 0));
        assert!(session.is_waiting_for_click());
        assert!(session.view().waiting_for_click);

        session.advance();
        assert_eq!(session.state().position(), pos(0, 1, 1));
        assert!(!session.is_waiting_for_click());
        assert!(!session.on_audio_time_update(end - 0.05));

        assert!(session.on_audio_time_update(end + 0.05));
        assert_eq!(session.state().current_slide_index(), 1);
    }

    #[test]
    fn test_auto_timer_slide_walks_reveal_steps() {
        let mut session = sample();
        session.apply(Command::GoToSlide(3));
        session.apply(Command::Play);
        for _ in 0..15 {
            session.tick();
        }
        assert_eq!(session.state().position(), pos(3, 0, 1));
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.state().position(), pos(3, 0, 2));
    }

    #[test]
    fn test_timer_waits_at_click_triggered_step() {
        let content = "\
trigger_mode: auto
slides:
  - id: one
    duration_ms: 2000
    elements:
      - { id: w }
    scenes:
      - id: a
        order: 0
        layer:
          animated_widget_ids: [w]
          exit_behavior: { trigger_mode: click }
  - id: two
";
        let mut session = Session::new(Deck::parse(content).unwrap());
        session.apply(Command::Play);
        for _ in 0..40 {
            session.tick();
        }
        assert_eq!(session.state().position(), pos(0, 0, 0));
        assert!(session.is_waiting_for_click());
        let held_at = session.state().current_time();
        assert!((1.0..1.2).contains(&held_at));

        session.advance();
        assert_eq!(session.state().position(), pos(0, 0, 1));
        for _ in 0..15 {
            session.tick();
        }
        assert_eq!(session.state().current_slide_index(), 1);
    }

    #[test]
    fn test_step_back_waits_for_next_cue() {
        let mut session = sample();
        session.apply(Command::Play);
        session.on_audio_time_update(4.1);
        assert_eq!(session.state().position(), pos(0, 0, 2));

        session.retreat();
        assert_eq!(session.state().position(), pos(0, 0, 1));
        assert!(!session.on_audio_time_update(4.5));
        assert_eq!(session.state().position(), pos(0, 0, 1));

        // Catches up with the schedule at the headcount cue.
        session.on_audio_time_update(5.3);
        assert_eq!(session.state().position(), pos(0, 0, 3));
    }

    #[test]
    fn test_counts_steps_per_scene() {
        let session = sample();
        assert_eq!(scene_step_counts(&session.deck().slides[0]), vec![4, 2]);
    }
}

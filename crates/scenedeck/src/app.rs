use eframe::egui;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::deck::{Deck, ElementKind};
use crate::playback::driver::{ClockSource, TICK_INTERVAL};
use crate::playback::session::Session;
use crate::playback::{Command, Position};
use crate::scene::{DisplayMode, InteractionAction, InteractionTrigger, Visibility, WidgetState};
use crate::theme::Theme;
use crate::trigger::TriggerMode;

const WIDGET_COLUMNS: usize = 3;

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

/// Local reactions to widget interactions. Cleared whenever the position changes.
#[derive(Default)]
struct Interactions {
    expanded: HashSet<String>,
    toggled: HashSet<String>,
    focus: Option<String>,
}

impl Interactions {
    fn apply(&mut self, widget_id: &str, action: InteractionAction) {
        match action {
            InteractionAction::Expand => {
                if !self.expanded.remove(widget_id) {
                    self.expanded.insert(widget_id.to_string());
                }
            }
            InteractionAction::ToggleVisibility => {
                if !self.toggled.remove(widget_id) {
                    self.toggled.insert(widget_id.to_string());
                }
            }
            InteractionAction::Focus => self.focus = Some(widget_id.to_string()),
        }
    }

    fn adjust(&self, mut state: WidgetState) -> WidgetState {
        if self.expanded.contains(&state.widget_id) {
            state.display_mode = DisplayMode::Expanded;
        }
        if self.toggled.contains(&state.widget_id) {
            state.visibility = if state.is_visible() {
                Visibility::Hidden
            } else {
                Visibility::Visible
            };
        }
        if let Some(focus) = &self.focus {
            state.focused = &state.widget_id == focus;
        }
        state
    }
}

struct PlayerApp {
    session: Session,
    theme: Theme,
    show_hud: bool,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    last_frame: Instant,
    /// Unspent timer time, drained in 100 ms ticks.
    tick_budget: f64,
    /// Simulated voice-over position on the current audio slide.
    audio_time: f64,
    audio_slide: usize,
    interactions: Interactions,
    interaction_position: Position,
    /// Widget boxes from the last frame, used for hit testing.
    widget_rects: Vec<(String, egui::Rect)>,
    frame_count: u32,
    fps: f32,
    fps_update: Instant,
}

impl PlayerApp {
    fn new(session: Session, theme: Theme) -> Self {
        let now = Instant::now();
        let position = session.state().position();
        Self {
            session,
            theme,
            show_hud: false,
            toast: None,
            last_esc: None,
            last_frame: now,
            tick_budget: 0.0,
            audio_time: 0.0,
            audio_slide: position.slide,
            interactions: Interactions::default(),
            interaction_position: position,
            widget_rects: Vec::new(),
            frame_count: 0,
            fps: 0.0,
            fps_update: now,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn toggle_play(&mut self) {
        self.session.apply(Command::TogglePlay);
        let message = if self.session.state().is_playing() {
            "Playing"
        } else {
            "Paused"
        };
        self.toast = Some(Toast::new(message.to_string()));
    }

    fn toggle_slide_trigger(&mut self) {
        let mode = self.session.toggle_slide_trigger_mode();
        let slide = self.session.state().current_slide_index() + 1;
        self.toast = Some(Toast::new(format!("Slide {slide}: {mode}")));
    }

    fn jump_to_step(&mut self, step: usize) {
        if !self.session.jump_to_step(step as isize) {
            self.toast = Some(Toast::new("This scene plays in order".to_string()));
        }
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_update.elapsed().as_secs_f32();
        if elapsed >= 0.5 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_update = Instant::now();
        }
    }

    /// Feed elapsed wall time to whichever clock drives the current slide.
    fn drive_clock(&mut self) {
        let elapsed = self.last_frame.elapsed().as_secs_f64();
        self.last_frame = Instant::now();

        let slide = self.session.state().current_slide_index();
        if slide != self.audio_slide {
            self.audio_slide = slide;
            self.audio_time = 0.0;
        }
        if !self.session.state().is_playing() {
            self.tick_budget = 0.0;
            return;
        }

        match self.session.clock_source() {
            ClockSource::Timer => {
                self.tick_budget += elapsed;
                let interval = TICK_INTERVAL.as_secs_f64();
                while self.tick_budget >= interval {
                    self.tick_budget -= interval;
                    self.session.tick();
                }
            }
            ClockSource::Audio => {
                self.audio_time += elapsed;
                self.session.on_audio_time_update(self.audio_time);
            }
        }
    }

    fn widget_at(&self, pos: egui::Pos2) -> Option<&str> {
        self.widget_rects
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| id.as_str())
    }

    fn handle_mouse_input(&mut self, ctx: &egui::Context) {
        let (primary, secondary, pos) = ctx.input(|i| {
            (
                i.pointer.primary_clicked(),
                i.pointer.secondary_clicked(),
                i.pointer.interact_pos(),
            )
        });

        if primary {
            let layer_action = pos.and_then(|p| self.widget_at(p)).and_then(|id| {
                self.session
                    .scene()
                    .and_then(|s| s.layer.interaction_for(id, InteractionTrigger::Click))
                    .map(|action| (id.to_string(), action))
            });
            match layer_action {
                Some((id, action)) => self.interactions.apply(&id, action),
                None => self.session.advance(),
            }
        } else if secondary {
            self.session.retreat();
        }
    }

    fn hovered_interaction(&self, ctx: &egui::Context) -> Option<(String, InteractionAction)> {
        let pos = ctx.input(|i| i.pointer.hover_pos())?;
        let id = self.widget_at(pos)?;
        let action = self
            .session
            .scene()?
            .layer
            .interaction_for(id, InteractionTrigger::Hover)?;
        Some((id.to_string(), action))
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_fps();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            if i.key_pressed(egui::Key::Escape) {
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < 1.0 {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            if i.key_pressed(egui::Key::D) {
                self.toggle_theme();
                return;
            }

            if i.key_pressed(egui::Key::ArrowRight)
                || i.key_pressed(egui::Key::N)
                || i.key_pressed(egui::Key::Space)
            {
                self.session.advance();
            }
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::P) {
                self.session.retreat();
            }
            if i.key_pressed(egui::Key::PageDown) {
                self.session.apply(Command::AdvanceScene);
            }
            if i.key_pressed(egui::Key::PageUp) {
                self.session.apply(Command::RetreatScene);
            }
            if i.key_pressed(egui::Key::Home) {
                self.session.apply(Command::GoToSlide(0));
            }
            if i.key_pressed(egui::Key::End) {
                self.session.apply(Command::GoToSlide(isize::MAX));
            }
            if i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::K) {
                self.toggle_play();
            }
            if i.key_pressed(egui::Key::A) {
                self.toggle_slide_trigger();
            }
            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }

            let digits = [
                egui::Key::Num1,
                egui::Key::Num2,
                egui::Key::Num3,
                egui::Key::Num4,
                egui::Key::Num5,
                egui::Key::Num6,
                egui::Key::Num7,
                egui::Key::Num8,
                egui::Key::Num9,
            ];
            if let Some(step) = digits.iter().position(|k| i.key_pressed(*k)) {
                self.jump_to_step(step);
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        self.handle_mouse_input(ctx);
        self.drive_clock();

        let position = self.session.state().position();
        if position != self.interaction_position {
            self.interactions = Interactions::default();
            self.interaction_position = position;
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        if self.session.state().is_playing() {
            ctx.request_repaint_after(TICK_INTERVAL);
        }

        let hovered = self.hovered_interaction(ctx);
        let bg = self.theme.background;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let scale = (rect.width() / 1280.0).min(rect.height() / 720.0).max(0.5);

                draw_breadcrumb(ui, &self.session, &self.theme, rect, scale);
                draw_step_labels(ui, &self.session, &self.theme, rect, scale);

                let stage = egui::Rect::from_min_max(
                    egui::pos2(rect.left() + 48.0 * scale, rect.top() + 150.0 * scale),
                    egui::pos2(rect.right() - 320.0 * scale, rect.bottom() - 70.0 * scale),
                );
                self.widget_rects = if self.session.scene().is_some() {
                    let states: Vec<WidgetState> = self
                        .session
                        .widget_states()
                        .into_iter()
                        .map(|s| self.interactions.adjust(s))
                        .collect();
                    draw_widgets(
                        ui,
                        &self.session,
                        &states,
                        hovered.as_ref(),
                        &self.theme,
                        stage,
                        scale,
                    )
                } else {
                    draw_legacy_slide(ui, &self.session, &self.theme, stage, scale);
                    Vec::new()
                };

                let side = egui::Rect::from_min_max(
                    egui::pos2(rect.right() - 290.0 * scale, rect.top() + 150.0 * scale),
                    egui::pos2(rect.right() - 24.0 * scale, rect.bottom() - 70.0 * scale),
                );
                draw_sync_panel(ui, &self.session, &self.theme, side, scale);
                draw_status(ui, &self.session, &self.theme, rect, scale, self.fps);

                if let Some(ref toast) = self.toast {
                    let opacity = toast.opacity();
                    if opacity > 0.0 {
                        let toast_color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
                        let toast_bg = Theme::with_opacity(self.theme.panel, opacity * 0.9);
                        let galley = ui.painter().layout_no_wrap(
                            toast.message.clone(),
                            egui::FontId::proportional(20.0 * scale),
                            toast_color,
                        );
                        let padding = 16.0 * scale;
                        let toast_rect = egui::Rect::from_min_size(
                            egui::pos2(
                                rect.center().x - galley.rect.width() / 2.0 - padding,
                                rect.bottom() - 120.0 * scale,
                            ),
                            egui::vec2(
                                galley.rect.width() + padding * 2.0,
                                galley.rect.height() + padding * 2.0,
                            ),
                        );
                        ui.painter().rect_filled(toast_rect, 8.0 * scale, toast_bg);
                        let text_pos =
                            egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
                        ui.painter().galley(text_pos, galley, toast_color);
                        ctx.request_repaint();
                    }
                }

                if self.show_hud {
                    draw_hud(ui, &self.theme, rect, scale);
                }
            });
    }
}

fn text(
    ui: &egui::Ui,
    pos: egui::Pos2,
    anchor: egui::Align2,
    s: &str,
    size: f32,
    color: egui::Color32,
) -> egui::Rect {
    ui.painter()
        .text(pos, anchor, s, egui::FontId::proportional(size), color)
}

fn draw_breadcrumb(ui: &egui::Ui, session: &Session, theme: &Theme, rect: egui::Rect, scale: f32) {
    let slide = session.slide();
    let mut crumbs = vec![session.deck().display_title().to_string()];
    crumbs.push(if slide.title.is_empty() {
        slide.id.clone()
    } else {
        slide.title.clone()
    });
    if let Some(scene) = session.scene() {
        crumbs.push(scene.title.clone());
    }
    text(
        ui,
        egui::pos2(rect.left() + 48.0 * scale, rect.top() + 32.0 * scale),
        egui::Align2::LEFT_TOP,
        &crumbs.join("  \u{203a}  "),
        28.0 * scale,
        theme.heading_color,
    );

    let view = session.view();
    let position = format!(
        "slide {}/{}   scene {}/{}   step {}/{}",
        view.position.slide + 1,
        view.total_slides,
        view.position.scene + 1,
        view.total_scenes,
        view.position.step + 1,
        view.step_labels.len(),
    );
    text(
        ui,
        egui::pos2(rect.left() + 48.0 * scale, rect.top() + 72.0 * scale),
        egui::Align2::LEFT_TOP,
        &position,
        16.0 * scale,
        Theme::with_opacity(theme.foreground, 0.6),
    );
}

fn draw_step_labels(ui: &egui::Ui, session: &Session, theme: &Theme, rect: egui::Rect, scale: f32) {
    let current = session.state().current_step_index();
    let mut x = rect.left() + 48.0 * scale;
    let y = rect.top() + 104.0 * scale;
    let padding = 10.0 * scale;

    for (index, label) in session.step_labels().iter().enumerate() {
        let active = index == current;
        let color = if active {
            theme.background
        } else {
            Theme::with_opacity(theme.foreground, 0.7)
        };
        let galley = ui.painter().layout_no_wrap(
            label.clone(),
            egui::FontId::proportional(15.0 * scale),
            color,
        );
        let pill = egui::Rect::from_min_size(
            egui::pos2(x, y),
            galley.rect.size() + egui::vec2(padding * 2.0, padding),
        );
        let fill = if active { theme.accent } else { theme.panel };
        ui.painter().rect_filled(pill, 12.0 * scale, fill);
        ui.painter().galley(
            egui::pos2(pill.left() + padding, pill.top() + padding / 2.0),
            galley,
            color,
        );
        x = pill.right() + 8.0 * scale;
    }
}

/// Lay out one box per widget and return the boxes for hit testing.
fn draw_widgets(
    ui: &egui::Ui,
    session: &Session,
    states: &[WidgetState],
    hovered: Option<&(String, InteractionAction)>,
    theme: &Theme,
    stage: egui::Rect,
    scale: f32,
) -> Vec<(String, egui::Rect)> {
    let gap = 16.0 * scale;
    let cell_w = (stage.width() - gap * (WIDGET_COLUMNS - 1) as f32) / WIDGET_COLUMNS as f32;
    let cell_h = 120.0 * scale;
    let mut rects = Vec::with_capacity(states.len());

    for (index, state) in states.iter().enumerate() {
        let column = index % WIDGET_COLUMNS;
        let row = index / WIDGET_COLUMNS;
        let origin = egui::pos2(
            stage.left() + column as f32 * (cell_w + gap),
            stage.top() + row as f32 * (cell_h + gap),
        );
        let height = match state.display_mode {
            DisplayMode::Compact => cell_h * 0.6,
            DisplayMode::Full => cell_h,
            DisplayMode::Expanded => cell_h + gap + cell_h * 0.5,
        };
        let cell = egui::Rect::from_min_size(origin, egui::vec2(cell_w, height));

        let hover = hovered.filter(|(id, _)| id == &state.widget_id);
        let (fill, outline, width) = match (state.is_visible(), state.focused) {
            (false, _) => (Theme::with_opacity(theme.panel, 0.4), theme.hidden, 1.0),
            (true, true) => (theme.panel, theme.focus, 3.0),
            (true, false) if hover.is_some() => (theme.panel, theme.accent, 2.0),
            (true, false) => (theme.panel, Theme::with_opacity(theme.foreground, 0.3), 1.0),
        };
        ui.painter().rect_filled(cell, 8.0 * scale, fill);
        ui.painter().rect_stroke(
            cell,
            8.0 * scale,
            egui::Stroke::new(width * scale, outline),
            egui::StrokeKind::Inside,
        );

        let title_color = if state.is_visible() {
            theme.heading_color
        } else {
            theme.hidden
        };
        text(
            ui,
            cell.left_top() + egui::vec2(14.0, 12.0) * scale,
            egui::Align2::LEFT_TOP,
            &session.widget_title(&state.widget_id),
            18.0 * scale,
            title_color,
        );
        let mut detail = format!("{}  {:?}", state.widget_id, state.display_mode).to_lowercase();
        if let Some((_, action)) = hover {
            detail.push_str(&format!("  hover: {action:?}").to_lowercase());
        }
        text(
            ui,
            cell.left_bottom() + egui::vec2(14.0, -12.0) * scale,
            egui::Align2::LEFT_BOTTOM,
            &detail,
            12.0 * scale,
            Theme::with_opacity(theme.foreground, 0.5),
        );
        rects.push((state.widget_id.clone(), cell));
    }
    rects
}

/// Slides without scenes show their element tree, revealing one top-level
/// element per step after the headings.
fn draw_legacy_slide(ui: &egui::Ui, session: &Session, theme: &Theme, stage: egui::Rect, scale: f32) {
    let slide = session.slide();
    let revealed = session.state().current_step_index();
    let mut y = stage.top();
    let mut shown = 0;

    for (index, element) in slide.elements.iter().enumerate() {
        if element.parent.is_some() {
            continue;
        }
        let heading = element.kind == ElementKind::Heading;
        if !heading {
            shown += 1;
        }
        let color = if heading || shown <= revealed {
            theme.foreground
        } else {
            theme.hidden
        };
        let size = if heading { 32.0 } else { 22.0 };
        let label = element.match_text().unwrap_or(&element.id);
        let r = text(
            ui,
            egui::pos2(stage.left(), y),
            egui::Align2::LEFT_TOP,
            label,
            size * scale,
            color,
        );
        y = r.bottom() + 10.0 * scale;

        for child in slide.children(index) {
            let label = child.match_text().unwrap_or(&child.id);
            let r = text(
                ui,
                egui::pos2(stage.left() + 32.0 * scale, y),
                egui::Align2::LEFT_TOP,
                &format!("\u{2022} {label}"),
                20.0 * scale,
                color,
            );
            y = r.bottom() + 8.0 * scale;
        }
    }
}

fn draw_sync_panel(ui: &egui::Ui, session: &Session, theme: &Theme, side: egui::Rect, scale: f32) {
    ui.painter().rect_filled(side, 8.0 * scale, theme.panel);
    let padding = 14.0 * scale;
    let mut y = side.top() + padding;
    let r = text(
        ui,
        egui::pos2(side.left() + padding, y),
        egui::Align2::LEFT_TOP,
        "Voice-over sync",
        16.0 * scale,
        theme.heading_color,
    );
    y = r.bottom() + 10.0 * scale;

    let Some(sync) = session.slide_sync() else {
        text(
            ui,
            egui::pos2(side.left() + padding, y),
            egui::Align2::LEFT_TOP,
            "no words on this slide",
            13.0 * scale,
            Theme::with_opacity(theme.foreground, 0.5),
        );
        return;
    };

    let fired: HashSet<&str> = session
        .fired_sync_points()
        .iter()
        .map(|p| p.element_id.as_str())
        .collect();
    for point in &sync.sync_points {
        let color = if fired.contains(point.element_id.as_str()) {
            theme.foreground
        } else {
            Theme::with_opacity(theme.foreground, 0.35)
        };
        let word = point.trigger_word.as_deref().unwrap_or("\u{2014}");
        let line = format!("{:>6.2}s  {}  {word}", point.timestamp, point.element_id);
        let r = text(
            ui,
            egui::pos2(side.left() + padding, y),
            egui::Align2::LEFT_TOP,
            &line,
            13.0 * scale,
            color,
        );
        y = r.bottom() + 6.0 * scale;
    }
}

fn draw_status(ui: &egui::Ui, session: &Session, theme: &Theme, rect: egui::Rect, scale: f32, fps: f32) {
    let view = session.view();
    let y = rect.bottom() - 30.0 * scale;

    let (badge, color) = match view.trigger_mode {
        TriggerMode::Auto => ("AUTO", theme.auto_badge),
        TriggerMode::Click => ("CLICK", theme.click_badge),
    };
    let r = text(
        ui,
        egui::pos2(rect.left() + 48.0 * scale, y),
        egui::Align2::LEFT_CENTER,
        badge,
        16.0 * scale,
        color,
    );

    let clock = match view.clock {
        ClockSource::Timer => "timer",
        ClockSource::Audio => "audio",
    };
    let transport = if view.is_playing { "\u{25b6}" } else { "\u{23f8}" };
    let mut status = format!(
        "{transport}  {:.1} / {:.1} s  ({clock})",
        view.current_time, view.total_duration
    );
    if view.waiting_for_click {
        status.push_str("  waiting for click");
    }
    text(
        ui,
        egui::pos2(r.right() + 16.0 * scale, y),
        egui::Align2::LEFT_CENTER,
        &status,
        14.0 * scale,
        Theme::with_opacity(theme.foreground, 0.6),
    );

    let fps_color = Theme::with_opacity(theme.foreground, 0.3);
    ui.painter().text(
        egui::pos2(rect.right() - 16.0 * scale, y),
        egui::Align2::RIGHT_CENTER,
        format!("{fps:.0} fps"),
        egui::FontId::monospace(14.0 * scale),
        fps_color,
    );
}

fn draw_hud(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, scale: f32) {
    let shortcuts = [
        ("Space / N / \u{2192}", "Next step"),
        ("P / \u{2190}", "Previous step"),
        ("PgDn / PgUp", "Next / previous scene"),
        ("1-9", "Jump to step (if allowed)"),
        ("Left click", "Next step / widget action"),
        ("Right click", "Previous step"),
        ("Enter / K", "Play / pause"),
        ("A", "Toggle slide trigger mode"),
        ("D", "Toggle theme"),
        ("F", "Toggle fullscreen"),
        ("H", "Toggle this HUD"),
        ("Home / End", "First / last slide"),
        ("Esc \u{00d7}2 / Q", "Quit"),
    ];

    let bg = Theme::with_opacity(theme.panel, 0.95);
    let text_color = Theme::with_opacity(theme.foreground, 0.9);
    let key_color = Theme::with_opacity(theme.accent, 0.9);

    let padding = 24.0 * scale;
    let line_height = 32.0 * scale;
    let hud_height = shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0 * scale;
    let hud_width = 380.0 * scale;
    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(hud_width, hud_height));
    ui.painter().rect_filled(hud_rect, 12.0 * scale, bg);

    text(
        ui,
        egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding),
        egui::Align2::LEFT_TOP,
        "Keyboard Shortcuts",
        20.0 * scale,
        Theme::with_opacity(theme.heading_color, 0.9),
    );

    let mut y = hud_rect.top() + padding + 40.0 * scale;
    for (key, desc) in &shortcuts {
        ui.painter().text(
            egui::pos2(hud_rect.left() + padding, y),
            egui::Align2::LEFT_TOP,
            *key,
            egui::FontId::monospace(15.0 * scale),
            key_color,
        );
        text(
            ui,
            egui::pos2(hud_rect.left() + padding + 170.0 * scale, y),
            egui::Align2::LEFT_TOP,
            desc,
            15.0 * scale,
            text_color,
        );
        y += line_height;
    }
}

pub fn run(
    file: PathBuf,
    windowed: bool,
    start_slide: Option<usize>,
    autoplay: bool,
) -> anyhow::Result<()> {
    let mut deck = Deck::load(&file)?;

    let config = Config::load_or_default();
    config.apply_to(&mut deck);
    let theme = Theme::from_name(config.theme().unwrap_or("light"));

    let (initial_slide, play) = match (start_slide, config.start_mode()) {
        (Some(s), _) => (s.saturating_sub(1), autoplay),
        (None, Some("playing")) => (0, true),
        (None, Some("first") | None) => (0, autoplay),
        (None, Some(n)) => (n.parse::<usize>().unwrap_or(1).saturating_sub(1), autoplay),
    };

    let title = format!("scenedeck \u{2014} {}", deck.display_title());
    let mut session = Session::new(deck);
    session.apply(Command::GoToSlide(initial_slide as isize));
    if play {
        session.apply(Command::Play);
    }
    tracing::info!(slide = initial_slide, playing = play, "Starting player");

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(PlayerApp::new(session, theme)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

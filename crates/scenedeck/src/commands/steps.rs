use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::deck::{Deck, Slide};
use crate::scene::{Scene, calc_scene_steps, generate_scene_step_labels};
use crate::sync::keywords::suggest_icon;
use crate::trigger::{TriggerMode, TriggerModes};

/// Icon names offered when a scene has no icon of its own.
const ICON_NAMES: &[&str] = &[
    "chart-bar",
    "chart-line",
    "users",
    "calendar",
    "rocket",
    "target",
    "globe",
    "money",
    "check",
    "lightbulb",
    "message",
];

/// The scene's own icon, or one suggested from its title.
fn scene_icon(scene: &Scene) -> Option<(&str, bool)> {
    match scene.icon.as_deref() {
        Some(icon) => Some((icon, false)),
        None => suggest_icon(&scene.title, ICON_NAMES).map(|icon| (icon, true)),
    }
}

/// Trigger mode of each step of a scene, exit behavior included.
fn step_modes(slide_index: usize, scene: &Scene, modes: &TriggerModes) -> Vec<TriggerMode> {
    (0..calc_scene_steps(scene))
        .map(|step| modes.resolve_step(slide_index, scene, step))
        .collect()
}

fn print_scene(slide_index: usize, slide: &Slide, scene: &Scene, modes: &TriggerModes) {
    let steps = calc_scene_steps(scene);
    let step_modes = step_modes(slide_index, scene, modes);
    let trigger = step_modes.first().copied().unwrap_or_default();
    let icon = match scene_icon(scene) {
        Some((icon, false)) => format!(" [{icon}]"),
        Some((icon, true)) => format!(" [{icon}?]").dimmed().to_string(),
        None => String::new(),
    };
    println!(
        "  {} {}{icon}  {} step(s), {}",
        format!("scene {}", scene.order + 1).cyan(),
        scene.title.bold(),
        steps,
        trigger.to_string().yellow()
    );

    let labels = generate_scene_step_labels(scene, &slide.widget_titles());
    for (step, (label, mode)) in labels.iter().zip(&step_modes).enumerate() {
        let mode = if *mode == trigger {
            mode.to_string().dimmed()
        } else {
            mode.to_string().yellow()
        };
        println!("    {step:>2}  {label}  {mode}");
    }
    if scene.layer.allow_step_jump {
        println!("    {}", "steps may be visited in any order".dimmed());
    }
}

pub fn run(file: &Path) -> Result<()> {
    let mut deck = Deck::load(file)?;
    Config::load_or_default().apply_to(&mut deck);
    let modes = TriggerModes::with_overrides(deck.trigger_mode, deck.slide_trigger_overrides());

    println!(
        "{} ({} slide(s), default trigger {})",
        deck.display_title().bold(),
        deck.slides.len(),
        deck.trigger_mode.to_string().yellow()
    );

    let mut total = 0;
    for (index, slide) in deck.slides.iter().enumerate() {
        println!();
        let title = if slide.title.is_empty() {
            slide.id.as_str()
        } else {
            slide.title.as_str()
        };
        println!(
            "{} {}  {}",
            format!("{:>2}.", index + 1).green().bold(),
            title.bold(),
            modes.resolve(index).to_string().yellow()
        );

        if slide.has_scenes() {
            for scene in &slide.scenes {
                print_scene(index, slide, scene, &modes);
                total += calc_scene_steps(scene);
            }
        } else {
            println!(
                "  {} {} reveal step(s)",
                "no scenes,".dimmed(),
                slide.reveal_steps
            );
            total += slide.reveal_steps + 1;
        }
    }

    println!();
    println!("{}", format!("{total} step(s) in total").green());
    Ok(())
}

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::deck::Deck;
use crate::sync::{SlideSync, SyncLocks, sync_deck_with_locks};

/// Parse `--lock element=seconds` pairs.
fn parse_locks(raw: &[String]) -> Result<SyncLocks> {
    raw.iter()
        .map(|entry| {
            let Some((element, seconds)) = entry.split_once('=') else {
                anyhow::bail!("Invalid lock: {entry}. Expected ELEMENT=SECONDS.");
            };
            let seconds: f64 = seconds
                .trim()
                .parse()
                .with_context(|| format!("Invalid lock time in {entry}"))?;
            if !seconds.is_finite() || seconds < 0.0 {
                anyhow::bail!("Invalid lock time in {entry}: must be zero or more seconds.");
            }
            Ok((element.trim().to_string(), seconds))
        })
        .collect()
}

fn render(syncs: &[SlideSync], json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(syncs)?)
    } else {
        Ok(serde_yaml::to_string(syncs)?)
    }
}

pub fn run(file: &Path, json: bool, output: Option<&Path>, locks: &[String]) -> Result<()> {
    let locks = parse_locks(locks)?;
    let deck = Deck::load(file)?;
    let syncs = sync_deck_with_locks(&deck, &locks);

    if syncs.is_empty() {
        eprintln!("{}", "No slides with voice-over words in this deck.".yellow());
        return Ok(());
    }

    let unmatched = syncs
        .iter()
        .flat_map(|s| &s.sync_points)
        .filter(|p| p.trigger_word.is_none() && !p.locked)
        .count();
    let text = render(&syncs, json)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("Wrote sync for {} slide(s) to {}", syncs.len(), path.display()).green()
            );
        }
        None => print!("{text}"),
    }

    if unmatched > 0 {
        eprintln!(
            "{}",
            format!("{unmatched} element(s) had no spoken match and use a staggered time.")
                .yellow()
        );
    }
    Ok(())
}

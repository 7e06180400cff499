//! Voice-over alignment.
//!
//! Each slide element is matched to the first spoken word, at or after the
//! current search cursor, that contains one of the element's keywords. The
//! matcher is greedy and single-pass: the cursor only moves forward, so an
//! element can never be placed before a word that an earlier element
//! already claimed. Elements without a match get a deterministic staggered
//! time instead of being dropped.

pub mod keywords;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::deck::{Deck, Slide, SlideElement};
use keywords::{KeywordMode, extract_keywords};

/// How far a reveal leads the word it is aligned to.
pub const ANTICIPATION_OFFSET: f64 = 0.2;
/// Fallback spacing per word of cursor progress.
pub const FALLBACK_CURSOR_SPACING: f64 = 0.5;
/// Fallback spacing per sync point already emitted.
pub const FALLBACK_POINT_SPACING: f64 = 0.3;
pub const FALLBACK_POINT_DURATION: f64 = 0.5;
/// Silence appended after the last spoken word.
pub const END_PADDING: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPoint {
    pub element_id: String,
    pub slide_id: String,
    pub timestamp: f64,
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_word: Option<String>,

    /// Set by a user lock; recomputation keeps the locked timestamp.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSync {
    pub slide_id: String,
    pub sync_points: Vec<SyncPoint>,
    pub start_time: f64,
    pub end_time: f64,
}

impl SlideSync {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Sync points whose trigger time has been reached at slide-local `time`.
    pub fn fired(&self, time: f64) -> impl Iterator<Item = &SyncPoint> {
        self.sync_points.iter().filter(move |p| p.timestamp <= time)
    }
}

/// User-fixed trigger times, keyed by element id.
pub type SyncLocks = BTreeMap<String, f64>;

/// Align `elements` (already in priority order) to `words`.
pub fn align(
    slide_id: &str,
    elements: &[&SlideElement],
    words: &[WordTimestamp],
    authored_duration: f64,
) -> SlideSync {
    let mut cursor = 0usize;
    let mut sync_points: Vec<SyncPoint> = Vec::with_capacity(elements.len());

    for element in elements {
        let keywords = element
            .match_text()
            .map(|t| extract_keywords(t, KeywordMode::Sync))
            .unwrap_or_default();

        let found = words
            .iter()
            .enumerate()
            .skip(cursor)
            .find(|(_, w)| {
                let spoken = w.word.to_lowercase();
                keywords.iter().any(|k| spoken.contains(k.as_str()))
            });

        let point = match found {
            Some((index, word)) => {
                cursor = index;
                SyncPoint {
                    element_id: element.id.clone(),
                    slide_id: slide_id.to_string(),
                    timestamp: (word.start - ANTICIPATION_OFFSET).max(0.0),
                    duration: word.end - word.start,
                    trigger_word: Some(word.word.clone()),
                    locked: false,
                }
            }
            None => {
                tracing::debug!(
                    slide = slide_id,
                    element = %element.id,
                    cursor,
                    "No spoken match, using staggered fallback"
                );
                SyncPoint {
                    element_id: element.id.clone(),
                    slide_id: slide_id.to_string(),
                    timestamp: cursor as f64 * FALLBACK_CURSOR_SPACING
                        + sync_points.len() as f64 * FALLBACK_POINT_SPACING,
                    duration: FALLBACK_POINT_DURATION,
                    trigger_word: None,
                    locked: false,
                }
            }
        };
        sync_points.push(point);
    }

    let end_time = words
        .last()
        .map(|w| w.end + END_PADDING)
        .unwrap_or(authored_duration);

    SlideSync {
        slide_id: slide_id.to_string(),
        sync_points,
        start_time: 0.0,
        end_time,
    }
}

pub fn sync_slide(slide: &Slide) -> SlideSync {
    align(
        &slide.id,
        &slide.sync_order(),
        &slide.words,
        slide.duration_secs(),
    )
}

/// Recompute a slide's sync, keeping every locked element at its locked time.
pub fn sync_slide_with_locks(slide: &Slide, locks: &SyncLocks) -> SlideSync {
    let mut sync = sync_slide(slide);
    for point in &mut sync.sync_points {
        if let Some(&locked_at) = locks.get(&point.element_id) {
            point.timestamp = locked_at;
            point.locked = true;
        }
    }
    sync
}

/// Sync every slide that has voice-over words. Slides are independent, so
/// they are aligned in parallel; the result keeps slide order.
pub fn sync_deck(deck: &Deck) -> Vec<SlideSync> {
    sync_deck_with_locks(deck, &SyncLocks::new())
}

pub fn sync_deck_with_locks(deck: &Deck, locks: &SyncLocks) -> Vec<SlideSync> {
    let syncs: Vec<SlideSync> = deck
        .slides
        .par_iter()
        .filter(|s| !s.words.is_empty())
        .map(|s| sync_slide_with_locks(s, locks))
        .collect();
    tracing::info!(
        slides = syncs.len(),
        locked = locks.len(),
        "Voice-over sync computed"
    );
    syncs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::ElementKind;

    fn text(id: &str, body: &str) -> SlideElement {
        SlideElement {
            id: id.to_string(),
            kind: ElementKind::Text,
            text: Some(body.to_string()),
            title: None,
            parent: None,
        }
    }

    fn icon(id: &str) -> SlideElement {
        SlideElement {
            id: id.to_string(),
            kind: ElementKind::Icon,
            text: None,
            title: None,
            parent: None,
        }
    }

    fn words(spoken: &[(&str, f64, f64)]) -> Vec<WordTimestamp> {
        spoken
            .iter()
            .map(|&(word, start, end)| WordTimestamp {
                word: word.to_string(),
                start,
                end,
            })
            .collect()
    }

    fn narration() -> Vec<WordTimestamp> {
        words(&[
            ("Welcome", 0.0, 0.4),
            ("to", 0.4, 0.5),
            ("our", 0.5, 0.7),
            ("revenue", 0.7, 1.2),
            ("review.", 1.2, 1.6),
            ("Margins", 1.8, 2.3),
            ("improved", 2.3, 2.8),
        ])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_match_leads_word_by_anticipation_offset() {
        let revenue = text("rev", "Revenue");
        let sync = align("s1", &[&revenue], &narration(), 5.0);
        let point = &sync.sync_points[0];
        assert!(approx(point.timestamp, 0.5));
        assert!(approx(point.duration, 0.5));
        assert_eq!(point.trigger_word.as_deref(), Some("revenue"));
    }

    #[test]
    fn test_offset_is_floored_at_zero() {
        let welcome = text("w", "Welcome everyone");
        let sync = align("s1", &[&welcome], &narration(), 5.0);
        assert_eq!(sync.sync_points[0].timestamp, 0.0);
    }

    #[test]
    fn test_unmatched_middle_element_uses_fallback_formula() {
        let first = text("a", "Revenue");
        let second = text("b", "Completely unrelated phrase");
        let third = text("c", "Margins");
        let sync = align("s1", &[&first, &second, &third], &narration(), 5.0);

        // The cursor sits on "revenue" (index 3) and one point was emitted.
        let expected = 3.0 * FALLBACK_CURSOR_SPACING + 1.0 * FALLBACK_POINT_SPACING;
        assert!(approx(sync.sync_points[1].timestamp, expected));
        assert_eq!(sync.sync_points[1].trigger_word, None);
        assert!(approx(sync.sync_points[1].duration, FALLBACK_POINT_DURATION));
        assert!(approx(sync.sync_points[2].timestamp, 1.6));
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let late = text("late", "Margins");
        let early = text("early", "Revenue");
        let sync = align("s1", &[&late, &early], &narration(), 5.0);
        assert!(approx(sync.sync_points[0].timestamp, 1.6));
        // "revenue" lies behind the cursor, so the second element falls back.
        assert_eq!(sync.sync_points[1].trigger_word, None);
        assert!(approx(sync.sync_points[1].timestamp, 5.0 * 0.5 + 0.3));
    }

    #[test]
    fn test_adjacent_elements_can_share_a_match() {
        let a = text("a", "Revenue");
        let b = text("b", "Revenue growth");
        let sync = align("s1", &[&a, &b], &narration(), 5.0);
        assert_eq!(sync.sync_points[0].timestamp, sync.sync_points[1].timestamp);
    }

    #[test]
    fn test_end_time_pads_last_word() {
        let sync = align("s1", &[], &narration(), 9.0);
        assert!(approx(sync.end_time, 2.8 + END_PADDING));
        assert_eq!(sync.start_time, 0.0);
    }

    #[test]
    fn test_empty_words_use_authored_duration() {
        let chart = icon("chart");
        let sync = align("s1", &[&chart], &[], 7.5);
        assert!(approx(sync.end_time, 7.5));
        assert_eq!(sync.sync_points.len(), 1);
        assert_eq!(sync.sync_points[0].timestamp, 0.0);
    }

    #[test]
    fn test_identical_input_gives_identical_output() {
        let a = text("a", "Revenue review");
        let b = icon("logo");
        let c = text("c", "Margins improved");
        let first = align("s1", &[&a, &b, &c], &narration(), 5.0);
        for _ in 0..20 {
            let again = align("s1", &[&a, &b, &c], &narration(), 5.0);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&again).unwrap()
            );
        }
    }

    #[test]
    fn test_locks_override_computed_times() {
        let deck = Deck::parse(
            "\
slides:
  - id: s1
    elements:
      - { id: rev, text: Revenue }
      - { id: mar, text: Margins }
    words:
      - { word: revenue, start: 0.7, end: 1.2 }
      - { word: margins, start: 1.8, end: 2.3 }
",
        )
        .unwrap();
        let locks = SyncLocks::from([("mar".to_string(), 4.25)]);
        let sync = sync_slide_with_locks(&deck.slides[0], &locks);
        assert!(approx(sync.sync_points[0].timestamp, 0.5));
        assert!(!sync.sync_points[0].locked);
        assert_eq!(sync.sync_points[1].timestamp, 4.25);
        assert!(sync.sync_points[1].locked);

        let recomputed = sync_slide_with_locks(&deck.slides[0], &locks);
        assert_eq!(recomputed, sync);
    }

    #[test]
    fn test_fired_points_follow_local_time() {
        let a = text("a", "Revenue");
        let c = text("c", "Margins");
        let sync = align("s1", &[&a, &c], &narration(), 5.0);
        assert_eq!(sync.fired(0.4).count(), 0);
        assert_eq!(sync.fired(0.5).count(), 1);
        assert_eq!(sync.fired(10.0).count(), 2);
    }

    #[test]
    fn test_sync_deck_skips_slides_without_words() {
        let content = include_str!("../../../../sample-presentations/quarterly-review.yaml");
        let deck = Deck::parse(content).unwrap();
        let syncs = sync_deck(&deck);
        let ids: Vec<&str> = syncs.iter().map(|s| s.slide_id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "numbers"]);
    }
}

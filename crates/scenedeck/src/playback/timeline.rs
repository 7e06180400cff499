use crate::deck::Deck;
use crate::sync::SlideSync;

/// Cumulative slide end times, in seconds from the start of the presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    ends: Vec<f64>,
}

impl Timeline {
    pub fn from_durations(durations: impl IntoIterator<Item = f64>) -> Self {
        let mut total = 0.0;
        let ends = durations
            .into_iter()
            .map(|d| {
                total += d.max(0.0);
                total
            })
            .collect();
        Self { ends }
    }

    /// Durations for a deck. A slide with voice-over sync lasts until the end
    /// of its sync; every other slide uses its authored duration.
    pub fn for_deck(deck: &Deck, syncs: &[SlideSync]) -> Self {
        Self::from_durations(deck.slides.iter().map(|slide| {
            syncs
                .iter()
                .find(|s| s.slide_id == slide.id)
                .map(SlideSync::duration)
                .unwrap_or_else(|| slide.duration_secs())
        }))
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    pub fn slide_start(&self, index: usize) -> f64 {
        match index {
            0 => 0.0,
            i => self
                .ends
                .get(i - 1)
                .copied()
                .unwrap_or_else(|| self.total()),
        }
    }

    pub fn slide_duration(&self, index: usize) -> f64 {
        self.slide_start(index + 1) - self.slide_start(index)
    }

    /// The slide playing at `elapsed`: the first slide whose cumulative end
    /// exceeds it. Saturates at the last slide.
    pub fn slide_index_at(&self, elapsed: f64) -> usize {
        self.ends
            .iter()
            .position(|&end| end > elapsed)
            .unwrap_or_else(|| self.ends.len().saturating_sub(1))
    }
}

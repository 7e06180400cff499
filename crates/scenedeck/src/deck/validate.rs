use std::collections::HashSet;

use thiserror::Error;

use super::Deck;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Deck has no slides")]
    Empty,

    #[error("Duplicate slide id '{0}'")]
    DuplicateSlide(String),

    #[error("Slide '{slide}': scene orders must be 0..{count} without gaps, found {found:?}")]
    SceneOrderGap {
        slide: String,
        count: usize,
        found: Vec<usize>,
    },

    #[error("Slide '{slide}': duplicate scene id '{scene}'")]
    DuplicateScene { slide: String, scene: String },

    #[error("Slide '{slide}': word {index} ('{word}') is out of order or overlaps the previous word")]
    WordOrder {
        slide: String,
        index: usize,
        word: String,
    },

    #[error("Slide '{slide}': element '{element}' has parent index {parent} out of range")]
    ElementParent {
        slide: String,
        element: String,
        parent: usize,
    },
}

pub fn validate(deck: &Deck) -> Result<(), DeckError> {
    if deck.slides.is_empty() {
        return Err(DeckError::Empty);
    }

    let mut slide_ids = HashSet::new();
    for slide in &deck.slides {
        if !slide_ids.insert(slide.id.as_str()) {
            return Err(DeckError::DuplicateSlide(slide.id.clone()));
        }
    }

    for slide in &deck.slides {
        let mut orders: Vec<usize> = slide.scenes.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        if orders.iter().enumerate().any(|(i, &o)| i != o) {
            return Err(DeckError::SceneOrderGap {
                slide: slide.id.clone(),
                count: orders.len(),
                found: orders,
            });
        }

        let mut seen = HashSet::new();
        for scene in &slide.scenes {
            if !seen.insert(scene.id.as_str()) {
                return Err(DeckError::DuplicateScene {
                    slide: slide.id.clone(),
                    scene: scene.id.clone(),
                });
            }
        }

        for (index, word) in slide.words.iter().enumerate() {
            let previous_end = if index == 0 {
                0.0
            } else {
                slide.words[index - 1].end
            };
            if word.start < previous_end || word.end < word.start {
                return Err(DeckError::WordOrder {
                    slide: slide.id.clone(),
                    index,
                    word: word.word.clone(),
                });
            }
        }

        for element in &slide.elements {
            if let Some(parent) = element.parent {
                if parent >= slide.elements.len() {
                    return Err(DeckError::ElementParent {
                        slide: slide.id.clone(),
                        element: element.id.clone(),
                        parent,
                    });
                }
            }
        }

        let element_ids: HashSet<&str> = slide.elements.iter().map(|e| e.id.as_str()).collect();
        for scene in &slide.scenes {
            for id in &scene.layer.animated_widget_ids {
                if !element_ids.contains(id.as_str()) {
                    tracing::warn!(
                        slide = %slide.id,
                        scene = %scene.id,
                        widget = %id,
                        "Animated widget has no matching element"
                    );
                }
            }
        }
    }
    Ok(())
}

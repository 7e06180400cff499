use std::sync::LazyLock;

use regex::Regex;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("punctuation pattern is valid"));

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "for", "nor", "yet", "so", "of", "to", "in", "on",
    "at", "by", "as", "is", "it", "be", "we", "you", "our", "are", "was", "not", "all", "any",
    "can", "has", "had", "how", "its", "may", "new", "now", "see", "who", "did", "get", "let",
    "use", "with", "this", "that", "from", "they", "have", "were", "been", "will", "your",
    "what", "when", "where", "which", "their", "there", "them", "then", "than", "these",
    "those", "into", "also", "just", "about", "over", "such", "only", "very", "more", "most",
    "some", "each", "other", "here", "would", "could", "should",
];

/// Tokens of this length or shorter are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMode {
    /// Speech alignment: drops tokens of three characters or fewer.
    Sync,
    /// Icon matching: drops tokens of two characters or fewer.
    Icon,
}

impl KeywordMode {
    fn max_dropped_len(self) -> usize {
        match self {
            Self::Sync => 3,
            Self::Icon => 2,
        }
    }
}

/// Lowercased keywords of `text`, in order of first appearance.
pub fn extract_keywords(text: &str, mode: KeywordMode) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCTUATION.replace_all(&lowered, "");
    let mut keywords: Vec<String> = Vec::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() <= mode.max_dropped_len() || STOP_WORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Pick the first icon whose name relates to a keyword of `text`.
pub fn suggest_icon<'a, S: AsRef<str>>(text: &str, icons: &'a [S]) -> Option<&'a str> {
    let keywords = extract_keywords(text, KeywordMode::Icon);
    icons.iter().map(AsRef::as_ref).find(|icon| {
        let name = icon.to_lowercase();
        keywords
            .iter()
            .any(|k| name.contains(k.as_str()) || k.contains(name.as_str()))
    })
}

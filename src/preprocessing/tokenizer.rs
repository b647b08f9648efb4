use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

/// Words of two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern compiles"));

/// Common English function words excluded from the vocabulary.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "must", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "within", "would", "you", "your",
    "yours", "yourself", "yourselves",
];

/// Splits lowercased text into vocabulary candidates.
///
/// The same tokenizer must be used to fit a model and to project queries
/// into it, so it is stored with the fitted model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Tokenizer {
    pub fn english() -> Self {
        Self::with_stop_words(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect())
    }

    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        Self { stop_words }
    }

    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        load_stop_words(path).map(Self::with_stop_words)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Lowercases `text` and returns its non-stopword tokens in order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }
}

/// Reads one stopword per line, ignoring blank lines.
pub fn load_stop_words(path: impl AsRef<Path>) -> io::Result<HashSet<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Maps every distinct term of `texts` to a column index, in sorted term order.
pub fn build_vocabulary<S: AsRef<str>>(texts: &[S], tokenizer: &Tokenizer) -> HashMap<String, usize> {
    let mut terms = HashSet::new();
    for text in texts {
        terms.extend(tokenizer.tokenize(text.as_ref()));
    }

    let mut term_list: Vec<String> = terms.into_iter().collect();
    term_list.sort();
    term_list
        .into_iter()
        .enumerate()
        .map(|(i, term)| (term, i))
        .collect()
}

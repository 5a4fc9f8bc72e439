//! ## Review text normalization
//!
//! [`ReviewPreprocessor`] turns a raw review into the tokens that get embedded:
//!
//! 1. lowercase the text,
//! 2. delete ASCII punctuation (`"full-bodied"` becomes `"fullbodied"`, `"wine's"` becomes `"wines"`),
//! 3. split on whitespace,
//! 4. drop stopwords.
//!
//! Every step can be switched off. Stopwords go through the same enabled steps 1 and 2 as the
//! text, so the list entry `"don't"` matches the token `"dont"`, or `"don't"` when punctuation
//! is kept.

use crate::text::stopwords::ENGLISH_STOPWORDS;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ReviewPreprocessor {
    lowercase: bool,
    strip_punctuation: bool,
    remove_stopwords: bool,
    raw_stopwords: Vec<String>,
    /// `raw_stopwords` after [`ReviewPreprocessor::clean`].
    stopwords: HashSet<String>,
}

impl Default for ReviewPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewPreprocessor {
    /// A preprocessor with every step enabled and the English stopword list.
    pub fn new() -> Self {
        let mut preprocessor = Self {
            lowercase: true,
            strip_punctuation: true,
            remove_stopwords: true,
            raw_stopwords: Vec::new(),
            stopwords: HashSet::new(),
        };
        preprocessor.set_stopwords(ENGLISH_STOPWORDS.iter().copied());
        preprocessor
    }

    /// Replaces the stopword list.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_stopwords(words);
        self
    }

    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self.rebuild_stopwords();
        self
    }

    pub fn with_strip_punctuation(mut self, enabled: bool) -> Self {
        self.strip_punctuation = enabled;
        self.rebuild_stopwords();
        self
    }

    pub fn with_remove_stopwords(mut self, enabled: bool) -> Self {
        self.remove_stopwords = enabled;
        self
    }

    fn set_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.raw_stopwords = words.into_iter().map(|w| w.as_ref().to_string()).collect();
        self.rebuild_stopwords();
    }

    fn rebuild_stopwords(&mut self) {
        let stopwords: HashSet<String> = self
            .raw_stopwords
            .iter()
            .map(|w| self.clean(w))
            .filter(|w| !w.is_empty())
            .collect();
        self.stopwords = stopwords;
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    pub fn strip_punctuation(&self) -> bool {
        self.strip_punctuation
    }

    pub fn remove_stopwords(&self) -> bool {
        self.remove_stopwords
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// True if `token` (already normalized) is a stopword.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Applies lowercasing and punctuation stripping to the whole text.
    fn clean(&self, text: &str) -> String {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.strip_punctuation {
            strip_ascii_punctuation(&text)
        } else {
            text
        }
    }

    /// Splits a review into normalized tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .filter(|token| !(self.remove_stopwords && self.is_stopword(token)))
            .map(str::to_string)
            .collect()
    }

    /// Normalizes a review into its tokens joined by single spaces.
    pub fn normalize(&self, text: &str) -> String {
        self.tokenize(text).join(" ")
    }
}

fn strip_ascii_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

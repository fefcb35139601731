//! Search-term normalization and tokenization.
//!
//! Terms and site search text go through the same folding (lowercase, NFD,
//! combining marks removed) so "bogota" matches "Bogotá".

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for diacritic-insensitive substring matching.
pub fn fold_search_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Normalize a single user-entered term; `None` when nothing is left.
pub fn normalize_term(term: &str) -> Option<String> {
    let folded = fold_search_text(term.trim());
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The active search terms, in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerms {
    terms: Vec<String>,
}

impl SearchTerms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one term. Returns `true` if it was new.
    pub fn add(&mut self, raw: &str) -> bool {
        match normalize_term(raw) {
            Some(term) if !self.terms.contains(&term) => {
                self.terms.push(term);
                true
            }
            _ => false,
        }
    }

    /// Consume typed input: every comma-terminated token becomes a term.
    ///
    /// Returns the trailing text after the last comma, which stays in the
    /// input box until the user types another comma or submits.
    pub fn add_input<'a>(&mut self, input: &'a str) -> &'a str {
        match input.rfind(',') {
            Some(last_comma) => {
                for token in input[..last_comma].split(',') {
                    self.add(token);
                }
                &input[last_comma + 1..]
            }
            None => input,
        }
    }

    /// Explicit submission: every comma-separated token becomes a term.
    ///
    /// Returns the number of terms added.
    pub fn submit(&mut self, input: &str) -> usize {
        input.split(',').filter(|token| self.add(token)).count()
    }

    /// Remove a term (matched after normalization). Returns `true` if removed.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Some(term) = normalize_term(raw) else {
            return false;
        };
        let before = self.terms.len();
        self.terms.retain(|t| t != &term);
        self.terms.len() != before
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_diacritics() {
        assert_eq!(fold_search_text("Bogotá"), "bogota");
        assert_eq!(fold_search_text("Zürich ÉCOLE"), "zurich ecole");
        assert_eq!(fold_search_text("São Tomé"), "sao tome");
    }

    #[test]
    fn test_normalize_term_rejects_blank() {
        assert_eq!(normalize_term("   "), None);
        assert_eq!(normalize_term(" Wall "), Some("wall".to_string()));
    }

    #[test]
    fn test_add_input_tokenizes_on_commas() {
        let mut terms = SearchTerms::new();
        let rest = terms.add_input("China, Great Wall,bei");

        assert_eq!(terms.as_slice(), &["china", "great wall"]);
        assert_eq!(rest, "bei");
    }

    #[test]
    fn test_duplicates_are_not_added_twice() {
        let mut terms = SearchTerms::new();
        assert!(terms.add("Bogotá"));
        assert!(!terms.add("bogota"));
        assert_eq!(terms.submit("BOGOTA, , colombia"), 1);
        assert_eq!(terms.as_slice(), &["bogota", "colombia"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut terms = SearchTerms::new();
        terms.submit("china,wall");
        assert!(terms.remove("China"));
        assert!(!terms.remove("china"));
        assert_eq!(terms.len(), 1);
        terms.clear();
        assert!(terms.is_empty());
    }
}

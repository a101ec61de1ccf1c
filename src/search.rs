//! Query matching over the entity index.
//!
//! Plain lowercase substring containment: no fuzzy matching, no
//! tokenization. An empty query shows the whole index without highlights;
//! a non-empty query shows every entity whose search key contains the
//! lowercased query, together with the byte span of the match in the
//! case-preserved display text (for bold-substring rendering).

use crate::index::Index;

/// One visible entity of a filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position of the entity in the index.
    pub entity: usize,
    /// Byte range of the matched substring in the entity's `display_text`;
    /// `None` for the empty query (plain label rendering).
    pub highlight: Option<(usize, usize)>,
}

/// The visible subset of an index for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    pub query: String,
    pub matches: Vec<Match>,
}

/// Incremental filter state. Recomputes on every keystroke but
/// short-circuits when the (lowercased) query did not change.
#[derive(Debug, Default)]
pub struct Matcher {
    prev: Option<String>,
    view: FilteredView,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `index` with `query`, reusing the previous result when the
    /// query is unchanged.
    pub fn filter(&mut self, index: &Index, query: &str) -> &FilteredView {
        let lower = query.to_lowercase();
        if self.prev.as_deref() == Some(lower.as_str()) {
            return &self.view;
        }

        let mut matches = Vec::new();
        for (i, entity) in index.iter().enumerate() {
            if lower.is_empty() {
                matches.push(Match {
                    entity: i,
                    highlight: None,
                });
            } else if entity.search_key.contains(lower.as_str()) {
                matches.push(Match {
                    entity: i,
                    highlight: fold_find(&entity.display_text, &lower),
                });
            }
        }

        self.view = FilteredView {
            query: lower.clone(),
            matches,
        };
        self.prev = Some(lower);
        &self.view
    }

    /// Forget the previous query so the next [`Matcher::filter`] call
    /// recomputes. Used when the index is rebuilt under the matcher.
    pub fn reset(&mut self) {
        self.prev = None;
        self.view = FilteredView::default();
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }
}

/// Case-insensitive substring search returning the byte range of the first
/// match in the original (case-preserved) `haystack`.
///
/// The needle must already be lowercase. A haystack character that
/// case-folds to several characters is consumed whole, so the returned
/// range always ends on a character boundary of the original text.
pub fn fold_find(haystack: &str, needle_lower: &str) -> Option<(usize, usize)> {
    if needle_lower.is_empty() {
        return Some((0, 0));
    }
    let needle: Vec<char> = needle_lower.chars().collect();
    'starts: for (start, _) in haystack.char_indices() {
        let mut matched = 0;
        for (offset, hc) in haystack[start..].char_indices() {
            for fc in hc.to_lowercase() {
                if matched < needle.len() {
                    if fc != needle[matched] {
                        continue 'starts;
                    }
                    matched += 1;
                }
            }
            if matched == needle.len() {
                return Some((start, start + offset + hc.len_utf8()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Category, RawEntity};
    use crate::index::IndexBuilder;

    fn sample_index() -> Index {
        let mut b = IndexBuilder::new();
        for (cat, text, id) in [
            (Category::Control, "if then", "a"),
            (Category::Control, "if then else", "b"),
            (Category::Operator, "Shift left", "c"),
            (Category::Motion, "move steps", "d"),
        ] {
            b.add(RawEntity {
                category: cat,
                display_text: text.to_string(),
                occurrence_id: id.to_string(),
                sort_hint: 0.0,
                auxiliary: None,
            });
        }
        b.finish()
    }

    #[test]
    fn test_empty_query_shows_everything_unhighlighted() {
        let index = sample_index();
        let mut m = Matcher::new();
        let view = m.filter(&index, "");
        assert_eq!(view.matches.len(), index.len());
        assert!(view.matches.iter().all(|mt| mt.highlight.is_none()));
    }

    #[test]
    fn test_substring_filter_and_spans() {
        let index = sample_index();
        let mut m = Matcher::new();
        let view = m.filter(&index, "if");
        let found: Vec<(&str, Option<(usize, usize)>)> = view
            .matches
            .iter()
            .map(|mt| {
                (
                    index.entities[mt.entity].display_text.as_str(),
                    mt.highlight,
                )
            })
            .collect();
        assert_eq!(
            found,
            vec![
                ("if then", Some((0, 2))),
                ("if then else", Some((0, 2))),
                ("Shift left", Some((2, 4))),
            ]
        );
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let index = sample_index();
        let mut m = Matcher::new();
        let view = m.filter(&index, "SHIFT");
        assert_eq!(view.matches.len(), 1);
        assert_eq!(view.matches[0].highlight, Some((0, 5)));
    }

    #[test]
    fn test_short_circuit_on_same_query() {
        let index = sample_index();
        let mut m = Matcher::new();
        let first = m.filter(&index, "If").clone();
        // Different capitalization lowercases to the same query.
        let second = m.filter(&index, "iF").clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fold_find_multibyte() {
        assert_eq!(fold_find("Größe", "öß"), Some((2, 6)));
        assert_eq!(fold_find("abc", "d"), None);
        assert_eq!(fold_find("abc", ""), Some((0, 0)));
    }
}

//! Mapping clicked host-page text onto server sections.
//!
//! Host pages are arbitrary third-party markup, so both sides are condensed
//! (all whitespace removed, canonical composition applied) before they are
//! compared. An exact condensed match always beats a containment match.

use crate::sections::Section;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip every whitespace run and compose the remainder.
pub fn condense(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, "").nfc().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Containment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMatch {
    pub index: usize,
    pub kind: MatchKind,
}

/// Condensed section texts, computed once per fetched feed.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    condensed: Vec<String>,
}

impl MatchEngine {
    pub fn new(sections: &[Section]) -> Self {
        Self {
            condensed: sections.iter().map(|section| condense(&section.text)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.condensed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.condensed.is_empty()
    }

    /// Sections whose text condenses to nothing are only reachable through
    /// an exact match, which a blank click never produces.
    pub fn find(&self, clicked_text: &str) -> Option<SectionMatch> {
        let clicked = condense(clicked_text);
        if clicked.is_empty() {
            return None;
        }

        if let Some(index) = self.condensed.iter().position(|text| *text == clicked) {
            return Some(SectionMatch {
                index,
                kind: MatchKind::Exact,
            });
        }

        self.condensed
            .iter()
            .position(|text| {
                !text.is_empty() && (text.contains(clicked.as_str()) || clicked.contains(text.as_str()))
            })
            .map(|index| SectionMatch {
                index,
                kind: MatchKind::Containment,
            })
    }
}

/// One-shot lookup without a prepared engine.
pub fn find_section(sections: &[Section], clicked_text: &str) -> Option<SectionMatch> {
    MatchEngine::new(sections).find(clicked_text)
}

/// Locate host nodes showing `target`.
///
/// `texts` holds the text content of candidate nodes in document order and
/// `contains(a, b)` reports whether node `a` is an ancestor of node `b`.
/// Exact condensed matches are preferred; only the innermost of nested
/// matches are kept, so a wrapper `<div>` around a matching `<p>` does not
/// count as a repeat. Without an exact match, the innermost node containing
/// the target is returned alone.
pub fn locate_host_targets<F>(texts: &[String], target: &str, contains: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let target = condense(target);
    if target.is_empty() {
        return Vec::new();
    }

    let condensed: Vec<String> = texts.iter().map(|text| condense(text)).collect();

    let exact: Vec<usize> = condensed
        .iter()
        .enumerate()
        .filter(|(_, text)| **text == target)
        .map(|(idx, _)| idx)
        .collect();
    if !exact.is_empty() {
        return innermost(&exact, &contains);
    }

    let containing: Vec<usize> = condensed
        .iter()
        .enumerate()
        .filter(|(_, text)| text.contains(target.as_str()))
        .map(|(idx, _)| idx)
        .collect();
    innermost(&containing, &contains).into_iter().take(1).collect()
}

fn innermost<F>(nodes: &[usize], contains: &F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    nodes
        .iter()
        .copied()
        .filter(|&outer| {
            !nodes
                .iter()
                .any(|&inner| inner != outer && contains(outer, inner))
        })
        .collect()
}

/// Position among repeated host targets, wrapping at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatCursor {
    count: usize,
    position: usize,
}

impl RepeatCursor {
    /// Only meaningful for more than one target.
    pub fn new(count: usize, position: usize) -> Option<Self> {
        if count < 2 {
            return None;
        }
        Some(Self {
            count,
            position: position.min(count - 1),
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next(&mut self) -> usize {
        self.position = (self.position + 1) % self.count;
        self.position
    }

    pub fn prev(&mut self) -> usize {
        self.position = match self.position {
            0 => self.count - 1,
            current => current - 1,
        };
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(texts: &[&str]) -> Vec<Section> {
        texts
            .iter()
            .map(|text| Section {
                text: text.to_string(),
                ..Section::default()
            })
            .collect()
    }

    #[test]
    fn condensing_ignores_any_whitespace_layout() {
        let original = "Welcome to our\tsite,\n friend.";
        let variants = [
            "Welcome to our site, friend.",
            "Welcometoour site,friend.",
            "  Welcome   to\u{00A0}our\r\nsite, friend.  ",
            "W e l c o m e to our site, friend.",
        ];
        for variant in variants {
            assert_eq!(condense(original), condense(variant), "variant {variant:?}");
        }
        assert_eq!(condense("a b"), "ab");
    }

    #[test]
    fn condensing_composes_decomposed_accents() {
        assert_eq!(condense("Cafe\u{0301} menu"), condense("Café menu"));
    }

    #[test]
    fn clicked_paragraph_matches_its_section_exactly() {
        let feed = sections(&["Welcome to our site", "Contact us"]);
        let found = find_section(&feed, "Welcome to our site").expect("match");
        assert_eq!(found.index, 0);
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn irregular_whitespace_still_matches() {
        let feed = sections(&["Welcome to our site", "Contact us"]);
        let found = find_section(&feed, "  Welcome   to our site  ").expect("match");
        assert_eq!(found.index, 0);
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn exact_match_beats_earlier_containment_candidate() {
        let feed = sections(&["Contact us today for a quote", "Contact us"]);
        let found = find_section(&feed, "Contact us").expect("match");
        assert_eq!(found.index, 1);
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn containment_works_in_both_directions() {
        let feed = sections(&["Opening hours", "Call us at 555-0100"]);

        let parent = find_section(&feed, "Header Opening hours Mon-Fri").expect("parent");
        assert_eq!(parent.index, 0);
        assert_eq!(parent.kind, MatchKind::Containment);

        let child = find_section(&feed, "555-0100").expect("child");
        assert_eq!(child.index, 1);
        assert_eq!(child.kind, MatchKind::Containment);
    }

    #[test]
    fn blank_or_unknown_clicks_do_not_match() {
        let feed = sections(&["Welcome", ""]);
        assert_eq!(find_section(&feed, "   \n "), None);
        assert_eq!(find_section(&feed, "Goodbye"), None);
        assert_eq!(find_section(&[], "Welcome"), None);
    }

    #[test]
    fn sections_without_text_never_match_by_containment() {
        let feed = sections(&["", " \n ", "Contact us"]);
        let found = find_section(&feed, "Contact us today").expect("match");
        assert_eq!(found.index, 2);
        assert_eq!(found.kind, MatchKind::Containment);
        assert_eq!(find_section(&sections(&["", "Welcome"]), "Goodbye"), None);
    }

    #[test]
    fn host_targets_keep_innermost_exact_repeats() {
        // 0: <div> wraps 1: <p>; 2: <p> repeats the text elsewhere; 3: unrelated.
        let texts: Vec<String> = ["Read more", "Read more", " Read\nmore ", "Footer"]
            .iter()
            .map(|text| text.to_string())
            .collect();
        let contains = |outer: usize, inner: usize| outer == 0 && inner == 1;

        let found = locate_host_targets(&texts, "Read more", contains);
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn host_targets_fall_back_to_innermost_container() {
        // 0: <body> contains 1: <section> contains 2: <p>.
        let texts: Vec<String> = [
            "Intro Opening hours: 9-5 Footer",
            "Opening hours: 9-5 Footer",
            "Opening hours: 9-5",
        ]
        .iter()
        .map(|text| text.to_string())
        .collect();
        let contains = |outer: usize, inner: usize| outer < inner;

        let found = locate_host_targets(&texts, "Opening hours", contains);
        assert_eq!(found, vec![2]);
        assert!(locate_host_targets(&texts, "Closed", contains).is_empty());
    }

    #[test]
    fn repeat_cursor_wraps_in_both_directions() {
        assert_eq!(RepeatCursor::new(1, 0), None);

        let mut cursor = RepeatCursor::new(3, 0).expect("cursor");
        assert_eq!(cursor.prev(), 2);
        assert_eq!(cursor.next(), 0);
        assert_eq!(cursor.next(), 1);
        assert_eq!(cursor.next(), 2);
        assert_eq!(cursor.next(), 0);
        assert_eq!(RepeatCursor::new(2, 9).map(|c| c.position()), Some(1));
    }
}

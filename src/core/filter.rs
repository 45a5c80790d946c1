//! Candidate filtering for the builtin picker.
//!
//! Matching is plain substring (optionally case-sensitive).  Results keep the
//! candidates' original order: no ranking, no deduplication.

use std::ops::Range;

/// Indices of every candidate containing `query`, in candidate order.
/// An empty (or all-whitespace) query matches everything.
pub fn filter_candidates(candidates: &[String], query: &str, case_sensitive: bool) -> Vec<usize> {
    let q = query.trim();
    if q.is_empty() {
        return (0..candidates.len()).collect();
    }
    let q_lower = q.to_lowercase();

    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            if case_sensitive {
                candidate.contains(q)
            } else {
                candidate.to_lowercase().contains(&q_lower)
            }
        })
        .map(|(i, _)| i)
        .collect()
}

/// Byte range of the first match of `query` in `candidate`, for highlighting.
///
/// Returns `None` when lowercasing changes the candidate's byte length, since
/// offsets into the lowered text would not line up with the original.
pub fn match_range(candidate: &str, query: &str, case_sensitive: bool) -> Option<Range<usize>> {
    let q = query.trim();
    if q.is_empty() {
        return None;
    }
    let start = if case_sensitive {
        candidate.find(q)?
    } else {
        let lowered = candidate.to_lowercase();
        if lowered.len() != candidate.len() {
            return None;
        }
        lowered.find(&q.to_lowercase())?
    };
    let end = start + q.len();
    (candidate.is_char_boundary(start) && candidate.is_char_boundary(end)).then_some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let c = lines(&["b", "a", "b"]);
        assert_eq!(filter_candidates(&c, "  ", false), vec![0, 1, 2]);
    }

    #[test]
    fn substring_match_preserves_order() {
        let c = lines(&["Terminal", "Firefox", "term notes", "Files"]);
        assert_eq!(filter_candidates(&c, "term", false), vec![0, 2]);
        assert_eq!(filter_candidates(&c, "term", true), vec![2]);
        assert_eq!(filter_candidates(&c, "fi", false), vec![1, 3]);
    }

    #[test]
    fn no_fuzzy_matching() {
        let c = lines(&["Firefox"]);
        assert!(filter_candidates(&c, "ffx", false).is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let c = lines(&["X", "X"]);
        assert_eq!(filter_candidates(&c, "x", false), vec![0, 1]);
    }

    #[test]
    fn highlight_range() {
        assert_eq!(match_range("Firefox", "fox", false), Some(4..7));
        assert_eq!(match_range("Firefox", "FOX", true), None);
        assert_eq!(match_range("Firefox", "", false), None);
    }
}

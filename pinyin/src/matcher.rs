//! Strictness-level matching of a typed query against romanized text.
//!
//! Three strategies, selected by `StrictnessLevel`:
//! - Low: every query character occurs somewhere in the text.
//! - Medium: the query is a contiguous substring.
//! - High: a substring occurrence starts or ends on a likely syllable boundary.
//!
//! The boundary test is a letter-class heuristic, not a segmentation against
//! the syllable inventory. It over- and under-matches real pinyin boundaries
//! (e.g. the `n` in "xian" is treated as a possible final even when it starts
//! the next syllable).
use ahash::AHashSet;
use examkey_core::{MatchStrategy, StrictnessLevel};

/// Letters a pinyin syllable commonly ends with.
const SYLLABLE_FINALS: &[char] = &['a', 'o', 'e', 'i', 'u', 'n', 'g'];

/// Letters a pinyin syllable commonly starts with.
const SYLLABLE_INITIALS: &[char] = &[
    'b', 'p', 'm', 'f', 'd', 't', 'n', 'l', 'g', 'k', 'h', 'j', 'q', 'x', 'r', 'z', 'c', 's', 'y',
    'w',
];

/// Whether `query` matches `corpus` (a romanized text) at `level`.
///
/// Queries shorter than `level.min_length()` chars never match.
pub fn matches(corpus: &str, query: &str, level: StrictnessLevel) -> bool {
    if query.chars().count() < level.min_length() {
        return false;
    }
    let corpus = corpus.to_lowercase();
    let query = query.to_lowercase();
    match level.strategy() {
        MatchStrategy::ContainsAllChars => contains_all_chars(&corpus, &query),
        MatchStrategy::Substring => contains_substring(&corpus, &query),
        MatchStrategy::SyllableBoundary => matches_on_boundary(&corpus, &query),
    }
}

/// Every distinct char of `query` occurs in `corpus`, in any order.
pub fn contains_all_chars(corpus: &str, query: &str) -> bool {
    let available: AHashSet<char> = corpus.chars().collect();
    query.chars().all(|c| available.contains(&c))
}

pub fn contains_substring(corpus: &str, query: &str) -> bool {
    corpus.contains(query)
}

/// Substring match where at least one occurrence sits on a syllable boundary.
pub fn matches_on_boundary(corpus: &str, query: &str) -> bool {
    if !contains_substring(corpus, query) {
        return false;
    }
    match_positions(corpus, query)
        .into_iter()
        .any(|pos| is_at_syllable_boundary(corpus, pos, query.len()))
}

/// Byte offsets of every occurrence of `query`, overlapping ones included.
///
/// After a hit at `i` the scan resumes one character later, not after the
/// match, so "aaa" in "aaaa" is found at 0 and 1. An empty query yields none.
pub fn match_positions(text: &str, query: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    if query.is_empty() {
        return positions;
    }
    let mut start = 0;
    while start + query.len() <= text.len() {
        let Some(found) = text[start..].find(query) else {
            break;
        };
        let pos = start + found;
        positions.push(pos);
        // step over one char
        let step = text[pos..].chars().next().map_or(1, char::len_utf8);
        start = pos + step;
    }
    positions
}

/// Whether the match `text[pos..pos + len]` starts or ends on a likely
/// syllable boundary.
///
/// `pos` and `len` are byte offsets of an occurrence reported by
/// `match_positions`, so both ends fall on char boundaries.
pub(crate) fn is_at_syllable_boundary(text: &str, pos: usize, len: usize) -> bool {
    let end = pos + len;
    let matched = &text[pos..end];
    let before = text[..pos].chars().next_back();
    let after = text[end..].chars().next();

    let starts = match (before, matched.chars().next()) {
        (None, _) => true,
        (Some(prev), first) => !prev.is_alphabetic() || first.is_some_and(|f| likely_break(prev, f)),
    };
    let ends = match (matched.chars().next_back(), after) {
        (_, None) => true,
        (last, Some(next)) => !next.is_alphabetic() || last.is_some_and(|l| likely_break(l, next)),
    };
    starts || ends
}

/// `left` can end a syllable and `right` can start the next one.
fn likely_break(left: char, right: char) -> bool {
    SYLLABLE_FINALS.contains(&left) && SYLLABLE_INITIALS.contains(&right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use StrictnessLevel::*;

    #[test]
    fn short_queries_never_match() {
        let corpus = "makesizhuyi";
        assert!(!matches(corpus, "m", Low));
        assert!(!matches(corpus, "mak", Medium));
        assert!(!matches(corpus, "makes", High));
        assert!(!matches(corpus, "", Low));
    }

    #[test]
    fn low_is_character_containment() {
        assert!(matches("makesizhuyi", "masi", Low));
        assert!(matches("makesizhuyi", "mayi", Low));
        assert!(matches("makesizhuyi", "isam", Low));
        assert!(!matches("makesizhuyi", "maxi", Low));
    }

    #[test]
    fn medium_is_substring() {
        assert!(matches("zhongguo", "zhong", Medium));
        assert!(!matches("zhongguo", "zgo", Medium));
        assert!(matches("makesizhuyi", "kesi", Medium));
        assert!(!matches("makesizhuyi", "masi", Medium));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(matches("ZhongGuo", "zhongg", Medium));
        assert!(matches("zhongguo", "ZHONGG", High));
    }

    #[test]
    fn high_requires_boundary() {
        // starts at position 0
        assert!(matches("makesizhuyi", "makesi", High));
        // ends at the end of the text
        assert!(matches("makesizhuyi", "sizhuyi", High));
        // "kesizh": preceded by 'a' (final) then 'k' (initial)
        assert!(matches("makesizhuyi", "kesizh", High));
        // substring required first
        assert!(!matches("makesizhuyi", "zhuyima", High));
    }

    #[test]
    fn high_rejects_mid_syllable_occurrence() {
        // preceded by 'z' (not a final); the trailing 'u' is followed by 'o'
        // (not an initial)
        assert!(!matches("zhongguoren", "honggu", High));
    }

    #[test]
    fn high_accepts_non_letter_neighbours() {
        assert!(matches("xx zhongg!xx", "zhongg", High));
    }

    #[test]
    fn overlapping_positions() {
        assert_eq!(match_positions("aaaa", "aaa"), vec![0, 1]);
        assert_eq!(match_positions("abab", "ab"), vec![0, 2]);
        assert_eq!(match_positions("abc", ""), Vec::<usize>::new());
        assert_eq!(match_positions("ab", "abc"), Vec::<usize>::new());
    }

    #[test]
    fn overlapping_occurrence_can_satisfy_boundary() {
        // The occurrence at 1 starts after 'z' with a vowel and ends with 'h'
        // before another letter, so neither side is a boundary. The
        // overlapping occurrence at 3 ends at the end of the text; a scan that
        // skipped past the first match would never see it.
        let corpus = "zahahahah";
        assert_eq!(match_positions(corpus, "ahahah"), vec![1, 3]);
        assert!(!is_at_syllable_boundary(corpus, 1, 6));
        assert!(is_at_syllable_boundary(corpus, 3, 6));
        assert!(matches(corpus, "ahahah", High));
    }

    #[test]
    fn non_ascii_corpus_is_handled() {
        assert!(matches("zhong国guo", "zhong国", Medium));
        assert!(matches("C++yuyan", "c++yu", Low));
        assert_eq!(match_positions("国国国", "国国"), vec![0, 3]);
    }

    #[test]
    fn high_implies_medium() {
        let corpora = ["makesizhuyi", "zhongguoren", "zhahahaha", "lilunshijian"];
        let queries = ["makesi", "honggu", "hahaha", "lunshi", "ilunsh", "zhuyi"];
        for c in corpora {
            for q in queries {
                if matches(c, q, High) {
                    assert!(c.contains(q), "{} in {}", q, c);
                }
            }
        }
    }
}

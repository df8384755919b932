//! Keyword Expander (component C): pure function from a keyword list to
//! an expanded, case-insensitive keyword set.

use std::collections::HashSet;

use super::dictionary::KeywordDictionary;

/// Expand `keywords` with synonyms and bidirectional abbreviations from
/// `dict`. Preserves the original tokens. Idempotent: expanding an
/// already-expanded set returns the same set.
pub fn expand_keywords(keywords: &[String], dict: &KeywordDictionary) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    let mut push = |term: &str, seen: &mut HashSet<String>, out: &mut Vec<String>| {
        let key = term.to_lowercase();
        if seen.insert(key) {
            out.push(term.to_string());
        }
    };

    for k in keywords {
        push(k, &mut seen, &mut out);
        for syn in dict.synonyms_of(k) {
            push(&syn, &mut seen, &mut out);
        }
        if let Some(abbr) = dict.abbreviation_of(k) {
            push(&abbr, &mut seen, &mut out);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_synonyms_and_abbreviations() {
        let dict = KeywordDictionary::builtin();
        let expanded = expand_keywords(&["robot".to_string(), "rl".to_string()], &dict);
        assert!(expanded.iter().any(|k| k == "robotics"));
        assert!(expanded.iter().any(|k| k == "reinforcement learning"));
    }

    #[test]
    fn expansion_is_idempotent() {
        let dict = KeywordDictionary::builtin();
        let once = expand_keywords(&["robot".to_string()], &dict);
        let twice = expand_keywords(&once, &dict);
        let mut a: Vec<String> = once.iter().map(|s| s.to_lowercase()).collect();
        let mut b: Vec<String> = twice.iter().map(|s| s.to_lowercase()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn preserves_original_tokens() {
        let dict = KeywordDictionary::builtin();
        let expanded = expand_keywords(&["quantum computing".to_string()], &dict);
        assert!(expanded.contains(&"quantum computing".to_string()));
    }
}

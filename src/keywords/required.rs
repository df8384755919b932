//! Required-Keyword Gate (component D): an AND-of-OR predicate a paper
//! must satisfy before it is scored.

use super::dictionary::KeywordDictionary;
use super::fuzzy::{best_token_ratio, ratio};
use crate::models::RequiredKeywords;

const MIN_TOKEN_LEN: usize = 3;

/// Check `required` against a paper's search text. Returns whether every
/// clause matched (AND across clauses, OR within a clause) and the union
/// of every keyword that matched.
pub fn check_required(text: &str, required: &RequiredKeywords, dict: &KeywordDictionary) -> (bool, Vec<String>) {
    let mut matched = Vec::new();
    let mut all_pass = true;

    for clause in &required.clauses {
        let keywords: Vec<&str> = clause.split(" OR ").map(|s| s.trim()).collect();
        let mut clause_pass = false;

        for k in &keywords {
            if single_match(k, text, required, dict) {
                clause_pass = true;
                matched.push((*k).to_string());
            }
        }

        if !clause_pass {
            all_pass = false;
        }
    }

    (all_pass, matched)
}

fn single_match(keyword: &str, text: &str, required: &RequiredKeywords, dict: &KeywordDictionary) -> bool {
    let keyword_lower = keyword.to_lowercase();

    // 1. substring
    if text.contains(&keyword_lower) {
        return true;
    }

    if !required.fuzzy_match {
        return false;
    }

    // 2. morphological variants + synonyms, substring check
    for variant in morphological_variants(&keyword_lower) {
        if text.contains(&variant) {
            return true;
        }
    }
    for syn in dict.synonyms_of(&keyword_lower) {
        if text.contains(&syn.to_lowercase()) {
            return true;
        }
    }

    // 3. fuzzy token / sliding-window comparison
    let word_count = keyword_lower.split_whitespace().count().max(1);
    let filtered_text: String = text
        .split_whitespace()
        .filter(|w| w.len() >= MIN_TOKEN_LEN)
        .collect::<Vec<_>>()
        .join(" ");
    let best = best_token_ratio(&keyword_lower, &filtered_text, word_count);
    best >= required.similarity_threshold
}

/// Plural `+s`/`y->ies`, adjectival `+ic`, and separator swaps.
fn morphological_variants(keyword: &str) -> Vec<String> {
    let mut variants = Vec::new();

    if let Some(stem) = keyword.strip_suffix('y') {
        variants.push(format!("{stem}ies"));
    } else {
        variants.push(format!("{keyword}s"));
    }
    variants.push(format!("{keyword}ic"));

    for (from, to) in [(" ", "-"), (" ", "_"), (" ", ""), ("-", " "), ("-", "_"), ("-", "")] {
        if keyword.contains(from) {
            variants.push(keyword.replace(from, to));
        }
    }

    variants
}

pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    ratio(a, b)
}

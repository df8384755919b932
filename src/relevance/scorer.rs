//! Relevance Scorer (component E, base mode).

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

use crate::keywords::fuzzy::{best_token_ratio, ratio};
use crate::keywords::{expand_keywords, KeywordDictionary};
use crate::models::{KeywordSpec, Paper, TierWeight};

const EXCLUDE_SIMILARITY_THRESHOLD: f64 = 0.9;
const INTEREST_SIMILARITY_THRESHOLD: f64 = 0.8;
const EXCLUDED_SENTINEL: f64 = -999.0;

const WILDCARDS: &[&str] = &["*", "all", ".*", "全部", "所有"];

lazy_static! {
    static ref DOMAIN_WEIGHTS: Vec<(&'static str, f64)> = vec![
        ("cs.AI", 1.5),
        ("cs.LG", 1.4),
        ("cs.RO", 1.3),
        ("cs.CV", 1.2),
        ("cs.CL", 1.2),
    ];
}

/// Result of scoring one paper against one profile's keyword spec.
#[derive(Debug, Clone)]
pub struct RelevanceResult {
    pub score: f64,
    pub excluded: bool,
    pub matched_interest: Vec<String>,
    pub matched_exclude: Vec<String>,
}

impl RelevanceResult {
    fn excluded_with(matched_exclude: Vec<String>) -> Self {
        Self { score: EXCLUDED_SENTINEL, excluded: true, matched_interest: Vec::new(), matched_exclude }
    }
}

/// Score `paper` against `spec`. Exclusion is tested first; a wildcard
/// interest short-circuits to a flat score.
pub fn score_paper(paper: &Paper, spec: &KeywordSpec, dict: &KeywordDictionary) -> RelevanceResult {
    let text = paper.search_text();

    if let Some(matched) = check_exclusion(&text, &spec.exclude, dict) {
        return RelevanceResult::excluded_with(matched);
    }

    let interest = spec.interest();

    if interest.iter().any(|k| WILDCARDS.contains(&k.to_lowercase().as_str()) || k.trim().is_empty()) {
        return RelevanceResult {
            score: 1.0,
            excluded: false,
            matched_interest: vec!["*".to_string()],
            matched_exclude: Vec::new(),
        };
    }

    let time_decay = time_decay(paper);
    let domain_weight = domain_weight(&paper.categories);
    let expanded_interest = expand_keywords(&interest, dict);
    let cooccurrence = cooccurrence(&expanded_interest, &text);

    let mut score = 0.0;
    let mut matched_interest = Vec::new();

    for (i, keyword) in interest.iter().enumerate() {
        let base_weight = (interest.len() - i) as f64;
        let tier_weight = tier_weight_of(keyword, &spec.raw_interest, &spec.tier_markers);

        let contribution = keyword_contribution(keyword, &text, &paper.title, &paper.abstract_text, &paper.categories_joined(), dict);

        if contribution > 0.0 {
            matched_interest.push(keyword.clone());
            score += contribution * base_weight * tier_weight * time_decay * domain_weight * cooccurrence;
        }
    }

    RelevanceResult { score, excluded: false, matched_interest, matched_exclude: Vec::new() }
}

fn check_exclusion(text: &str, exclude: &[String], dict: &KeywordDictionary) -> Option<Vec<String>> {
    if exclude.is_empty() {
        return None;
    }
    let expanded = expand_keywords(exclude, dict);
    let mut matched = Vec::new();

    for term in &expanded {
        let lower = term.to_lowercase();
        if text.contains(&lower) {
            matched.push(term.clone());
        } else {
            let r = best_token_ratio(&lower, text, term.split_whitespace().count().max(1));
            if r >= EXCLUDE_SIMILARITY_THRESHOLD {
                matched.push(format!("{term}(fuzzy)"));
            }
        }
    }

    if matched.is_empty() {
        None
    } else {
        Some(matched)
    }
}

fn time_decay(paper: &Paper) -> f64 {
    let age_days = (Utc::now() - paper.published_at).num_days();
    if age_days <= 0 {
        1.0
    } else if age_days >= 30 {
        0.7
    } else {
        1.0 - (age_days as f64 / 30.0) * 0.3
    }
}

fn domain_weight(categories: &[String]) -> f64 {
    categories
        .iter()
        .filter_map(|c| DOMAIN_WEIGHTS.iter().find(|(name, _)| *name == c.as_str()).map(|(_, w)| *w))
        .fold(1.0, f64::max)
}

fn cooccurrence(expanded_interest: &[String], text: &str) -> f64 {
    let n = expanded_interest
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .count();
    if n >= 2 {
        1.0 + 0.2 * (n as f64 - 1.0)
    } else {
        1.0
    }
}

pub fn tier_weight_of(keyword: &str, raw_interest: &[String], markers: &[crate::models::TierMarker]) -> f64 {
    let mut current = TierWeight::Default;
    for line in raw_interest {
        let trimmed = line.trim();
        if let Some(m) = markers.iter().find(|m| trimmed.starts_with(m.marker.as_str())) {
            current = m.tier;
            continue;
        }
        if trimmed == keyword.trim() {
            return current.multiplier();
        }
    }
    TierWeight::Default.multiplier()
}

/// `(contribution, _)` per the §4.E cascade: regex prefix, substring,
/// fuzzy, then synonym-expanded positional/fuzzy/category scoring.
fn keyword_contribution(
    keyword: &str,
    text: &str,
    title: &str,
    abstract_text: &str,
    categories_joined: &str,
    dict: &KeywordDictionary,
) -> f64 {
    if let Some(body) = keyword.strip_prefix("regex:").or_else(|| keyword.strip_prefix("re:")) {
        if let Ok(re) = Regex::new(&format!("(?i){body}")) {
            if re.is_match(text) {
                return 1.0;
            }
        }
        // fall back to substring on regex compile error
    }

    let keyword_lower = keyword.to_lowercase();
    if text.contains(&keyword_lower) {
        return 1.0;
    }

    let fuzzy = best_token_ratio(&keyword_lower, text, keyword_lower.split_whitespace().count().max(1));
    if fuzzy >= INTEREST_SIMILARITY_THRESHOLD {
        return fuzzy;
    }

    let mut keyword_score = 0.0;
    for variant in expand_keywords(&[keyword.to_string()], dict) {
        let variant_lower = variant.to_lowercase();
        keyword_score += positional_title_score(&variant_lower, title);
        keyword_score += positional_abstract_score(&variant_lower, abstract_text);
        keyword_score += ratio(&variant_lower, title) * 2.0;
        keyword_score += ratio(&variant_lower, abstract_text) * 1.0;
        keyword_score += category_hit_score(&variant_lower, categories_joined);
    }

    keyword_score.max(0.0)
}

fn positional_title_score(variant: &str, title: &str) -> f64 {
    let title_lower = title.to_lowercase();
    let words: Vec<&str> = title_lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    if let Some(pos) = words.iter().position(|w| w.contains(variant)) {
        let ratio = pos as f64 / words.len() as f64;
        3.0 * (0.5f64).max(1.0 - ratio * 0.5)
    } else {
        0.0
    }
}

fn positional_abstract_score(variant: &str, abstract_text: &str) -> f64 {
    let lower = abstract_text.to_lowercase();
    if let Some(idx) = lower.find(variant) {
        let fraction = idx as f64 / lower.len().max(1) as f64;
        if fraction <= 0.3 {
            2.5
        } else {
            1.5
        }
    } else {
        0.0
    }
}

fn category_hit_score(variant: &str, categories_joined: &str) -> f64 {
    let pattern = format!(r"\b{}\b", regex::escape(variant));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(&categories_joined.to_lowercase()).count() as f64 * 1.5,
        Err(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_tier_markers, AuthorInfo};
    use chrono::Utc;

    fn paper(title: &str, abstract_text: &str, categories: &[&str]) -> Paper {
        Paper {
            paper_id: "1".to_string(),
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            authors: vec![AuthorInfo { name: "A".to_string(), affiliation: None }],
            categories: categories.iter().map(|s| s.to_string()).collect(),
            primary_category: categories.first().unwrap_or(&"").to_string(),
            published_at: Utc::now(),
            updated_at: Utc::now(),
            entry_url: String::new(),
            pdf_url: String::new(),
            comment: None,
            journal_ref: None,
            doi: None,
        }
    }

    fn spec(interest: Vec<&str>, exclude: Vec<&str>) -> KeywordSpec {
        KeywordSpec {
            raw_interest: interest.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            required: None,
            tier_markers: default_tier_markers(),
        }
    }

    #[test]
    fn wildcard_interest_short_circuits() {
        let p = paper("A Survey of Graph Networks", "", &["cs.AI"]);
        let spec = spec(vec!["*"], vec!["survey"]);
        let result = score_paper(&p, &spec, &KeywordDictionary::builtin());
        assert!(result.excluded);
        assert_eq!(result.score, EXCLUDED_SENTINEL);
        assert!(result.matched_exclude.contains(&"survey".to_string()));
    }

    #[test]
    fn exclude_fuzzy_match_flags_as_fuzzy() {
        let p = paper("Survey of Methods", "", &["cs.AI"]);
        let spec = spec(vec!["robotics"], vec!["surveys"]);
        let result = score_paper(&p, &spec, &KeywordDictionary::builtin());
        assert!(result.excluded);
        assert!(result.matched_exclude.iter().any(|m| m.contains("fuzzy")));
    }

    #[test]
    fn future_published_date_has_full_time_decay() {
        let mut p = paper("Robotics Paper", "about robotics", &["cs.RO"]);
        p.published_at = Utc::now() + chrono::Duration::days(5);
        assert_eq!(time_decay(&p), 1.0);
    }

    #[test]
    fn core_tier_outweighs_default_tier() {
        let markers = default_tier_markers();
        let raw = vec!["🎯 核心概念".to_string(), "robotics".to_string()];
        let core_weight = tier_weight_of("robotics", &raw, &markers);
        let raw_default = vec!["robotics".to_string()];
        let default_weight = tier_weight_of("robotics", &raw_default, &markers);
        assert!(core_weight > default_weight);
    }
}

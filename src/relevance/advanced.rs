//! Advanced Scorer (component F): orthogonal semantic/author/novelty/
//! citation-potential boosts layered on top of the base scorer.

use crate::keywords::KeywordDictionary;
use crate::models::{KeywordSpec, Paper, ScoreWeights};

use super::scorer::{score_paper, RelevanceResult};

const SEMANTIC_TERMS: &[&str] = &[
    "neural", "learning", "model", "algorithm", "method", "approach", "framework", "system",
    "network", "optimization", "training", "inference", "prediction", "classification", "regression",
];

const NOVELTY_TERMS: &[&str] = &[
    "novel", "new", "first", "introduce", "propose", "present", "innovative", "breakthrough",
    "pioneer", "original", "unprecedented", "state-of-the-art", "sota", "outperform", "improve",
    "enhance", "advance", "superior", "better than",
];

const CITATION_TERMS: &[&str] = &[
    "benchmark", "dataset", "survey", "review", "framework", "open source", "code available",
    "reproducible", "evaluation", "comparison", "analysis", "comprehensive", "extensive",
];

const HIGH_IMPACT_CATEGORIES: &[&str] = &["cs.AI", "cs.LG", "cs.CV", "cs.CL", "cs.RO"];

/// Per-component boosts contributing to the advanced score, for
/// diagnostics/display.
#[derive(Debug, Clone, Default)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub semantic: f64,
    pub author: f64,
    pub novelty: f64,
    pub citation: f64,
}

pub fn score_paper_advanced(
    paper: &Paper,
    spec: &KeywordSpec,
    dict: &KeywordDictionary,
    weights: &ScoreWeights,
) -> (RelevanceResult, ScoreBreakdown) {
    let base_result = score_paper(paper, spec, dict);
    if base_result.excluded {
        return (base_result, ScoreBreakdown::default());
    }

    let title_abstract = format!("{} {}", paper.title, paper.abstract_text).to_lowercase();

    let breakdown = ScoreBreakdown {
        base: base_result.score,
        semantic: semantic_boost(&title_abstract, &spec.interest(), paper),
        author: author_boost(paper.authors.len()),
        novelty: novelty_boost(&title_abstract, &paper.title.to_lowercase()),
        citation: citation_boost(&title_abstract, &paper.categories, paper.abstract_text.len()),
    };

    let total = breakdown.base * weights.base
        + breakdown.semantic * weights.semantic
        + breakdown.author * weights.author
        + breakdown.novelty * weights.novelty
        + breakdown.citation * weights.citation;

    let mut result = base_result;
    result.score = total;
    (result, breakdown)
}

fn semantic_boost(title_abstract: &str, interest: &[String], paper: &Paper) -> f64 {
    let term_count = SEMANTIC_TERMS.iter().filter(|t| title_abstract.contains(**t)).count();
    let base = (term_count as f64 * 0.1).min(1.0);

    let cooccur_count = paper
        .abstract_text
        .split('.')
        .filter(|sentence| {
            let s = sentence.to_lowercase();
            SEMANTIC_TERMS.iter().any(|t| s.contains(t))
                && interest.iter().any(|k| s.contains(&k.to_lowercase()))
        })
        .count();
    let cooccur = (cooccur_count as f64 * 0.05).min(0.5);

    base + cooccur
}

fn author_boost(author_count: usize) -> f64 {
    match author_count {
        0 => 0.0,
        1 => 0.1,
        2..=6 => 0.2,
        _ => 0.0,
    }
}

fn novelty_boost(title_abstract: &str, title_lower: &str) -> f64 {
    let body_hits = NOVELTY_TERMS.iter().filter(|t| title_abstract.contains(**t)).count();
    let title_hits = NOVELTY_TERMS.iter().filter(|t| title_lower.contains(**t)).count();
    ((body_hits as f64 * 0.1) + (title_hits as f64 * 0.2)).min(1.0)
}

fn citation_boost(title_abstract: &str, categories: &[String], abstract_len: usize) -> f64 {
    let hits = CITATION_TERMS.iter().filter(|t| title_abstract.contains(**t)).count() as f64 * 0.15;
    let category_bonus = if categories.iter().any(|c| HIGH_IMPACT_CATEGORIES.contains(&c.as_str())) {
        0.2
    } else {
        0.0
    };
    let length_bonus = (abstract_len as f64 / 1000.0).min(0.3);
    (hits + category_bonus + length_bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_tier_markers, AuthorInfo};
    use chrono::Utc;

    fn paper() -> Paper {
        Paper {
            paper_id: "1".to_string(),
            title: "A Novel Neural Network Approach".to_string(),
            abstract_text: "We propose a novel method using neural networks for classification. This is a comprehensive benchmark.".to_string(),
            authors: vec![AuthorInfo { name: "A".to_string(), affiliation: None }, AuthorInfo { name: "B".to_string(), affiliation: None }],
            categories: vec!["cs.AI".to_string()],
            primary_category: "cs.AI".to_string(),
            published_at: Utc::now(),
            updated_at: Utc::now(),
            entry_url: String::new(),
            pdf_url: String::new(),
            comment: None,
            journal_ref: None,
            doi: None,
        }
    }

    fn spec() -> KeywordSpec {
        KeywordSpec {
            raw_interest: vec!["neural network".to_string()],
            exclude: vec![],
            required: None,
            tier_markers: default_tier_markers(),
        }
    }

    #[test]
    fn advanced_score_adds_boosts_over_base() {
        let dict = KeywordDictionary::builtin();
        let weights = ScoreWeights::default();
        let (base, _) = (score_paper(&paper(), &spec(), &dict), ());
        let (advanced, breakdown) = score_paper_advanced(&paper(), &spec(), &dict, &weights);
        assert!(breakdown.semantic > 0.0);
        assert!(breakdown.author > 0.0);
        assert!(breakdown.novelty > 0.0);
        assert_ne!(advanced.score, base.score);
    }

    #[test]
    fn two_authors_get_full_author_boost() {
        assert_eq!(author_boost(2), 0.2);
        assert_eq!(author_boost(1), 0.1);
        assert_eq!(author_boost(10), 0.0);
    }
}

//! Filter-and-Rank (component G): orchestrates the required gate and the
//! relevance scorer over a candidate set, then ranks survivors.

use crate::keywords::{check_required, KeywordDictionary};
use crate::models::{KeywordSpec, Paper};

use super::scorer::{score_paper, RelevanceResult};

#[derive(Debug, Clone)]
pub struct RankedPaper {
    pub paper: Paper,
    pub result: RelevanceResult,
    pub required_matches: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExcludedPaper {
    pub paper: Paper,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    pub total: usize,
    pub ranked: usize,
    pub excluded: usize,
    pub required_filtered: usize,
    pub min_score: f64,
    pub max_score: f64,
    pub avg_score: f64,
}

/// Run the required gate then the relevance scorer over `papers`,
/// returning survivors sorted by score descending (ties: newer
/// `published_at`, then lexicographic `paper_id`).
pub fn filter_and_rank(
    papers: Vec<Paper>,
    spec: &KeywordSpec,
    dict: &KeywordDictionary,
    min_score: f64,
) -> (Vec<RankedPaper>, Vec<ExcludedPaper>, FilterStats) {
    let total = papers.len();
    let mut ranked = Vec::new();
    let mut excluded = Vec::new();
    let mut required_filtered = 0usize;

    for paper in papers {
        let required_matches = if let Some(required) = &spec.required {
            let text = paper.search_text();
            let (pass, matched) = check_required(&text, required, dict);
            if !pass {
                required_filtered += 1;
                excluded.push(ExcludedPaper { paper, reason: "required-missed".to_string() });
                continue;
            }
            matched
        } else {
            Vec::new()
        };

        if spec.interest().is_empty() && spec.exclude.is_empty() {
            let result = RelevanceResult {
                score: 0.0,
                excluded: false,
                matched_interest: Vec::new(),
                matched_exclude: Vec::new(),
            };
            ranked.push(RankedPaper { paper, result, required_matches });
            continue;
        }

        let result = score_paper(&paper, spec, dict);
        if result.excluded || result.score < min_score {
            let reason = if result.excluded { "excluded".to_string() } else { "below-min-score".to_string() };
            excluded.push(ExcludedPaper { paper, reason });
            continue;
        }

        ranked.push(RankedPaper { paper, result, required_matches });
    }

    ranked.sort_by(|a, b| {
        b.result
            .score
            .partial_cmp(&a.result.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.paper.published_at.cmp(&a.paper.published_at))
            .then_with(|| a.paper.paper_id.cmp(&b.paper.paper_id))
    });

    let scores: Vec<f64> = ranked.iter().map(|r| r.result.score).collect();
    let stats = FilterStats {
        total,
        ranked: ranked.len(),
        excluded: excluded.len(),
        required_filtered,
        min_score: scores.iter().cloned().fold(f64::INFINITY, f64::min),
        max_score: scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        avg_score: if scores.is_empty() { 0.0 } else { scores.iter().sum::<f64>() / scores.len() as f64 },
    };

    (ranked, excluded, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_tier_markers, AuthorInfo};
    use chrono::{Duration, Utc};

    fn paper(id: &str, title: &str, days_ago: i64) -> Paper {
        Paper {
            paper_id: id.to_string(),
            title: title.to_string(),
            abstract_text: "".to_string(),
            authors: vec![AuthorInfo { name: "A".to_string(), affiliation: None }],
            categories: vec!["cs.AI".to_string()],
            primary_category: "cs.AI".to_string(),
            published_at: Utc::now() - Duration::days(days_ago),
            updated_at: Utc::now() - Duration::days(days_ago),
            entry_url: String::new(),
            pdf_url: String::new(),
            comment: None,
            journal_ref: None,
            doi: None,
        }
    }

    #[test]
    fn higher_score_ranks_first() {
        let papers = vec![paper("1", "a paper about boats", 1), paper("2", "robotics robotics robotics", 1)];
        let spec = KeywordSpec {
            raw_interest: vec!["robotics".to_string()],
            exclude: vec![],
            required: None,
            tier_markers: default_tier_markers(),
        };
        let (ranked, _, _) = filter_and_rank(papers, &spec, &KeywordDictionary::builtin(), f64::NEG_INFINITY);
        assert_eq!(ranked[0].paper.paper_id, "2");
        assert!(ranked[0].result.score >= ranked[1].result.score);
    }

    #[test]
    fn required_gate_rejection_is_counted() {
        let papers = vec![paper("1", "Autonomous Navigation System", 1)];
        let spec = KeywordSpec {
            raw_interest: vec![],
            exclude: vec![],
            required: Some(crate::models::RequiredKeywords {
                clauses: vec!["manipulation".to_string()],
                fuzzy_match: false,
                similarity_threshold: 0.8,
            }),
            tier_markers: default_tier_markers(),
        };
        let (ranked, excluded, stats) = filter_and_rank(papers, &spec, &KeywordDictionary::builtin(), f64::NEG_INFINITY);
        assert!(ranked.is_empty());
        assert_eq!(excluded.len(), 1);
        assert_eq!(stats.required_filtered, 1);
    }
}

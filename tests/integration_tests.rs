//! End-to-end tests across the keyword, relevance, and row-building
//! components, without touching the network.

use chrono::Utc;
use paper_radar::keywords::KeywordDictionary;
use paper_radar::models::{AuthorInfo, KeywordSpec, Paper, RequiredKeywords, RowFields, TierMarker, TierWeight};
use paper_radar::query::{build_query, DateWindow};
use paper_radar::relevance::filter_and_rank;

fn sample_paper(id: &str, title: &str, abstract_text: &str, categories: &[&str]) -> Paper {
    Paper {
        paper_id: id.to_string(),
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        authors: vec![AuthorInfo { name: "A. Researcher".to_string(), affiliation: None }],
        categories: categories.iter().map(|c| c.to_string()).collect(),
        primary_category: categories.first().copied().unwrap_or("cs.LG").to_string(),
        published_at: Utc::now(),
        updated_at: Utc::now(),
        entry_url: format!("https://arxiv.org/abs/{id}"),
        pdf_url: format!("https://arxiv.org/pdf/{id}"),
        comment: None,
        journal_ref: None,
        doi: None,
    }
}

fn spec(raw_interest: Vec<&str>, exclude: Vec<&str>, required: Option<RequiredKeywords>) -> KeywordSpec {
    KeywordSpec {
        raw_interest: raw_interest.into_iter().map(String::from).collect(),
        exclude: exclude.into_iter().map(String::from).collect(),
        required,
        tier_markers: vec![TierMarker { marker: "🎯".to_string(), tier: TierWeight::Core }],
    }
}

#[test]
fn required_and_of_or_clause_admits_a_matching_paper() {
    let dict = KeywordDictionary::builtin();
    let required = RequiredKeywords {
        clauses: vec!["robot OR robotics".to_string(), "learning".to_string()],
        fuzzy_match: false,
        similarity_threshold: 0.8,
    };
    let s = spec(vec!["🎯", "manipulation"], vec![], Some(required));

    let papers = vec![sample_paper(
        "1",
        "Reinforcement Learning for Robotic Manipulation",
        "A robot learns manipulation skills via reinforcement learning.",
        &["cs.RO"],
    )];

    let (ranked, excluded, stats) = filter_and_rank(papers, &s, &dict, 0.0);
    assert_eq!(stats.required_filtered, 0);
    assert!(excluded.is_empty());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].paper.paper_id, "1");
}

#[test]
fn required_gate_rejects_a_paper_missing_one_clause() {
    let dict = KeywordDictionary::builtin();
    let required = RequiredKeywords {
        clauses: vec!["robot OR robotics".to_string(), "quantum".to_string()],
        fuzzy_match: false,
        similarity_threshold: 0.8,
    };
    let s = spec(vec!["🎯", "manipulation"], vec![], Some(required));

    let papers = vec![sample_paper(
        "2",
        "Reinforcement Learning for Robotic Manipulation",
        "A robot learns manipulation skills via reinforcement learning.",
        &["cs.RO"],
    )];

    let (ranked, _excluded, stats) = filter_and_rank(papers, &s, &dict, 0.0);
    assert!(ranked.is_empty());
    assert_eq!(stats.required_filtered, 1);
}

#[test]
fn wildcard_interest_admits_any_paper() {
    let dict = KeywordDictionary::builtin();
    let s = spec(vec!["*"], vec![], None);

    let papers = vec![sample_paper("3", "An Unrelated Topic", "Nothing about any particular field.", &["q-bio.NC"])];

    let (ranked, _excluded, _stats) = filter_and_rank(papers, &s, &dict, 0.0);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].result.score, 1.0);
}

#[test]
fn fuzzy_exclude_filters_a_misspelled_match() {
    let dict = KeywordDictionary::builtin();
    let s = spec(vec!["🎯", "robotics"], vec!["survey"], None);

    let papers = vec![sample_paper(
        "4",
        "A Robotics Servey",
        "An extensive servey of robotics manipulation methods.",
        &["cs.RO"],
    )];

    let (ranked, excluded, stats) = filter_and_rank(papers, &s, &dict, 0.0);
    assert!(ranked.is_empty());
    assert_eq!(stats.excluded, 1);
    assert_eq!(excluded[0].paper.paper_id, "4");
}

#[test]
fn row_fields_identity_key_matches_source_paper_id() {
    let paper = sample_paper("5", "A Paper", "An abstract.", &["cs.RO"]);
    let row = RowFields::from_paper(&paper, &["robotics".to_string()], &[], 0.75);
    assert_eq!(row.arxiv_id.text, paper.paper_id);
}

#[test]
fn date_window_query_combines_categories_and_range() {
    use chrono::NaiveDate;

    let window = DateWindow {
        from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        to: Some(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()),
    };
    let query = build_query(None, &["cs.RO".to_string(), "cs.LG".to_string()], Some(window));

    assert!(query.contains("cat:cs.RO"));
    assert!(query.contains("cat:cs.LG"));
    assert!(query.contains("20240101"));
    assert!(query.contains("20240107"));
}

//! Canonical paper record and its remote-table projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One author as carried through from the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    #[serde(default)]
    pub affiliation: Option<String>,
}

/// Canonical in-memory record for one scholarly article.
///
/// Created by the acquisition engine, immutable afterwards, held for the
/// duration of one profile pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub paper_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<AuthorInfo>,
    pub categories: Vec<String>,
    pub primary_category: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entry_url: String,
    pub pdf_url: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub journal_ref: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

impl Paper {
    /// Concatenated, lowercased search text the keyword/relevance engines
    /// match against: title, abstract, categories, authors.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.abstract_text.len() + 64,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.abstract_text);
        text.push(' ');
        text.push_str(&self.categories.join(" "));
        text.push(' ');
        for a in &self.authors {
            text.push_str(&a.name);
            text.push(' ');
        }
        text.to_lowercase()
    }

    pub fn categories_joined(&self) -> String {
        self.categories.join(" ")
    }

    pub fn authors_joined(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Feishu hyperlink field shape: `{"text": ..., "link": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperlinkField {
    pub text: String,
    pub link: String,
}

/// Remote-table-shaped projection of a [`Paper`], matching the bitable
/// field set exactly. Keeps the map-shaped boundary data out of the
/// relevance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFields {
    #[serde(rename = "ArXiv ID")]
    pub arxiv_id: HyperlinkField,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: Vec<String>,
    #[serde(rename = "Abstract")]
    pub abstract_text: String,
    #[serde(rename = "Categories")]
    pub categories: Vec<String>,
    #[serde(rename = "Matched Keywords")]
    pub matched_keywords: Vec<String>,
    #[serde(rename = "Required Matches")]
    pub required_matches: Vec<String>,
    #[serde(rename = "Relevance Score")]
    pub relevance_score: f64,
    #[serde(rename = "Research Area")]
    pub research_area: Vec<String>,
    #[serde(rename = "PDF Link")]
    pub pdf_link: HyperlinkField,
    #[serde(rename = "Published Date")]
    pub published_date: i64,
    #[serde(rename = "Updated Date")]
    pub updated_date: i64,
}

impl RowFields {
    /// Cap authors/categories at 10 entries each, matching the multi-select
    /// field limits on the remote table, and truncate the abstract to 2000
    /// characters.
    pub fn from_paper(
        paper: &Paper,
        matched_keywords: &[String],
        required_matches: &[String],
        score: f64,
    ) -> Self {
        const MAX_TAGS: usize = 10;
        let authors: Vec<String> = paper
            .authors
            .iter()
            .take(MAX_TAGS)
            .map(|a| a.name.clone())
            .collect();
        let categories: Vec<String> = paper.categories.iter().take(MAX_TAGS).cloned().collect();
        let mut abstract_text = paper.abstract_text.clone();
        if abstract_text.chars().count() > 2000 {
            abstract_text = abstract_text.chars().take(2000).collect();
        }

        Self {
            arxiv_id: HyperlinkField {
                text: paper.paper_id.clone(),
                link: paper.entry_url.clone(),
            },
            title: paper.title.clone(),
            authors,
            abstract_text,
            categories,
            matched_keywords: matched_keywords.to_vec(),
            required_matches: required_matches.to_vec(),
            relevance_score: (score * 100.0).round() / 100.0,
            research_area: vec![paper.primary_category.clone()],
            pdf_link: HyperlinkField {
                text: "PDF".to_string(),
                link: paper.pdf_url.clone(),
            },
            published_date: paper.published_at.timestamp_millis(),
            updated_date: paper.updated_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper() -> Paper {
        Paper {
            paper_id: "2301.12345".to_string(),
            title: "Mobile Manipulation for Service Robots".to_string(),
            abstract_text: "A study of manipulation.".to_string(),
            authors: vec![AuthorInfo { name: "Jane Doe".to_string(), affiliation: None }],
            categories: vec!["cs.RO".to_string()],
            primary_category: "cs.RO".to_string(),
            published_at: Utc::now(),
            updated_at: Utc::now(),
            entry_url: "http://arxiv.org/abs/2301.12345".to_string(),
            pdf_url: "http://arxiv.org/pdf/2301.12345.pdf".to_string(),
            comment: None,
            journal_ref: None,
            doi: None,
        }
    }

    #[test]
    fn search_text_is_lowercased_and_concatenated() {
        let paper = sample_paper();
        let text = paper.search_text();
        assert!(text.contains("mobile manipulation"));
        assert!(text.contains("jane doe"));
        assert!(text.contains("cs.ro"));
    }

    #[test]
    fn row_fields_caps_tag_lists() {
        let mut paper = sample_paper();
        paper.authors = (0..15)
            .map(|i| AuthorInfo { name: format!("Author {i}"), affiliation: None })
            .collect();
        let row = RowFields::from_paper(&paper, &[], &[], 1.0);
        assert_eq!(row.authors.len(), 10);
    }
}

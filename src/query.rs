//! Query Builder: assembles the opaque search-query string the
//! acquisition engine sends to the upstream article API.

use chrono::NaiveDate;

/// Half-open inclusive date window, rendered as `submittedDate:[FROM0000
/// TO TO2359]`.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

const DEFAULT_FROM: &str = "19910801";

/// Build a query string from free text, categories, and an optional date
/// window. Categories join with OR; all parts join with AND. Empty
/// everything renders as the universal match token.
pub fn build_query(text: Option<&str>, categories: &[String], window: Option<DateWindow>) -> String {
    let mut parts = Vec::new();

    if let Some(t) = text {
        let t = t.trim();
        if !t.is_empty() {
            parts.push(format!("all:{}", t));
        }
    }

    if !categories.is_empty() {
        let cats = categories
            .iter()
            .map(|c| format!("cat:{}", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        parts.push(format!("({})", cats));
    }

    if let Some(w) = window {
        let from = w.from.map(|d| d.format("%Y%m%d").to_string()).unwrap_or_else(|| DEFAULT_FROM.to_string());
        let to = w.to.map(|d| d.format("%Y%m%d").to_string()).unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d").to_string());
        parts.push(format!("submittedDate:[{}0000 TO {}2359]", from, to));
    }

    if parts.is_empty() {
        return "all:*".to_string();
    }

    parts.join(" AND ")
}

//! Keyword Expander (C), Required-Keyword Gate (D) and the supplemented
//! domain filter.

pub mod dictionary;
pub mod domain;
pub mod expander;
pub mod fuzzy;
pub mod required;

pub use dictionary::KeywordDictionary;
pub use expander::expand_keywords;
pub use required::check_required;

use thiserror::Error;

/// Configuration-invalid cases surfaced at gate construction. Fatal:
/// callers must not attempt to score papers with an invalid spec.
#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("required-keyword gating is enabled but no clauses were configured")]
    EmptyRequiredClauses,
    #[error("keyword spec has no interest keywords and no exclude keywords")]
    EmptyKeywordSpec,
}

//! Acquisition Engine (component B) and its Atom feed parser.

pub mod atom;
pub mod client;

pub use client::AcquisitionClient;

use thiserror::Error;

/// Errors from the Acquisition Engine: transient upstream failures and
/// bad records. Neither kind is fatal to a pipeline run; both are
/// recovered at the smallest unit of work (one sub-window) and logged.
#[derive(Debug, Error)]
pub enum ArxivError {
    #[error("request to upstream article API failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("failed to parse feed response: {0}")]
    ParseError(String),
}

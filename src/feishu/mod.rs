//! Token Manager (H), Remote Table Client (I), Sync Engine (J),
//! Notifier (K).

pub mod client;
pub mod notifier;
pub mod sync;
pub mod token;

pub use client::{BatchInsertOutcome, TableClient, TableInfo, TableOps};
pub use notifier::Notifier;
pub use sync::{SyncDelta, SyncEngine};
pub use token::TokenManager;

use thiserror::Error;

/// Errors from the table/messaging API surface: transport, business
/// status, and authentication-expired cases.
#[derive(Debug, Error)]
pub enum FeishuError {
    #[error("request to remote table API failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("authentication expired")]
    AuthExpired,

    #[error("remote table API rejected the request (code {code}): {message}")]
    Business { code: i64, message: String },

    #[error("credentials not configured: {0}")]
    MissingCredentials(String),
}

pub mod config;
pub mod paper;

pub use config::{
    default_tier_markers, BatchConfig, FeishuCredentials, KeywordSpec, NotificationConfig,
    RequiredKeywords, RetryConfig, ScoreWeights, SyncConfig, TierMarker, TierWeight,
};
pub use paper::{AuthorInfo, HyperlinkField, Paper, RowFields};

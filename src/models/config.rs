//! Configuration shapes the external loader resolves and hands to the
//! core. The loader itself is out of scope; these are its output types.

use serde::{Deserialize, Serialize};

/// A marker comment line in `raw_interest` that promotes the keywords
/// following it to a weight tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierMarker {
    pub marker: String,
    pub tier: TierWeight,
}

/// Per-profile keyword configuration consumed by the relevance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSpec {
    /// Raw lines: comments (tier markers) interleaved with keywords, in
    /// declaration order. Preserves position for the position-weight
    /// computation in the base scorer.
    pub raw_interest: Vec<String>,
    /// Keywords to veto a paper outright.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub required: Option<RequiredKeywords>,
    /// Tier markers recognized in `raw_interest`; configurable rather than
    /// a hardcoded constant.
    #[serde(default = "default_tier_markers")]
    pub tier_markers: Vec<TierMarker>,
}

pub fn default_tier_markers() -> Vec<TierMarker> {
    vec![
        TierMarker { marker: "🎯".to_string(), tier: TierWeight::Core },
        TierMarker { marker: "核心概念".to_string(), tier: TierWeight::Core },
        TierMarker { marker: "高权重".to_string(), tier: TierWeight::Core },
        TierMarker { marker: "🔧".to_string(), tier: TierWeight::Extended },
        TierMarker { marker: "扩展概念".to_string(), tier: TierWeight::Extended },
        TierMarker { marker: "中权重".to_string(), tier: TierWeight::Extended },
        TierMarker { marker: "📝".to_string(), tier: TierWeight::Related },
        TierMarker { marker: "相关概念".to_string(), tier: TierWeight::Related },
        TierMarker { marker: "标准权重".to_string(), tier: TierWeight::Related },
    ]
}

impl KeywordSpec {
    /// `raw_interest` with comment/blank lines stripped; order preserved.
    pub fn interest(&self) -> Vec<String> {
        self.raw_interest
            .iter()
            .filter(|line| !self.is_comment_line(line) && !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .collect()
    }

    fn is_comment_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('#')
            || self.tier_markers.iter().any(|m| trimmed.starts_with(m.marker.as_str()))
    }
}

/// Weight tier a keyword is assigned based on the marker comment that
/// precedes it in `raw_interest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierWeight {
    Core,
    Extended,
    Related,
    Default,
}

impl TierWeight {
    pub fn multiplier(self) -> f64 {
        match self {
            TierWeight::Core => 2.5,
            TierWeight::Extended => 1.5,
            TierWeight::Related => 1.0,
            TierWeight::Default => 1.0,
        }
    }
}

/// AND-of-OR required-keyword gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredKeywords {
    /// Each entry is either a single keyword or an OR-disjunction
    /// (`"A OR B OR C"`). Clauses are ANDed together.
    pub clauses: Vec<String>,
    #[serde(default)]
    pub fuzzy_match: bool,
    #[serde(default = "default_required_similarity")]
    pub similarity_threshold: f64,
}

fn default_required_similarity() -> f64 {
    0.8
}

/// Weights combining the base scorer with the advanced-mode boosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    #[serde(default = "one")]
    pub base: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
    #[serde(default = "default_author_weight")]
    pub author: f64,
    #[serde(default = "default_novelty_weight")]
    pub novelty: f64,
    #[serde(default = "default_citation_weight")]
    pub citation: f64,
}

fn one() -> f64 {
    1.0
}
fn default_semantic_weight() -> f64 {
    0.3
}
fn default_author_weight() -> f64 {
    0.2
}
fn default_novelty_weight() -> f64 {
    0.4
}
fn default_citation_weight() -> f64 {
    0.3
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: one(),
            semantic: default_semantic_weight(),
            author: default_author_weight(),
            novelty: default_novelty_weight(),
            citation: default_citation_weight(),
        }
    }
}

/// Date-window batching knobs for the acquisition engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    #[serde(default = "default_max_days_per_batch")]
    pub max_days_per_batch: i64,
    #[serde(default)]
    pub batch_overlap_days: i64,
    #[serde(default = "default_min_batch_interval")]
    pub min_batch_interval_secs: f64,
    /// Row count per `batch_create` call when syncing to the remote table.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_max_days_per_batch() -> i64 {
    7
}
fn default_min_batch_interval() -> f64 {
    1.0
}
fn default_batch_size() -> usize {
    20
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_days_per_batch: default_max_days_per_batch(),
            batch_overlap_days: 0,
            min_batch_interval_secs: default_min_batch_interval(),
            batch_size: default_batch_size(),
        }
    }
}

/// Retry/backoff knobs shared by the Acquisition Engine and the Remote
/// Table Client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_retry_duration")]
    pub max_retry_duration_secs: u64,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    #[serde(default = "default_retry_on")]
    pub retry_on_rate_limit: bool,
    #[serde(default = "default_retry_on")]
    pub retry_on_server_error: bool,
    #[serde(default = "default_retry_on")]
    pub retry_on_network_error: bool,
}

fn default_max_retries() -> u32 {
    3
}
fn default_max_retry_duration() -> u64 {
    300
}
fn default_initial_backoff() -> u64 {
    1000
}
fn default_max_backoff() -> u64 {
    30000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_jitter_factor() -> f64 {
    0.1
}
fn default_retry_on() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_retry_duration_secs: default_max_retry_duration(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
            retry_on_rate_limit: true,
            retry_on_server_error: true,
            retry_on_network_error: true,
        }
    }
}

/// Resolved credentials for the remote table API. Reading these from the
/// environment is the (out-of-scope) config loader's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeishuCredentials {
    pub app_id: String,
    pub app_secret: String,
    /// Pre-provided user token; used as-is, never refreshed.
    #[serde(default)]
    pub user_token: Option<String>,
    pub base_app_token: String,
    #[serde(default)]
    pub table_id: Option<String>,
}

/// Notifier broadcast knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    #[serde(default = "default_min_papers_threshold")]
    pub min_papers_threshold: usize,
    #[serde(default = "default_chat_spacing")]
    pub min_chat_spacing_secs: f64,
}

fn default_min_papers_threshold() -> usize {
    1
}
fn default_chat_spacing() -> f64 {
    0.5
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            min_papers_threshold: default_min_papers_threshold(),
            min_chat_spacing_secs: default_chat_spacing(),
        }
    }
}

/// Sync Engine knobs: the score floor a ranked candidate must clear to
/// be written to the remote table, independent of the ranking cutoff
/// (`Profile::min_score`) already applied upstream by Filter-and-Rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default)]
    pub sync_threshold: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { sync_threshold: 0.0 }
    }
}

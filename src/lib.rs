//! A research-paper ingestion pipeline: for each configured profile,
//! query the upstream article feed, score and rank candidates against
//! the profile's keyword spec, upsert qualifying papers into a remote
//! table, and notify.
//!
//! Config loading, the CLI entry point, and the scheduler that decides
//! *when* to call [`run_profile`] live outside this crate.

pub mod arxiv;
pub mod feishu;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod query;
pub mod relevance;
pub mod retry;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use arxiv::AcquisitionClient;
use feishu::{Notifier, SyncDelta, SyncEngine, TableClient, TokenManager};
use keywords::KeywordDictionary;
use models::{BatchConfig, FeishuCredentials, KeywordSpec, NotificationConfig, RetryConfig, SyncConfig};
use relevance::filter_and_rank;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Keyword(#[from] keywords::KeywordError),
    #[error(transparent)]
    Feishu(#[from] feishu::FeishuError),
}

/// One configured research profile: a name, its keyword spec, and the
/// table it syncs into.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub categories: Vec<String>,
    pub spec: KeywordSpec,
    pub min_score: f64,
    pub table_name: Option<String>,
}

/// Shared dependencies for a pipeline run: one acquisition client, one
/// set of remote-table credentials, and the batching/notification knobs
/// that apply across all profiles in the run.
pub struct PipelineContext {
    pub acquisition: AcquisitionClient,
    pub dictionary: KeywordDictionary,
    pub table_client: TableClient,
    pub notifier: Notifier,
    pub batch_config: BatchConfig,
    pub sync_config: SyncConfig,
}

impl PipelineContext {
    pub fn new(
        credentials: FeishuCredentials,
        retry_config: RetryConfig,
        notification_config: NotificationConfig,
        batch_config: BatchConfig,
        sync_config: SyncConfig,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("paper-radar/0.1")
            .build()
            .expect("static client configuration is valid");
        let tokens = TokenManager::new(http.clone(), credentials.clone());
        let table_client = TableClient::new(
            http.clone(),
            tokens.clone(),
            credentials.base_app_token.clone(),
            retry_config.clone(),
        );
        let notifier = Notifier::new(http, tokens, credentials.base_app_token, notification_config);

        Self {
            acquisition: AcquisitionClient::with_retry_config(retry_config),
            dictionary: KeywordDictionary::builtin(),
            table_client,
            notifier,
            batch_config,
            sync_config,
        }
    }
}

/// Runs one profile end to end: acquire candidates in `[from, to]`,
/// filter and rank them, sync the survivors into the profile's table.
/// Does not notify — call [`notify_all`] once after running every
/// profile in a batch so a single digest covers all of them.
pub async fn run_profile(
    ctx: &PipelineContext,
    profile: &Profile,
    from: NaiveDate,
    to: NaiveDate,
    max_results: usize,
) -> Result<SyncDelta, PipelineError> {
    if profile.spec.interest().is_empty() && profile.spec.exclude.is_empty() {
        return Err(keywords::KeywordError::EmptyKeywordSpec.into());
    }
    if let Some(required) = &profile.spec.required {
        if required.clauses.is_empty() {
            return Err(keywords::KeywordError::EmptyRequiredClauses.into());
        }
    }

    let papers = ctx
        .acquisition
        .get_range(from, to, max_results, &profile.categories, &ctx.batch_config)
        .await;
    info!(profile = %profile.name, fetched = papers.len(), "acquisition complete");

    let (ranked, _excluded, stats) = filter_and_rank(papers, &profile.spec, &ctx.dictionary, profile.min_score);
    info!(
        profile = %profile.name,
        ranked = stats.ranked,
        excluded = stats.excluded,
        required_filtered = stats.required_filtered,
        "filter-and-rank complete"
    );

    let engine = SyncEngine::new(&ctx.table_client);
    let delta = engine
        .sync(&profile.name, profile.table_name.as_deref(), ranked, &ctx.batch_config, &ctx.sync_config)
        .await?;
    Ok(delta)
}

/// Runs every profile in `profiles` over the same date window, then
/// sends one aggregate notification covering all of them.
pub async fn run_all(
    ctx: &PipelineContext,
    profiles: &[Profile],
    from: NaiveDate,
    to: NaiveDate,
    max_results: usize,
) -> Result<Vec<SyncDelta>, PipelineError> {
    let mut deltas = Vec::with_capacity(profiles.len());
    for profile in profiles {
        match run_profile(ctx, profile, from, to, max_results).await {
            Ok(delta) => deltas.push(delta),
            Err(e) => {
                tracing::warn!(profile = %profile.name, error = %e, "profile run failed, continuing with remaining profiles");
            }
        }
    }

    ctx.notifier.notify(&deltas).await?;
    Ok(deltas)
}

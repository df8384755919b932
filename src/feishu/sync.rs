//! Sync Engine (component J): idempotently upserts ranked papers into a
//! per-profile remote table.

use tracing::info;

use crate::models::{BatchConfig, SyncConfig};
use crate::relevance::RankedPaper;

use super::client::{row_for, TableOps};
use super::FeishuError;

const DEFAULT_TABLE_NAME: &str = "Papers";

/// What a single `sync()` call did, used to build the digest notification.
#[derive(Debug, Clone, Default)]
pub struct SyncDelta {
    pub profile: String,
    pub table_id: String,
    pub table_name: String,
    pub inserted: Vec<RankedPaper>,
    pub skipped_duplicate: usize,
    pub skipped_low_score: usize,
    pub failed: usize,
    pub total_count: usize,
}

impl SyncDelta {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
    }
}

pub struct SyncEngine<'a, C: TableOps> {
    client: &'a C,
}

impl<'a, C: TableOps> SyncEngine<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Syncs one profile's ranked papers into its table, creating the
    /// table on first use, deduping against rows already present, and
    /// dropping any candidate whose score is below `sync_cfg.sync_threshold`.
    pub async fn sync(
        &self,
        profile_name: &str,
        table_name: Option<&str>,
        ranked: Vec<RankedPaper>,
        batch_cfg: &BatchConfig,
        sync_cfg: &SyncConfig,
    ) -> Result<SyncDelta, FeishuError> {
        let table_name = table_name.unwrap_or(DEFAULT_TABLE_NAME);

        let table = match self.client.find_table_by_name(table_name).await? {
            Some(t) => t,
            None => self.client.create_papers_table(table_name).await?,
        };

        let existing_ids = self.client.list_paper_ids(&table.table_id).await?;
        let known_count = existing_ids.len();

        let mut fresh = Vec::new();
        let mut skipped_duplicate = 0usize;
        let mut skipped_low_score = 0usize;
        for candidate in ranked {
            if existing_ids.contains(&candidate.paper.paper_id) {
                skipped_duplicate += 1;
                continue;
            }
            if candidate.result.score < sync_cfg.sync_threshold {
                skipped_low_score += 1;
                continue;
            }
            fresh.push(candidate);
        }

        let mut inserted = Vec::new();
        let mut failed = 0usize;

        for chunk in fresh.chunks(batch_cfg.batch_size.max(1)) {
            let rows: Vec<_> = chunk
                .iter()
                .map(|c| row_for(&c.paper, &c.result.matched_interest, &c.required_matches, c.result.score))
                .collect();

            let outcome = self.client.batch_insert(&table.table_id, &rows).await?;
            if outcome.failed > 0 {
                failed += chunk.len();
            } else {
                inserted.extend(chunk.iter().cloned());
            }
        }

        info!(
            profile = profile_name,
            inserted = inserted.len(),
            skipped_duplicate,
            skipped_low_score,
            failed,
            "sync complete"
        );

        Ok(SyncDelta {
            profile: profile_name.to_string(),
            table_id: table.table_id,
            table_name: table_name.to_string(),
            total_count: known_count + inserted.len(),
            inserted,
            skipped_duplicate,
            skipped_low_score,
            failed,
        })
    }

    /// Syncs several profiles in sequence, returning all per-profile
    /// deltas for a single aggregate notification rather than one per
    /// profile.
    pub async fn sync_many(
        &self,
        profiles: Vec<(String, Option<String>, Vec<RankedPaper>)>,
        batch_cfg: &BatchConfig,
        sync_cfg: &SyncConfig,
    ) -> Vec<SyncDelta> {
        let mut deltas = Vec::with_capacity(profiles.len());
        for (name, table_name, ranked) in profiles {
            match self.sync(&name, table_name.as_deref(), ranked, batch_cfg, sync_cfg).await {
                Ok(delta) => deltas.push(delta),
                Err(e) => {
                    tracing::warn!(profile = %name, error = %e, "profile sync failed");
                    deltas.push(SyncDelta { profile: name, ..Default::default() });
                }
            }
        }
        deltas
    }
}

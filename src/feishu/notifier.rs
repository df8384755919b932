//! Notifier (component K): composes and broadcasts a digest of newly
//! synced papers to every chat the bot participates in.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::NotificationConfig;

use super::sync::SyncDelta;
use super::token::TokenManager;
use super::FeishuError;

const CHAT_LIST_ENDPOINT: &str = "https://open.feishu.cn/open-apis/im/v1/chats";
const MESSAGE_ENDPOINT: &str = "https://open.feishu.cn/open-apis/im/v1/messages?receive_id_type=chat_id";
const BITABLE_DEEP_LINK: &str = "https://open.feishu.cn/base";

#[derive(Deserialize)]
struct ChatListEnvelope {
    code: i64,
    msg: String,
    data: Option<ChatListData>,
}

#[derive(Deserialize)]
struct ChatListData {
    items: Vec<ChatItem>,
    page_token: Option<String>,
    has_more: bool,
}

#[derive(Deserialize)]
struct ChatItem {
    chat_id: String,
}

#[derive(Deserialize)]
struct SendEnvelope {
    code: i64,
    msg: String,
}

pub struct Notifier {
    http: reqwest::Client,
    tokens: TokenManager,
    base_app_token: String,
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(http: reqwest::Client, tokens: TokenManager, base_app_token: String, config: NotificationConfig) -> Self {
        Self { http, tokens, base_app_token, config }
    }

    /// Builds the digest for every non-empty delta and sends it to all
    /// chats the bot belongs to. No-op if fewer than
    /// `min_papers_threshold` papers were inserted in total.
    pub async fn notify(&self, deltas: &[SyncDelta]) -> Result<usize, FeishuError> {
        let total_inserted: usize = deltas.iter().map(|d| d.inserted.len()).sum();
        if total_inserted < self.config.min_papers_threshold {
            info!(total_inserted, threshold = self.config.min_papers_threshold, "digest suppressed, below threshold");
            return Ok(0);
        }

        let digest = compose_digest(deltas, &self.base_app_token);
        let chat_ids = self.list_chats().await?;

        let mut sent = 0usize;
        for (i, chat_id) in chat_ids.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_secs_f64(self.config.min_chat_spacing_secs)).await;
            }
            match self.send_text(chat_id, &digest).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(chat_id, error = %e, "failed to deliver digest"),
            }
        }

        Ok(sent)
    }

    async fn list_chats(&self) -> Result<Vec<String>, FeishuError> {
        let mut page_token: Option<String> = None;
        let mut chats = Vec::new();

        loop {
            let url = match &page_token {
                Some(t) => format!("{CHAT_LIST_ENDPOINT}?page_size=100&page_token={t}"),
                None => format!("{CHAT_LIST_ENDPOINT}?page_size=100"),
            };
            let token = self.tokens.get().await?;
            let envelope: ChatListEnvelope =
                self.http.get(&url).bearer_auth(token).send().await?.json().await?;
            if envelope.code != 0 {
                return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
            }
            let data = envelope
                .data
                .ok_or_else(|| FeishuError::Business { code: 0, message: "missing data field".to_string() })?;
            chats.extend(data.items.into_iter().map(|c| c.chat_id));
            if data.has_more {
                page_token = data.page_token;
            } else {
                break;
            }
        }

        Ok(chats)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError> {
        let token = self.tokens.get().await?;
        let content = serde_json::json!({ "text": text }).to_string();
        let body = serde_json::json!({
            "receive_id": chat_id,
            "msg_type": "text",
            "content": content,
        });

        let envelope: SendEnvelope = self
            .http
            .post(MESSAGE_ENDPOINT)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if envelope.code != 0 {
            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
        }
        Ok(())
    }
}

/// Plain-text digest: one section per profile with a non-empty delta, a
/// deep link to its table, and its single top-ranked inserted paper
/// (highest score, ties broken by newest `published_at`).
fn compose_digest(deltas: &[SyncDelta], base_app_token: &str) -> String {
    let mut lines = Vec::new();
    let total: usize = deltas.iter().map(|d| d.inserted.len()).sum();
    lines.push(format!("New papers: {total}"));

    for delta in deltas {
        if delta.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!(
            "[{}] {} new (total {}) — {}/{}?table={}",
            delta.profile,
            delta.inserted.len(),
            delta.total_count,
            BITABLE_DEEP_LINK,
            base_app_token,
            delta.table_id,
        ));

        if let Some(top) = delta
            .inserted
            .iter()
            .max_by(|a, b| {
                a.result
                    .score
                    .partial_cmp(&b.result.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.paper.published_at.cmp(&b.paper.published_at))
            })
        {
            lines.push(format!(
                "  top: {} (score {:.2}) {}",
                top.paper.title, top.result.score, top.paper.entry_url
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorInfo, Paper};
    use crate::relevance::{RankedPaper, RelevanceResult};
    use chrono::Utc;

    fn sample_ranked(paper_id: &str, score: f64) -> RankedPaper {
        RankedPaper {
            paper: Paper {
                paper_id: paper_id.to_string(),
                title: "A Paper".to_string(),
                abstract_text: "abstract".to_string(),
                authors: vec![AuthorInfo { name: "A. Author".to_string(), affiliation: None }],
                categories: vec!["cs.RO".to_string()],
                primary_category: "cs.RO".to_string(),
                published_at: Utc::now(),
                updated_at: Utc::now(),
                entry_url: format!("https://arxiv.org/abs/{paper_id}"),
                pdf_url: format!("https://arxiv.org/pdf/{paper_id}"),
                comment: None,
                journal_ref: None,
                doi: None,
            },
            result: RelevanceResult { score, excluded: false, matched_interest: vec![], matched_exclude: vec![] },
            required_matches: vec![],
        }
    }

    #[test]
    fn digest_lists_only_nonempty_profiles() {
        let deltas = vec![
            SyncDelta {
                profile: "robotics".to_string(),
                table_id: "tbl1".to_string(),
                table_name: "Papers".to_string(),
                inserted: vec![sample_ranked("1", 0.9)],
                total_count: 1,
                ..Default::default()
            },
            SyncDelta::default(),
        ];
        let digest = compose_digest(&deltas, "app123");
        assert!(digest.contains("robotics"));
        assert!(digest.contains("New papers: 1"));
    }

    #[test]
    fn digest_names_only_the_top_ranked_paper() {
        let deltas = vec![SyncDelta {
            profile: "robotics".to_string(),
            table_id: "tbl1".to_string(),
            table_name: "Papers".to_string(),
            inserted: vec![sample_ranked("1", 0.4), sample_ranked("2", 0.9)],
            total_count: 2,
            ..Default::default()
        }];
        let digest = compose_digest(&deltas, "app123");
        assert!(digest.contains("top: "));
        assert_eq!(digest.matches("top: ").count(), 1);
        assert!(digest.contains(&format!("score {:.2}", 0.9)));
    }
}

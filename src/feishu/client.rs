//! Remote Table Client (component I): retry-aware HTTP layer over the
//! bitable API.

use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Paper, RetryConfig, RowFields};
use crate::retry::{RetryExecutor, TableApiErrorClassifier};

use super::token::TokenManager;
use super::FeishuError;

const BASE_URL: &str = "https://open.feishu.cn/open-apis/bitable/v1";

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub table_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct BatchInsertOutcome {
    pub inserted: usize,
    pub failed: usize,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    msg: String,
    data: Option<T>,
}

#[derive(Deserialize)]
struct TableListData {
    items: Vec<TableItem>,
    page_token: Option<String>,
    has_more: bool,
}

#[derive(Deserialize)]
struct TableItem {
    table_id: String,
    name: String,
}

#[derive(Deserialize)]
struct RecordListData {
    items: Vec<RecordItem>,
    page_token: Option<String>,
    has_more: bool,
}

#[derive(Deserialize)]
struct RecordItem {
    record_id: String,
    fields: Value,
}

#[derive(Serialize)]
struct CreateTableRequest<'a> {
    table: CreateTableBody<'a>,
}

#[derive(Serialize)]
struct CreateTableBody<'a> {
    name: &'a str,
}

/// The subset of the Remote Table Client's operations the Sync Engine
/// depends on, abstracted so a fake backing store can stand in for tests.
#[async_trait]
pub trait TableOps {
    async fn find_table_by_name(&self, name: &str) -> Result<Option<TableInfo>, FeishuError>;
    async fn create_papers_table(&self, name: &str) -> Result<TableInfo, FeishuError>;
    async fn list_paper_ids(&self, table_id: &str) -> Result<HashSet<String>, FeishuError>;
    async fn batch_insert(&self, table_id: &str, rows: &[RowFields]) -> Result<BatchInsertOutcome, FeishuError>;
}

pub struct TableClient {
    http: reqwest::Client,
    tokens: TokenManager,
    base_app_token: String,
    executor: RetryExecutor<FeishuError>,
}

impl TableClient {
    pub fn new(http: reqwest::Client, tokens: TokenManager, base_app_token: String, retry_config: RetryConfig) -> Self {
        let executor = RetryExecutor::new(retry_config, Box::new(TableApiErrorClassifier));
        Self { http, tokens, base_app_token, executor }
    }

    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, FeishuError> {
        let mut page_token: Option<String> = None;
        let mut tables = Vec::new();

        loop {
            let url = match &page_token {
                Some(t) => format!("{BASE_URL}/apps/{}/tables?page_size=100&page_token={t}", self.base_app_token),
                None => format!("{BASE_URL}/apps/{}/tables?page_size=100", self.base_app_token),
            };
            let data: TableListData = self.get_authed(&url).await?;
            tables.extend(data.items.into_iter().map(|t| TableInfo { table_id: t.table_id, name: t.name }));
            if data.has_more {
                page_token = data.page_token;
            } else {
                break;
            }
        }

        Ok(tables)
    }

    pub async fn find_table_by_name(&self, name: &str) -> Result<Option<TableInfo>, FeishuError> {
        let tables = self.list_tables().await?;
        Ok(tables.into_iter().find(|t| t.name == name))
    }

    pub async fn create_papers_table(&self, name: &str) -> Result<TableInfo, FeishuError> {
        let url = format!("{BASE_URL}/apps/{}/tables", self.base_app_token);
        let token = self.tokens.get().await?;
        let body = CreateTableRequest { table: CreateTableBody { name } };

        let envelope: ApiEnvelope<Value> = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if envelope.code != 0 {
            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
        }

        let table_id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("table_id"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(TableInfo { table_id, name: name.to_string() })
    }

    /// Paginate through every record in `table_id`, following `page_token`
    /// until the server reports no more pages.
    pub async fn list_records(&self, table_id: &str) -> Result<Vec<(String, Value)>, FeishuError> {
        let mut page_token: Option<String> = None;
        let mut records = Vec::new();

        loop {
            let url = match &page_token {
                Some(t) => format!(
                    "{BASE_URL}/apps/{}/tables/{table_id}/records?page_size=100&page_token={t}",
                    self.base_app_token
                ),
                None => format!("{BASE_URL}/apps/{}/tables/{table_id}/records?page_size=100", self.base_app_token),
            };
            let data: RecordListData = self.get_authed(&url).await?;
            records.extend(data.items.into_iter().map(|item| (item.record_id, item.fields)));
            if data.has_more {
                page_token = data.page_token;
            } else {
                break;
            }
        }

        Ok(records)
    }

    /// All existing `paper_id`s in `table_id`, read from the "ArXiv ID"
    /// hyperlink/text field.
    pub async fn list_paper_ids(&self, table_id: &str) -> Result<HashSet<String>, FeishuError> {
        let records = self.list_records(table_id).await?;
        Ok(records.iter().filter_map(|(_, fields)| extract_arxiv_id(fields)).collect())
    }

    /// Single-record insert, returning the new `record_id`.
    pub async fn insert_record(&self, table_id: &str, fields: &RowFields) -> Result<String, FeishuError> {
        let url = format!("{BASE_URL}/apps/{}/tables/{table_id}/records", self.base_app_token);
        let body = serde_json::json!({ "fields": fields });
        let token = self.tokens.get().await?;

        let envelope: ApiEnvelope<Value> =
            self.http.post(&url).bearer_auth(token).json(&body).send().await?.json().await?;

        if envelope.code != 0 {
            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
        }

        let record_id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("record"))
            .and_then(|r| r.get("record_id"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(record_id)
    }

    /// Field-level update of an existing record.
    pub async fn update_record(&self, table_id: &str, record_id: &str, fields: &RowFields) -> Result<(), FeishuError> {
        let url = format!("{BASE_URL}/apps/{}/tables/{table_id}/records/{record_id}", self.base_app_token);
        let body = serde_json::json!({ "fields": fields });
        let token = self.tokens.get().await?;

        let envelope: ApiEnvelope<Value> =
            self.http.put(&url).bearer_auth(token).json(&body).send().await?.json().await?;

        if envelope.code != 0 {
            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
        }
        Ok(())
    }

    pub async fn batch_insert(&self, table_id: &str, rows: &[RowFields]) -> Result<BatchInsertOutcome, FeishuError> {
        if rows.is_empty() {
            return Ok(BatchInsertOutcome { inserted: 0, failed: 0 });
        }

        let url = format!("{BASE_URL}/apps/{}/tables/{table_id}/records/batch_create", self.base_app_token);
        let records: Vec<Value> = rows
            .iter()
            .map(|r| serde_json::json!({ "fields": r }))
            .collect();
        let body = serde_json::json!({ "records": records });

        let http = self.http.clone();
        let tokens = self.tokens.clone();
        let result = self
            .executor
            .execute(
                move || {
                    let http = http.clone();
                    let tokens = tokens.clone();
                    let url = url.clone();
                    let body = body.clone();
                    Box::pin(async move {
                        let token = tokens.get().await?;
                        let envelope: ApiEnvelope<Value> = http
                            .post(&url)
                            .bearer_auth(token)
                            .json(&body)
                            .send()
                            .await?
                            .json()
                            .await?;
                        if envelope.code == 99991663 || envelope.code == 99991664 {
                            return Err(FeishuError::AuthExpired);
                        }
                        if envelope.code != 0 {
                            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
                        }
                        Ok(())
                    }) as Pin<Box<dyn std::future::Future<Output = Result<(), FeishuError>> + Send>>
                },
                "batch_insert",
            )
            .await;

        match result {
            Ok(()) => Ok(BatchInsertOutcome { inserted: rows.len(), failed: 0 }),
            Err(FeishuError::AuthExpired) => {
                self.tokens.force_refresh().await?;
                Ok(BatchInsertOutcome { inserted: 0, failed: rows.len() })
            }
            Err(_) => Ok(BatchInsertOutcome { inserted: 0, failed: rows.len() }),
        }
    }

    async fn get_authed<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, FeishuError> {
        let token = self.tokens.get().await?;
        let envelope: ApiEnvelope<T> = self.http.get(url).bearer_auth(token).send().await?.json().await?;
        if envelope.code != 0 {
            return Err(FeishuError::Business { code: envelope.code, message: envelope.msg });
        }
        envelope
            .data
            .ok_or_else(|| FeishuError::Business { code: envelope.code, message: "missing data field".to_string() })
    }
}

#[async_trait]
impl TableOps for TableClient {
    async fn find_table_by_name(&self, name: &str) -> Result<Option<TableInfo>, FeishuError> {
        TableClient::find_table_by_name(self, name).await
    }

    async fn create_papers_table(&self, name: &str) -> Result<TableInfo, FeishuError> {
        TableClient::create_papers_table(self, name).await
    }

    async fn list_paper_ids(&self, table_id: &str) -> Result<HashSet<String>, FeishuError> {
        TableClient::list_paper_ids(self, table_id).await
    }

    async fn batch_insert(&self, table_id: &str, rows: &[RowFields]) -> Result<BatchInsertOutcome, FeishuError> {
        TableClient::batch_insert(self, table_id, rows).await
    }
}

fn extract_arxiv_id(fields: &Value) -> Option<String> {
    let field = fields.get("ArXiv ID")?;
    if let Some(text) = field.get("text").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    field.as_str().map(|s| s.to_string())
}

pub fn row_for(paper: &Paper, matched: &[String], required: &[String], score: f64) -> RowFields {
    RowFields::from_paper(paper, matched, required, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_arxiv_id_from_dict_form() {
        let fields = serde_json::json!({ "ArXiv ID": { "text": "2301.12345", "link": "http://x" } });
        assert_eq!(extract_arxiv_id(&fields), Some("2301.12345".to_string()));
    }

    #[test]
    fn extracts_arxiv_id_from_plain_string_form() {
        let fields = serde_json::json!({ "ArXiv ID": "2301.12345" });
        assert_eq!(extract_arxiv_id(&fields), Some("2301.12345".to_string()));
    }
}

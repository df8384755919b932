//! Token Manager (component H): obtains and caches a bearer token for
//! the remote table API, single-flight across concurrent callers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::models::FeishuCredentials;

use super::FeishuError;

const SAFETY_MARGIN: Duration = Duration::from_secs(300);
const AUTH_ENDPOINT: &str = "https://open.feishu.cn/open-apis/auth/v3/tenant_access_token/internal";

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    code: i64,
    msg: String,
    tenant_access_token: Option<String>,
    expire: Option<u64>,
}

/// Caches a bearer token with a safety margin before its declared expiry.
/// A `tokio::sync::Mutex` around the cache slot ensures at most one
/// in-flight refresh is visible to concurrent callers.
#[derive(Clone)]
pub struct TokenManager {
    http: reqwest::Client,
    credentials: FeishuCredentials,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, credentials: FeishuCredentials) -> Self {
        Self { http, credentials, cache: Arc::new(Mutex::new(None)) }
    }

    /// Returns a valid bearer token, refreshing if necessary. Never
    /// issues more than one refresh at a time across concurrent callers.
    pub async fn get(&self) -> Result<String, FeishuError> {
        if let Some(token) = &self.credentials.user_token {
            return Ok(token.clone());
        }

        let mut guard = self.cache.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        *guard = Some(fresh.clone());
        Ok(fresh.token)
    }

    pub async fn force_refresh(&self) -> Result<String, FeishuError> {
        if let Some(token) = &self.credentials.user_token {
            return Ok(token.clone());
        }
        let mut guard = self.cache.lock().await;
        let fresh = self.fetch_token().await?;
        *guard = Some(fresh.clone());
        Ok(fresh.token)
    }

    async fn fetch_token(&self) -> Result<CachedToken, FeishuError> {
        let body = serde_json::json!({
            "app_id": self.credentials.app_id,
            "app_secret": self.credentials.app_secret,
        });

        let resp: TokenResponse = self
            .http
            .post(AUTH_ENDPOINT)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if resp.code != 0 {
            return Err(FeishuError::Business { code: resp.code, message: resp.msg });
        }

        let token = resp.tenant_access_token.ok_or_else(|| {
            FeishuError::Business { code: resp.code, message: "missing tenant_access_token in response".to_string() }
        })?;
        let expire_secs = resp.expire.unwrap_or(7200);
        let ttl = Duration::from_secs(expire_secs).saturating_sub(SAFETY_MARGIN);

        Ok(CachedToken { token, expires_at: Instant::now() + ttl })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials_with_user_token() -> FeishuCredentials {
        FeishuCredentials {
            app_id: "id".to_string(),
            app_secret: "secret".to_string(),
            user_token: Some("fixed-token".to_string()),
            base_app_token: "base".to_string(),
            table_id: None,
        }
    }

    #[tokio::test]
    async fn user_token_is_used_as_is_never_refreshed() {
        let manager = TokenManager::new(reqwest::Client::new(), credentials_with_user_token());
        let token = manager.get().await.unwrap();
        assert_eq!(token, "fixed-token");
    }
}

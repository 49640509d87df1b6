// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::agent::models::{
    AgentConfig, BotStats, DownloadHistoryItem, DownloadHistoryWire, HistoryPage, NetworkConfig,
    QueueStatus, SearchHistoryItem, SearchResult, Transfer, TransferPriority,
};
use crate::errors::AgentError;

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct TransfersResponse {
    transfers: Vec<Transfer>,
}

#[derive(Deserialize)]
struct BotStatsResponse {
    bots: Vec<BotStats>,
}

/// Thin typed client over the agent's JSON API. One method per endpoint;
/// callers decide what a failure means for their state.
#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: String, request_timeout: Duration, connect_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- Search ----

    pub async fn search(
        &self,
        query: &str,
        providers: &[String],
    ) -> Result<Vec<SearchResult>, AgentError> {
        let text = self
            .execute(Method::GET, &search_path(query, providers), None)
            .await?;
        let response: SearchResponse = parse(&text)?;
        Ok(response.results)
    }

    // ---- Transfers ----

    pub async fn start_download(&self, url: &str) -> Result<(), AgentError> {
        self.execute(
            Method::POST,
            "api/download",
            Some(serde_json::json!({ "url": url })),
        )
        .await?;
        Ok(())
    }

    pub async fn transfers(&self) -> Result<Vec<Transfer>, AgentError> {
        let text = self.execute(Method::GET, "api/transfers", None).await?;
        let response: TransfersResponse = parse(&text)?;
        Ok(response.transfers)
    }

    pub async fn cancel_transfer(&self, id: &str) -> Result<(), AgentError> {
        self.execute(Method::DELETE, &format!("api/transfers/{}", id), None)
            .await?;
        Ok(())
    }

    pub async fn retry_transfer(&self, id: &str) -> Result<(), AgentError> {
        self.execute(Method::POST, &format!("api/transfers/{}/retry", id), None)
            .await?;
        Ok(())
    }

    pub async fn set_priority(
        &self,
        id: &str,
        priority: TransferPriority,
    ) -> Result<(), AgentError> {
        self.execute(
            Method::POST,
            &format!("api/transfers/{}/priority", id),
            Some(serde_json::json!({ "priority": priority.as_str() })),
        )
        .await?;
        Ok(())
    }

    // ---- Monitoring ----

    pub async fn bot_stats(&self) -> Result<Vec<BotStats>, AgentError> {
        let text = self.execute(Method::GET, "api/bots/stats", None).await?;
        let response: BotStatsResponse = parse(&text)?;
        Ok(response.bots)
    }

    pub async fn queue_status(&self) -> Result<QueueStatus, AgentError> {
        let text = self.execute(Method::GET, "api/queue", None).await?;
        parse(&text)
    }

    // ---- History ----

    pub async fn search_history(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<HistoryPage<SearchHistoryItem>, AgentError> {
        let text = self
            .execute(
                Method::GET,
                &format!("api/search-history?page={}&limit={}", page, limit),
                None,
            )
            .await?;
        parse(&text)
    }

    pub async fn delete_search_history(&self, id: i64) -> Result<(), AgentError> {
        self.execute(Method::DELETE, &format!("api/search-history/{}", id), None)
            .await?;
        Ok(())
    }

    pub async fn bulk_delete_search_history(&self, ids: &[i64]) -> Result<(), AgentError> {
        self.execute(
            Method::POST,
            "api/search-history/bulk",
            Some(serde_json::json!({ "ids": ids })),
        )
        .await?;
        Ok(())
    }

    /// Both the paginated and the legacy flat shape arrive here; callers only
    /// ever see the normalized page.
    pub async fn download_history(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<HistoryPage<DownloadHistoryItem>, AgentError> {
        let text = self
            .execute(
                Method::GET,
                &format!("api/history?page={}&limit={}", page, limit),
                None,
            )
            .await?;
        let wire: DownloadHistoryWire = parse(&text)?;
        Ok(wire.normalize())
    }

    pub async fn delete_download_history(
        &self,
        id: &str,
        delete_file: bool,
    ) -> Result<(), AgentError> {
        self.execute(
            Method::DELETE,
            &format!("api/history/{}?delete_file={}", id, delete_file),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn bulk_delete_download_history(
        &self,
        ids: &[String],
        delete_files: bool,
    ) -> Result<(), AgentError> {
        self.execute(
            Method::POST,
            "api/history/bulk",
            Some(serde_json::json!({ "ids": ids, "delete_files": delete_files })),
        )
        .await?;
        Ok(())
    }

    // ---- Settings ----

    pub async fn settings(&self) -> Result<AgentConfig, AgentError> {
        let text = self.execute(Method::GET, "api/settings", None).await?;
        parse(&text)
    }

    pub async fn save_settings(&self, config: &AgentConfig) -> Result<(), AgentError> {
        let body = serde_json::to_value(config)
            .map_err(|e| AgentError::Decode(e.to_string()))?;
        self.execute(Method::PUT, "api/settings", Some(body)).await?;
        Ok(())
    }

    pub async fn put_network(&self, name: &str, network: &NetworkConfig) -> Result<(), AgentError> {
        let body = serde_json::to_value(network)
            .map_err(|e| AgentError::Decode(e.to_string()))?;
        self.execute(
            Method::PUT,
            &format!("api/settings/networks/{}", urlencoding::encode(name)),
            Some(body),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_network(&self, name: &str) -> Result<(), AgentError> {
        self.execute(
            Method::DELETE,
            &format!("api/settings/networks/{}", urlencoding::encode(name)),
            None,
        )
        .await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, AgentError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut request = self.http.request(method, &url);
        if let Some(payload) = body {
            request = request.json(&payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AgentError::Status {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        Ok(text)
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    serde_json::from_str(text).map_err(|e| AgentError::Decode(e.to_string()))
}

fn search_path(query: &str, providers: &[String]) -> String {
    let mut path = format!("api/search?query={}", urlencoding::encode(query));
    if !providers.is_empty() {
        path.push_str("&providers=");
        path.push_str(&urlencoding::encode(&providers.join(",")));
    }
    path
}

/// Error bodies are usually `{"error": "..."}`; fall back to the raw text.
fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_encodes_query() {
        let path = search_path("big buck bunny", &[]);
        assert_eq!(path, "api/search?query=big%20buck%20bunny");
    }

    #[test]
    fn test_search_path_joins_providers() {
        let providers = vec!["SkullXDCC".to_string(), "XDCC.eu".to_string()];
        let path = search_path("iso", &providers);
        assert_eq!(path, "api/search?query=iso&providers=SkullXDCC%2CXDCC.eu");
    }

    #[test]
    fn test_extract_error_message_json_body() {
        assert_eq!(
            extract_error_message(r#"{"error": "Transfer not found"}"#),
            "Transfer not found"
        );
    }

    #[test]
    fn test_extract_error_message_plain_body() {
        assert_eq!(extract_error_message("  bad gateway \n"), "bad gateway");
    }
}

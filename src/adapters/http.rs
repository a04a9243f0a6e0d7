use crate::domain::model::PortfolioRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::{FolioError, Result};
use crate::utils::validation::is_valid_handle;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// 遠端紀錄儲存：`GET {endpoint}/{collection}/{handle}`
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    endpoint: String,
    collection: String,
    api_key: Option<String>,
    retry_attempts: u32,
    retry_delay: Duration,
}

/// 單次請求的結果，區分可重試與不可重試的失敗
enum Attempt {
    Done(Option<PortfolioRecord>),
    Retryable(FolioError),
}

impl HttpRecordStore {
    pub fn new(client: Client, endpoint: &str, collection: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            collection: collection.trim_matches('/').to_string(),
            api_key: None,
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn record_url(&self, handle: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.collection, handle)
    }

    async fn fetch_once(&self, url: &str) -> Result<Attempt> {
        // 構建請求
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        // 執行請求；連線失敗可重試
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retryable(FolioError::ApiError(e))),
        };
        tracing::debug!("📡 Record store response status: {}", response.status());

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Attempt::Done(None));
        }
        if status.is_server_error() {
            return Ok(Attempt::Retryable(FolioError::RecordStoreError {
                message: format!("Record store responded with status: {}", status),
            }));
        }
        if !status.is_success() {
            return Err(FolioError::RecordStoreError {
                message: format!("Record store request failed with status: {}", status),
            });
        }

        let body = response.bytes().await?;
        let record = serde_json::from_slice(&body).map_err(|e| FolioError::RecordStoreError {
            message: format!("Record store returned an invalid record: {}", e),
        })?;
        Ok(Attempt::Done(Some(record)))
    }
}

#[async_trait::async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch(&self, handle: &str) -> Result<Option<PortfolioRecord>> {
        if !is_valid_handle(handle) {
            return Ok(None);
        }
        let url = self.record_url(handle);
        let mut attempt = 0;

        loop {
            tracing::debug!("Fetching portfolio record from: {}", url);
            match self.fetch_once(&url).await? {
                Attempt::Done(record) => return Ok(record),
                Attempt::Retryable(error) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️  Record store request failed ({}), retry {}/{} in {:?}",
                        error,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Attempt::Retryable(error) => {
                    tracing::error!("❌ Record store unavailable after {} attempts", attempt + 1);
                    return Err(error);
                }
            }
        }
    }
}

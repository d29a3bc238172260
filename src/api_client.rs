use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::config::ApiConfig;
use crate::data::ApiResponse;

/// Longest slice of an error body kept for diagnostics
const MAX_ERROR_BODY: usize = 200;

/// What to ask the catalog for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    All,
    /// Already-trimmed, non-empty name filter
    ByName(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no characters found")]
    NotFound,

    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound)
    }
}

/// Anything that can answer a [`CatalogQuery`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, query: &CatalogQuery) -> Result<ApiResponse, CatalogError>;
}

/// [`CatalogSource`] backed by the public HTTP API
#[derive(Clone)]
pub struct HttpCatalogSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(config: &ApiConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim().to_string(),
            client,
        })
    }

    fn request(&self, query: &CatalogQuery) -> reqwest::RequestBuilder {
        match query {
            CatalogQuery::All => self.client.get(&self.endpoint),
            CatalogQuery::ByName(name) => {
                let url = format!("{}/", self.endpoint.trim_end_matches('/'));
                self.client.get(url).query(&[("name", name.as_str())])
            }
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, query: &CatalogQuery) -> Result<ApiResponse, CatalogError> {
        let response = self.request(query).send().await?;
        let status = response.status();
        debug!(target: "catalog", "GET {} -> {}", response.url(), status);

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            warn!(target: "catalog", "Catalog error status {}: {}", status, body);
            return Err(CatalogError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

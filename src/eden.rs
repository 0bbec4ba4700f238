use crate::{config::UpstreamConfig, error::UpstreamError};

pub mod data;

pub use data::{ProjectedToken, Token};

/// Tokens requested per page.
pub const PAGE_LIMIT: usize = 100;

/// Client for the Magic Eden ordinals token listing.
pub struct Client {
    req_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl Client {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        if config.api_key.is_empty() {
            tracing::warn!("No API key configured, requests are sent with an empty bearer token");
        }

        Ok(Self {
            req_client: builder.build().map_err(UpstreamError::Build)?,
            base_url: config.base_url.clone(),
            token: config.api_key.clone(),
        })
    }

    async fn request(&self, symbol: &str, offset: usize) -> Result<reqwest::Response, UpstreamError> {
        let limit = PAGE_LIMIT.to_string();
        let offset = offset.to_string();

        let resp = self
            .req_client
            .get(&self.base_url)
            .query(&[
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("sortBy", "inscriptionNumberAsc"),
                ("minPrice", "0"),
                ("maxPrice", "0"),
                ("collectionSymbol", symbol),
                ("disablePendingTransactions", "false"),
            ])
            .header("Content-Type", "application/json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Sending Request {:?}", e);
                UpstreamError::request(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Reading error body {:?}", e);
                    String::new()
                }
            };
            tracing::error!(%status, %body, "Non Success Response");
            return Err(UpstreamError::Status { status, body });
        }

        Ok(resp)
    }

    /// Loads the tokens of one page, starting at `offset`.
    #[tracing::instrument(skip(self))]
    pub async fn load_page(&self, symbol: &str, offset: usize) -> Result<Vec<Token>, UpstreamError> {
        tracing::debug!("Loading Page");

        let resp = self.request(symbol, offset).await?;

        let data: data::TokensResponse = resp.json().await.map_err(|e| {
            tracing::error!("Deserializing Response {:?}", e);
            UpstreamError::Decode(e)
        })?;

        tracing::debug!(tokens = data.tokens.len(), "Loaded Page");

        Ok(data.tokens)
    }

    /// Loads one page and hands back the upstream body as-is.
    #[tracing::instrument(skip(self))]
    pub async fn load_raw_page(
        &self,
        symbol: &str,
        offset: usize,
    ) -> Result<serde_json::Value, UpstreamError> {
        let resp = self.request(symbol, offset).await?;

        resp.json().await.map_err(|e| {
            tracing::error!("Deserializing Response {:?}", e);
            UpstreamError::Decode(e)
        })
    }
}

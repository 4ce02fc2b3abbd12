//! CoinGecko market-data provider implementation

use crate::{
    constants::{COINGECKO_API_URL, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::ProviderError,
    provider::MarketDataProvider,
    types::{PricePoint, TokenStub},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinGecko response for the trending ranking
#[derive(Debug, Deserialize)]
struct TrendingResponse {
    coins: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    market_cap_rank: Option<u32>,
}

/// One row of a `/coins/markets` listing
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    market_cap_rank: Option<u32>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

impl MarketRow {
    fn into_stub(self) -> TokenStub {
        TokenStub {
            id: self.id,
            name: self.name,
            symbol: self.symbol,
            market_cap_rank: self.market_cap_rank,
            change_24h: self.price_change_percentage_24h,
        }
    }
}

/// CoinGecko market-data provider
pub struct CoinGeckoProvider {
    client: Client,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self { client })
    }

    /// Issues a GET and decodes the JSON body, mapping 429 and other HTTP
    /// failures to the shared error taxonomy
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", COINGECKO_API_URL, path);
        log::debug!("Fetching from CoinGecko: {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ProviderError::NetworkError)?;

        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(ProviderError::NetworkError)?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko response: {}. Response: {}",
                e, response_text
            ))
        })
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new().expect("Failed to create CoinGecko provider")
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_trending(&self) -> Result<Vec<TokenStub>, ProviderError> {
        let response: TrendingResponse = self.fetch_json("/search/trending", &[]).await?;

        let stubs: Vec<TokenStub> = response
            .coins
            .into_iter()
            .map(|entry| TokenStub {
                id: entry.item.id,
                name: entry.item.name,
                symbol: entry.item.symbol,
                market_cap_rank: entry.item.market_cap_rank,
                change_24h: None,
            })
            .collect();

        log::debug!("Fetched {} trending tokens from CoinGecko", stubs.len());
        Ok(stubs)
    }

    async fn fetch_low_cap(&self, limit: usize) -> Result<Vec<TokenStub>, ProviderError> {
        let rows: Vec<MarketRow> = self
            .fetch_json(
                "/coins/markets",
                &[
                    ("vs_currency", crate::constants::VS_CURRENCY.to_string()),
                    ("order", "market_cap_asc".to_string()),
                    ("per_page", limit.to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(MarketRow::into_stub).collect())
    }

    async fn fetch_ranked_by_change(
        &self,
        universe: usize,
        vs_currency: &str,
    ) -> Result<Vec<TokenStub>, ProviderError> {
        let rows: Vec<MarketRow> = self
            .fetch_json(
                "/coins/markets",
                &[
                    ("vs_currency", vs_currency.to_string()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", universe.to_string()),
                    ("page", "1".to_string()),
                    ("price_change_percentage", "24h".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(MarketRow::into_stub).collect())
    }

    async fn fetch_prices(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, PricePoint>, ProviderError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<MarketRow> = self
            .fetch_json(
                "/coins/markets",
                &[
                    ("vs_currency", crate::constants::VS_CURRENCY.to_string()),
                    ("ids", ids.join(",")),
                    ("per_page", ids.len().max(1).to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await?;

        let mut prices = HashMap::new();
        for row in rows {
            if let Some(id) = &row.id {
                prices.insert(
                    id.clone(),
                    PricePoint {
                        price_usd: row.current_price,
                        market_cap: row.market_cap,
                    },
                );
            }
        }

        log::debug!(
            "Resolved {} of {} requested prices from CoinGecko",
            prices.len(),
            ids.len()
        );

        Ok(prices)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

//! Provider abstractions for the scanner's upstream data sources
//!
//! Three seams: ranked market data (CoinGecko), narrative summaries (OpenAI)
//! and social sentiment (Reddit, Twitter). Implementations live in the
//! `providers` module; tests inject the mocks below.

use crate::{
    error::ProviderError,
    sentiment::SentimentReading,
    types::{PricePoint, TokenStub},
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for ranked market-data sources
///
/// Each method fails by returning an error, never by fabricating data; the
/// orchestrator owns the policy for degraded responses.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the upstream trending ranking in upstream order
    async fn fetch_trending(&self) -> Result<Vec<TokenStub>, ProviderError>;

    /// Fetches the `limit` lowest-market-cap coins, ascending by market cap
    async fn fetch_low_cap(&self, limit: usize) -> Result<Vec<TokenStub>, ProviderError>;

    /// Fetches the `universe` largest coins by market cap, each stub carrying
    /// its 24h percent change
    async fn fetch_ranked_by_change(
        &self,
        universe: usize,
        vs_currency: &str,
    ) -> Result<Vec<TokenStub>, ProviderError>;

    /// Resolves USD price and market cap for a batch of ids in one request
    ///
    /// Ids the upstream does not know are simply absent from the result map.
    async fn fetch_prices(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, PricePoint>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Trait for the narrative summarizer
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Produces a short free-text narrative from the token's known fields
    async fn summarize(
        &self,
        stub: &TokenStub,
        price: &PricePoint,
    ) -> Result<String, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Trait for a single social-sentiment source
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Scores recent chatter for a query, or reports the reading unavailable
    async fn score(&self, query: &str) -> Result<SentimentReading, ProviderError>;

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;

    /// False when the source is switched off by configuration
    fn is_enabled(&self) -> bool {
        true
    }
}

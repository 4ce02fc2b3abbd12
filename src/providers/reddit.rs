//! Reddit sentiment provider implementation
//!
//! Searches recent posts site-wide for a token name and averages the VADER
//! compound score over title + body text.

use crate::{
    constants::{REDDIT_SEARCH_URL, REQUEST_TIMEOUT_SECS, SENTIMENT_SAMPLE_LIMIT, USER_AGENT},
    error::ProviderError,
    provider::SentimentProvider,
    sentiment::{mean_compound, SentimentReading},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    children: Vec<RedditPost>,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    data: RedditPostData,
}

#[derive(Debug, Deserialize)]
struct RedditPostData {
    title: Option<String>,
    selftext: Option<String>,
}

/// Reddit-backed sentiment source
pub struct RedditSentimentProvider {
    client: Client,
}

impl RedditSentimentProvider {
    /// Creates a new Reddit provider
    ///
    /// Reddit rejects requests without a descriptive user agent, so one can
    /// be supplied via `REDDIT_USER_AGENT`; otherwise the crate default is
    /// used.
    pub fn new(user_agent: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent.unwrap_or_else(|| USER_AGENT.to_string()))
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(std::env::var("REDDIT_USER_AGENT").ok())
    }
}

impl Default for RedditSentimentProvider {
    fn default() -> Self {
        Self::from_env().expect("Failed to create Reddit provider")
    }
}

#[async_trait]
impl SentimentProvider for RedditSentimentProvider {
    async fn score(&self, query: &str) -> Result<SentimentReading, ProviderError> {
        log::debug!("Searching Reddit for {:?}", query);

        let limit = SENTIMENT_SAMPLE_LIMIT.to_string();
        let response = self
            .client
            .get(REDDIT_SEARCH_URL)
            .query(&[("q", query), ("sort", "new"), ("limit", limit.as_str())])
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

        let listing: RedditListing = response
            .json()
            .await
            .map_err(ProviderError::NetworkError)?;

        let texts: Vec<String> = listing
            .data
            .children
            .into_iter()
            .map(|post| {
                format!(
                    "{} {}",
                    post.data.title.unwrap_or_default(),
                    post.data.selftext.unwrap_or_default()
                )
            })
            .collect();

        // No matching posts is a neutral observation, not a failure
        Ok(SentimentReading::Score(mean_compound(&texts)))
    }

    fn source_name(&self) -> &'static str {
        "reddit"
    }
}

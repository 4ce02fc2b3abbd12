//! Twitter sentiment provider implementation
//!
//! Searches recent tweets for a token name and averages the VADER compound
//! score over tweet text. The source is optional: without a bearer token it
//! is disabled and reports every reading as unavailable without calling out.

use crate::{
    constants::{REQUEST_TIMEOUT_SECS, SENTIMENT_SAMPLE_LIMIT, TWITTER_SEARCH_URL, USER_AGENT},
    error::ProviderError,
    provider::SentimentProvider,
    sentiment::{mean_compound, SentimentReading},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TweetSearchResponse {
    data: Option<Vec<Tweet>>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
}

/// Twitter-backed sentiment source
pub struct TwitterSentimentProvider {
    client: Client,
    bearer_token: Option<String>,
}

impl TwitterSentimentProvider {
    /// Creates a new Twitter provider; `None` disables the source
    pub fn new(bearer_token: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            bearer_token,
        })
    }

    /// Creates a provider keyed from the `TWITTER_BEARER_TOKEN` environment
    /// variable; when the variable is absent the source is disabled
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(std::env::var("TWITTER_BEARER_TOKEN").ok())
    }
}

impl Default for TwitterSentimentProvider {
    fn default() -> Self {
        Self::from_env().expect("Failed to create Twitter provider")
    }
}

#[async_trait]
impl SentimentProvider for TwitterSentimentProvider {
    async fn score(&self, query: &str) -> Result<SentimentReading, ProviderError> {
        // Disabled source: report unavailable without attempting a call
        let Some(token) = &self.bearer_token else {
            return Ok(SentimentReading::Unavailable);
        };

        log::debug!("Searching Twitter for {:?}", query);

        let max_results = SENTIMENT_SAMPLE_LIMIT.to_string();
        let response = self
            .client
            .get(TWITTER_SEARCH_URL)
            .bearer_auth(token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "text"),
            ])
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

        let search: TweetSearchResponse = response
            .json()
            .await
            .map_err(ProviderError::NetworkError)?;

        let texts: Vec<String> = search
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| tweet.text)
            .collect();

        Ok(SentimentReading::Score(mean_compound(&texts)))
    }

    fn source_name(&self) -> &'static str {
        "twitter"
    }

    fn is_enabled(&self) -> bool {
        self.bearer_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_source_is_unavailable_without_a_call() {
        let provider = TwitterSentimentProvider::new(None).unwrap();
        assert!(!provider.is_enabled());

        let reading = provider.score("bitcoin").await.unwrap();
        assert_eq!(reading, SentimentReading::Unavailable);
    }
}

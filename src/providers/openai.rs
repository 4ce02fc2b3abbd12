//! OpenAI narrative provider implementation
//!
//! Calls the Chat Completions API to produce a ~70 word analysis per token.

use crate::{
    constants::{OPENAI_API_URL, OPENAI_MODEL, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::ProviderError,
    provider::NarrativeProvider,
    types::{PricePoint, TokenRecord, TokenStub},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat Completions request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat Completions response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-backed narrative provider
pub struct OpenAiNarrativeProvider {
    client: Client,
    api_key: Option<String>,
}

impl OpenAiNarrativeProvider {
    /// Creates a new provider with an explicit API key
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self { client, api_key })
    }

    /// Creates a provider keyed from the `OPENAI_API_KEY` environment variable
    ///
    /// A missing key is not a construction error: every summarize call will
    /// fail and the pipeline substitutes its fallback narrative.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(std::env::var("OPENAI_API_KEY").ok())
    }

    /// Builds the analysis prompt from the token's known fields
    fn build_prompt(stub: &TokenStub, price: &PricePoint) -> String {
        let (id, name, symbol) = TokenRecord::display_fields(stub);
        let rank = stub
            .market_cap_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let price_usd = price
            .price_usd
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let market_cap = price
            .market_cap
            .map(|c| c.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "Provide a concise (~70 words) analysis of the following crypto token data. \
             Only refer to the price of the token or market cap in USD and not in BTC:\n\
             id: {}, name: {}, symbol: {}, market cap rank: {}, price (USD): {}, market cap (USD): {}\n\n\
             Consider factors like market cap, sentiment scores, and potential project growth. \
             Return only text without any JSON or additional formatting.",
            id, name, symbol, rank, price_usd, market_cap
        )
    }
}

impl Default for OpenAiNarrativeProvider {
    fn default() -> Self {
        Self::from_env().expect("Failed to create OpenAI provider")
    }
}

#[async_trait]
impl NarrativeProvider for OpenAiNarrativeProvider {
    async fn summarize(
        &self,
        stub: &TokenStub,
        price: &PricePoint,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::disabled("OPENAI_API_KEY not set"))?;

        let request = ChatRequest {
            model: OPENAI_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a knowledgeable crypto analyst.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(stub, price),
                },
            ],
            temperature: 0.7,
            // Roughly 70 words
            max_tokens: 100,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(api_key)
            .json(&request)
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

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(ProviderError::NetworkError)?;

        let narrative = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ProviderError::invalid_response("Chat completion returned no choices")
            })?;

        Ok(narrative)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_known_fields_and_placeholders() {
        let stub = TokenStub {
            id: Some("abc".to_string()),
            name: Some("Abc".to_string()),
            symbol: Some("ABC".to_string()),
            market_cap_rank: Some(3),
            change_24h: None,
        };
        let price = PricePoint {
            price_usd: Some(1.23),
            market_cap: None,
        };

        let prompt = OpenAiNarrativeProvider::build_prompt(&stub, &price);
        assert!(prompt.contains("name: Abc"));
        assert!(prompt.contains("market cap rank: 3"));
        assert!(prompt.contains("price (USD): 1.23"));
        assert!(prompt.contains("market cap (USD): N/A"));
    }

    #[tokio::test]
    async fn missing_api_key_errors_without_a_request() {
        let provider = OpenAiNarrativeProvider::new(None).unwrap();
        let result = provider
            .summarize(&TokenStub::default(), &PricePoint::default())
            .await;
        assert!(matches!(result, Err(ProviderError::Disabled(_))));
    }
}

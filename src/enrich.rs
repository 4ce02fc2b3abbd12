//! Enrichment pipeline: raw token stubs to canonical records
//!
//! One batched price lookup, then per-token narrative and sentiment calls.
//! Every stage degrades locally - a failed source becomes a fallback field
//! value, never an error for the caller. Per-token work runs concurrently;
//! assembly preserves the input order.

use crate::{
    constants::NARRATIVE_FALLBACK,
    provider::{MarketDataProvider, NarrativeProvider, SentimentProvider},
    sentiment::{fuse, SentimentReading},
    types::{PricePoint, TokenRecord, TokenStub},
};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns fetcher output into enriched records
pub struct Enricher {
    markets: Arc<dyn MarketDataProvider>,
    narrative: Arc<dyn NarrativeProvider>,
    reddit: Arc<dyn SentimentProvider>,
    twitter: Arc<dyn SentimentProvider>,
}

impl Enricher {
    pub fn new(
        markets: Arc<dyn MarketDataProvider>,
        narrative: Arc<dyn NarrativeProvider>,
        reddit: Arc<dyn SentimentProvider>,
        twitter: Arc<dyn SentimentProvider>,
    ) -> Self {
        Self {
            markets,
            narrative,
            reddit,
            twitter,
        }
    }

    /// Enriches a raw token list, preserving its order
    ///
    /// Empty input returns empty output without issuing any upstream calls.
    pub async fn enrich(&self, stubs: Vec<TokenStub>) -> Vec<TokenRecord> {
        if stubs.is_empty() {
            return Vec::new();
        }

        let prices = self.resolve_prices(&stubs).await;

        join_all(stubs.iter().map(|stub| {
            let price = stub
                .lookup_id()
                .and_then(|id| prices.get(id))
                .copied()
                .unwrap_or_default();
            self.enrich_one(stub, price)
        }))
        .await
    }

    /// One batched price/market-cap lookup over all non-empty ids
    ///
    /// A failed batch means every record carries N/A price fields; it does
    /// not fail the refresh.
    async fn resolve_prices(&self, stubs: &[TokenStub]) -> HashMap<String, PricePoint> {
        let ids: Vec<String> = stubs
            .iter()
            .filter_map(|stub| stub.lookup_id().map(str::to_string))
            .collect();

        if ids.is_empty() {
            return HashMap::new();
        }

        match self.markets.fetch_prices(&ids).await {
            Ok(prices) => prices,
            Err(e) => {
                tracing::warn!(error = %e, ids = ids.len(), "Batched price lookup failed");
                HashMap::new()
            }
        }
    }

    async fn enrich_one(&self, stub: &TokenStub, price: PricePoint) -> TokenRecord {
        let (id, name, symbol) = TokenRecord::display_fields(stub);

        let gpt_analysis = match self.narrative.summarize(stub, &price).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(token = %id, error = %e, "Narrative summarizer failed");
                NARRATIVE_FALLBACK.to_string()
            }
        };

        // Sentiment queries use the display name, as the social chatter does
        let reddit_sentiment = Self::score_source(self.reddit.as_ref(), &name).await;
        let twitter_sentiment = Self::score_source(self.twitter.as_ref(), &name).await;
        let sentiment_score = fuse(reddit_sentiment, twitter_sentiment);

        TokenRecord {
            id,
            name,
            symbol,
            market_cap_rank: stub.market_cap_rank,
            price_usd: price.price_usd,
            market_cap: price.market_cap,
            gpt_analysis,
            reddit_sentiment,
            twitter_sentiment,
            sentiment_score,
        }
    }

    /// A failed or throttled source yields an unavailable reading - never a
    /// zero, which would read as measured neutrality
    async fn score_source(source: &dyn SentimentProvider, query: &str) -> SentimentReading {
        match source.score(query).await {
            Ok(reading) => reading,
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(source = source.source_name(), "Sentiment source throttled");
                SentimentReading::Unavailable
            }
            Err(e) => {
                tracing::warn!(source = source.source_name(), error = %e, "Sentiment source failed");
                SentimentReading::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{MockMarketData, MockNarrative, MockSentiment};
    use std::sync::atomic::Ordering;

    fn stub(id: &str, name: &str, symbol: &str, rank: Option<u32>) -> TokenStub {
        TokenStub {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            symbol: Some(symbol.to_string()),
            market_cap_rank: rank,
            change_24h: None,
        }
    }

    struct Fixture {
        markets: Arc<MockMarketData>,
        narrative: Arc<MockNarrative>,
        reddit: Arc<MockSentiment>,
        twitter: Arc<MockSentiment>,
    }

    impl Fixture {
        fn enricher(&self) -> Enricher {
            Enricher::new(
                self.markets.clone(),
                self.narrative.clone(),
                self.reddit.clone(),
                self.twitter.clone(),
            )
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            markets: Arc::new(MockMarketData::new()),
            narrative: Arc::new(MockNarrative::returning("Solid fundamentals.")),
            reddit: Arc::new(MockSentiment::scoring("reddit", 0.4)),
            twitter: Arc::new(MockSentiment::unavailable("twitter")),
        }
    }

    #[tokio::test]
    async fn end_to_end_record_assembly() {
        let fx = fixture();
        fx.markets.set_prices(
            [(
                "abc".to_string(),
                PricePoint {
                    price_usd: Some(1.23),
                    market_cap: Some(456_789.0),
                },
            )]
            .into(),
        );

        let records = fx
            .enricher()
            .enrich(vec![stub("abc", "Abc", "ABC", Some(3))])
            .await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "abc");
        assert_eq!(record.name, "Abc");
        assert_eq!(record.symbol, "ABC");
        assert_eq!(record.market_cap_rank, Some(3));
        assert_eq!(record.price_usd, Some(1.23));
        assert_eq!(record.market_cap, Some(456_789.0));
        assert_eq!(record.gpt_analysis, "Solid fundamentals.");
        assert_eq!(record.reddit_sentiment, SentimentReading::Score(0.4));
        assert_eq!(record.twitter_sentiment, SentimentReading::Unavailable);
        assert_eq!(record.sentiment_score, SentimentReading::Score(0.4));
    }

    #[tokio::test]
    async fn empty_input_issues_no_calls() {
        let fx = fixture();
        let records = fx.enricher().enrich(Vec::new()).await;

        assert!(records.is_empty());
        assert_eq!(fx.markets.total_calls(), 0);
        assert_eq!(fx.narrative.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.reddit.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_stub_gets_placeholders_and_no_price_call() {
        let fx = fixture();
        let records = fx.enricher().enrich(vec![TokenStub::default()]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "unknown");
        assert_eq!(records[0].name, "Unknown");
        assert_eq!(records[0].symbol, "N/A");
        assert_eq!(records[0].price_usd, None);
        // No ids to look up, so no batched call went out
        assert_eq!(fx.markets.price_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn batch_price_failure_degrades_to_na_fields() {
        let fx = fixture();
        fx.markets.fail_prices();

        let records = fx
            .enricher()
            .enrich(vec![stub("abc", "Abc", "ABC", None)])
            .await;

        assert_eq!(records[0].price_usd, None);
        assert_eq!(records[0].market_cap, None);
        // The rest of the enrichment still happened
        assert_eq!(records[0].gpt_analysis, "Solid fundamentals.");
    }

    #[tokio::test]
    async fn summarizer_failure_substitutes_fallback() {
        let fx = Fixture {
            narrative: Arc::new(MockNarrative::failing()),
            ..fixture()
        };

        let records = fx
            .enricher()
            .enrich(vec![stub("abc", "Abc", "ABC", None)])
            .await;

        assert_eq!(records[0].gpt_analysis, NARRATIVE_FALLBACK);
    }

    #[tokio::test]
    async fn rate_limited_source_reads_unavailable_not_zero() {
        let fx = Fixture {
            reddit: Arc::new(MockSentiment::rate_limited("reddit")),
            twitter: Arc::new(MockSentiment::scoring("twitter", 0.0)),
            ..fixture()
        };

        let records = fx
            .enricher()
            .enrich(vec![stub("abc", "Abc", "ABC", None)])
            .await;

        assert_eq!(records[0].reddit_sentiment, SentimentReading::Unavailable);
        // The twitter zero is a real reading and survives fusion as-is
        assert_eq!(records[0].twitter_sentiment, SentimentReading::Score(0.0));
        assert_eq!(records[0].sentiment_score, SentimentReading::Score(0.0));
    }

    #[tokio::test]
    async fn both_sources_failing_fuse_to_unavailable() {
        let fx = Fixture {
            reddit: Arc::new(MockSentiment::failing("reddit")),
            twitter: Arc::new(MockSentiment::rate_limited("twitter")),
            ..fixture()
        };

        let records = fx
            .enricher()
            .enrich(vec![stub("abc", "Abc", "ABC", None)])
            .await;

        assert_eq!(records[0].sentiment_score, SentimentReading::Unavailable);
    }

    #[tokio::test]
    async fn output_order_matches_input_order() {
        let fx = fixture();
        let stubs: Vec<TokenStub> = (0..8)
            .map(|i| stub(&format!("t{}", i), &format!("T{}", i), "TKN", None))
            .collect();

        let records = fx.enricher().enrich(stubs).await;
        let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(
            ids,
            (0..8).map(|i| format!("t{}", i)).collect::<Vec<_>>()
        );
        // One batched price call for the whole list
        assert_eq!(fx.markets.price_calls.load(Ordering::SeqCst), 1);
    }
}

//! Types for the trending-token scanner

use crate::constants::{UNKNOWN_ID, UNKNOWN_NAME, UNKNOWN_SYMBOL};
use crate::sentiment::SentimentReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// The fixed set of token categories served by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Tokens from the upstream trending ranking
    Trending,
    /// Lowest-market-cap coins, served as an approximation of recent listings
    NewlyLaunched,
    /// Largest 24h percentage gains
    TopGainers,
    /// Largest 24h percentage losses
    TopLosers,
}

impl Category {
    /// Get the wire name of this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::NewlyLaunched => "newly_launched",
            Category::TopGainers => "top_gainers",
            Category::TopLosers => "top_losers",
        }
    }

    /// Get all categories in display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Trending,
            Category::NewlyLaunched,
            Category::TopGainers,
            Category::TopLosers,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw token stub as returned by a category fetcher, before enrichment
///
/// Every field is optional: upstream entries are occasionally malformed and
/// the pipeline substitutes placeholders at assembly time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStub {
    pub id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub market_cap_rank: Option<u32>,
    /// 24h percent change, only populated by the ranked-movers fetch
    pub change_24h: Option<f64>,
}

impl TokenStub {
    /// The id used for the batched price lookup, if the entry has one
    pub fn lookup_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// USD price and market cap for one token from the batched lookup
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricePoint {
    pub price_usd: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Canonical enriched token record
///
/// Serializes to the wire shape the frontend consumes: missing numerics
/// render as "N/A" and unavailable sentiment as "unknown".
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(serialize_with = "na_if_none")]
    pub market_cap_rank: Option<u32>,
    #[serde(serialize_with = "na_if_none")]
    pub price_usd: Option<f64>,
    #[serde(serialize_with = "na_if_none")]
    pub market_cap: Option<f64>,
    pub gpt_analysis: String,
    pub reddit_sentiment: SentimentReading,
    pub twitter_sentiment: SentimentReading,
    pub sentiment_score: SentimentReading,
}

impl TokenRecord {
    /// Display fields for a stub, with placeholders for malformed entries
    pub fn display_fields(stub: &TokenStub) -> (String, String, String) {
        (
            stub.id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()),
            stub.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            stub.symbol
                .clone()
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
        )
    }
}

/// Serializes `None` as the literal string "N/A"
fn na_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str("N/A"),
    }
}

/// Scanner events for the unified event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScannerEvent {
    /// A category slot was replaced with fresh records
    CategoryRefreshed {
        id: Uuid,
        category: Category,
        records: usize,
        timestamp: DateTime<Utc>,
    },

    /// A refresh attempt failed; the slot kept its previous records
    CategoryRefreshFailed {
        id: Uuid,
        category: Category,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ScannerEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            ScannerEvent::CategoryRefreshed { id, .. } => *id,
            ScannerEvent::CategoryRefreshFailed { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            ScannerEvent::CategoryRefreshed { .. } => "CATEGORY_REFRESHED",
            ScannerEvent::CategoryRefreshFailed { .. } => "CATEGORY_REFRESH_FAILED",
        }
    }
}

impl std::fmt::Display for ScannerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScannerEvent::CategoryRefreshed {
                category, records, ..
            } => {
                write!(f, "Category {} refreshed with {} records", category, records)
            }
            ScannerEvent::CategoryRefreshFailed {
                category,
                error_message,
                ..
            } => {
                write!(f, "Refresh failed for {}: {}", category, error_message)
            }
        }
    }
}

/// Overall system health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthStatus {
    /// All categories hold fresh data
    Healthy,
    /// Some categories are stale or empty but data is being served
    Degraded,
    /// No category holds any data
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        assert_eq!(Category::Trending.as_str(), "trending");
        assert_eq!(Category::NewlyLaunched.as_str(), "newly_launched");
        assert_eq!(Category::TopGainers.as_str(), "top_gainers");
        assert_eq!(Category::TopLosers.as_str(), "top_losers");
        assert_eq!(Category::all().len(), 4);
    }

    #[test]
    fn record_serializes_missing_numerics_as_na() {
        let record = TokenRecord {
            id: "abc".to_string(),
            name: "Abc".to_string(),
            symbol: "ABC".to_string(),
            market_cap_rank: None,
            price_usd: Some(1.23),
            market_cap: None,
            gpt_analysis: "Solid fundamentals.".to_string(),
            reddit_sentiment: SentimentReading::Score(0.4),
            twitter_sentiment: SentimentReading::Unavailable,
            sentiment_score: SentimentReading::Score(0.4),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["market_cap_rank"], "N/A");
        assert_eq!(value["price_usd"], 1.23);
        assert_eq!(value["market_cap"], "N/A");
        assert_eq!(value["reddit_sentiment"], 0.4);
        assert_eq!(value["twitter_sentiment"], "unknown");
        assert_eq!(value["sentiment_score"], 0.4);
    }

    #[test]
    fn display_fields_substitute_placeholders() {
        let (id, name, symbol) = TokenRecord::display_fields(&TokenStub::default());
        assert_eq!(id, "unknown");
        assert_eq!(name, "Unknown");
        assert_eq!(symbol, "N/A");
    }
}

//! # Trending Token Scanner SDK
//!
//! Aggregates per-token market data, AI-generated narratives and social
//! sentiment into four daily-refreshed category lists (trending, newly
//! launched, top gainers, top losers) served from an in-memory cache.
//!
//! Upstream sources are individually unreliable and rate limited, so every
//! stage degrades locally: a failed source becomes a fallback field or a
//! stale list, never an error for the reader.
//!
//! ## Usage
//!
//! The scanner is constructed once per process and shared with the serving
//! layer:
//!
//! ```no_run
//! use token_scanner_sdk::{Category, TokenScanner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = TokenScanner::new()?;
//!
//! // Optional warm-up so the first reader does not pay the full fan-out
//! scanner.refresh_now().await;
//!
//! // Consolidated snapshot of all four categories
//! let snapshot = scanner.get_snapshot().await;
//! for record in &snapshot[&Category::Trending] {
//!     println!("{} ({}): {}", record.name, record.symbol, record.gpt_analysis);
//! }
//! # Ok(())
//! # }
//! ```

pub mod categories;
pub mod clock;
pub mod constants;
pub mod enrich;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod sentiment;
pub mod store;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use error::ProviderError;
pub use metrics::RefreshMetrics;
pub use sentiment::{fuse, SentimentReading};
pub use tracker::TokenScanner;
pub use types::{
    Category, ComponentHealth, HealthStatus, PricePoint, ScannerEvent, TokenRecord, TokenStub,
};

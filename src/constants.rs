//! Constants for the trending-token scanner
//!
//! All configuration for the scanner is centralized here. No runtime
//! configuration file is used - the system operates with these compile-time
//! constants plus a handful of environment variables read at construction
//! (API keys and tokens, see `TokenScanner::new`).

/// How long a category cache slot stays fresh (in seconds) - one day
pub const REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// HTTP request timeout for upstream calls (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// OpenAI Chat Completions endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model used for token narratives
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Reddit public search endpoint (JSON listing)
pub const REDDIT_SEARCH_URL: &str = "https://www.reddit.com/search.json";

/// Twitter v2 recent tweet search endpoint
pub const TWITTER_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// Currency all prices and market caps are quoted in
pub const VS_CURRENCY: &str = "usd";

/// Number of lowest-market-cap coins served as the "newly launched" list
pub const LOW_CAP_LIMIT: usize = 50;

/// Size of the market-cap-ranked universe scanned for 24h movers
pub const MOVERS_UNIVERSE: usize = 250;

/// Entries kept in each of the top-gainers and top-losers lists
pub const MOVERS_LIST_LEN: usize = 20;

/// Posts/tweets sampled per sentiment query
pub const SENTIMENT_SAMPLE_LIMIT: usize = 10;

/// Narrative substituted when the summarizer call fails
pub const NARRATIVE_FALLBACK: &str = "Analysis not available.";

/// Placeholders for malformed upstream entries
pub const UNKNOWN_ID: &str = "unknown";
pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_SYMBOL: &str = "N/A";

/// User agent for HTTP requests (Reddit rejects the default reqwest one)
pub const USER_AGENT: &str = "token-scanner-sdk/0.1.0";

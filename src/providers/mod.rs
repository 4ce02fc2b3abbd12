//! Upstream provider implementations

pub mod coingecko;
pub mod openai;
pub mod reddit;
pub mod twitter;

pub use coingecko::CoinGeckoProvider;
pub use openai::OpenAiNarrativeProvider;
pub use reddit::RedditSentimentProvider;
pub use twitter::TwitterSentimentProvider;

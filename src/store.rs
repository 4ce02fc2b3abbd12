//! In-memory category cache slots
//!
//! One slot per category, created empty at startup and replaced wholesale on
//! refresh. Readers see either the previous full list or the new full list,
//! never a partially written one.

use crate::{
    constants::REFRESH_INTERVAL_SECS,
    types::{Category, TokenRecord},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Contents of one category slot
#[derive(Debug, Clone)]
pub struct CategorySlot {
    /// Enriched records in upstream ranking order
    pub records: Vec<TokenRecord>,
    /// Timestamp of the last refresh attempt (success or failure)
    pub last_refreshed: DateTime<Utc>,
}

impl CategorySlot {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            last_refreshed: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// A slot is stale when it has never been filled or its last refresh
    /// attempt is older than the refresh interval
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if self.records.is_empty() {
            return true;
        }
        let age = now.signed_duration_since(self.last_refreshed);
        age.num_seconds() >= REFRESH_INTERVAL_SECS as i64
    }
}

/// Store holding the four category slots
///
/// The slot set is fixed at construction; only slot contents change over the
/// life of the process.
pub struct SnapshotStore {
    trending: Arc<RwLock<CategorySlot>>,
    newly_launched: Arc<RwLock<CategorySlot>>,
    top_gainers: Arc<RwLock<CategorySlot>>,
    top_losers: Arc<RwLock<CategorySlot>>,
}

impl SnapshotStore {
    /// Creates the store with every category slot empty
    pub fn new() -> Self {
        Self {
            trending: Arc::new(RwLock::new(CategorySlot::empty())),
            newly_launched: Arc::new(RwLock::new(CategorySlot::empty())),
            top_gainers: Arc::new(RwLock::new(CategorySlot::empty())),
            top_losers: Arc::new(RwLock::new(CategorySlot::empty())),
        }
    }

    fn slot(&self, category: Category) -> &Arc<RwLock<CategorySlot>> {
        match category {
            Category::Trending => &self.trending,
            Category::NewlyLaunched => &self.newly_launched,
            Category::TopGainers => &self.top_gainers,
            Category::TopLosers => &self.top_losers,
        }
    }

    /// Atomically replaces a slot's records and advances its timestamp
    pub async fn replace(
        &self,
        category: Category,
        records: Vec<TokenRecord>,
        now: DateTime<Utc>,
    ) {
        let mut slot = self.slot(category).write().await;
        log::debug!(
            "Replacing {} slot: {} -> {} records",
            category,
            slot.records.len(),
            records.len()
        );
        slot.records = records;
        slot.last_refreshed = now;
    }

    /// Advances a slot's timestamp without touching its records
    ///
    /// Failure path: the previous (possibly empty) records keep serving, and
    /// the advanced timestamp keeps subsequent requests from hammering a
    /// failing upstream within the same interval.
    pub async fn touch(&self, category: Category, now: DateTime<Utc>) {
        let mut slot = self.slot(category).write().await;
        slot.last_refreshed = now;
    }

    /// Current records of one category
    pub async fn records(&self, category: Category) -> Vec<TokenRecord> {
        self.slot(category).read().await.records.clone()
    }

    /// Timestamp of the last refresh attempt for one category
    pub async fn last_refreshed(&self, category: Category) -> DateTime<Utc> {
        self.slot(category).read().await.last_refreshed
    }

    /// Whether a category needs a refresh at time `now`
    pub async fn is_stale(&self, category: Category, now: DateTime<Utc>) -> bool {
        self.slot(category).read().await.is_stale(now)
    }

    /// All four categories as one mapping
    pub async fn snapshot(&self) -> HashMap<Category, Vec<TokenRecord>> {
        let mut result = HashMap::new();
        for category in Category::all() {
            result.insert(*category, self.records(*category).await);
        }
        result
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentReading;
    use chrono::Duration;

    fn record(id: &str) -> TokenRecord {
        TokenRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            symbol: id.to_uppercase(),
            market_cap_rank: None,
            price_usd: None,
            market_cap: None,
            gpt_analysis: "n/a".to_string(),
            reddit_sentiment: SentimentReading::Unavailable,
            twitter_sentiment: SentimentReading::Unavailable,
            sentiment_score: SentimentReading::Unavailable,
        }
    }

    #[tokio::test]
    async fn slots_start_empty_and_stale() {
        let store = SnapshotStore::new();
        let now = Utc::now();

        for category in Category::all() {
            assert!(store.records(*category).await.is_empty());
            assert!(store.is_stale(*category, now).await);
            assert_eq!(
                store.last_refreshed(*category).await,
                DateTime::<Utc>::UNIX_EPOCH
            );
        }
    }

    #[tokio::test]
    async fn replace_swaps_whole_list_and_freshens() {
        let store = SnapshotStore::new();
        let now = Utc::now();

        store
            .replace(Category::Trending, vec![record("a"), record("b")], now)
            .await;

        assert_eq!(store.records(Category::Trending).await.len(), 2);
        assert!(!store.is_stale(Category::Trending, now).await);
        // Fresh only within the interval
        let later = now + Duration::seconds(REFRESH_INTERVAL_SECS as i64);
        assert!(store.is_stale(Category::Trending, later).await);
        // Other categories untouched
        assert!(store.records(Category::TopGainers).await.is_empty());
    }

    #[tokio::test]
    async fn touch_advances_timestamp_but_keeps_records() {
        let store = SnapshotStore::new();
        let now = Utc::now();

        store
            .replace(Category::TopLosers, vec![record("x")], now)
            .await;
        let later = now + Duration::hours(1);
        store.touch(Category::TopLosers, later).await;

        let records = store.records(Category::TopLosers).await;
        assert_eq!(records.len(), 1);
        assert_eq!(store.last_refreshed(Category::TopLosers).await, later);
    }

    #[tokio::test]
    async fn empty_slot_with_fresh_timestamp_is_still_stale() {
        let store = SnapshotStore::new();
        let now = Utc::now();

        store.touch(Category::Trending, now).await;
        assert!(store.is_stale(Category::Trending, now).await);
    }

    #[tokio::test]
    async fn snapshot_returns_every_category() {
        let store = SnapshotStore::new();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 4);
        for category in Category::all() {
            assert!(snapshot.contains_key(category));
        }
    }
}

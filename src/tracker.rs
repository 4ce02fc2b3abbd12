//! Token scanner service
//!
//! The orchestrator over the category cache: decides per category whether
//! the cached records are still fresh, fans out to the upstream sources when
//! they are not, and serves the consolidated snapshot. Readers block on a
//! stale category's refresh but never observe a half-built list.

use crate::{
    categories,
    clock::{Clock, SystemClock},
    enrich::Enricher,
    error::ProviderError,
    metrics::{MetricsCollector, RefreshMetrics},
    provider::{MarketDataProvider, NarrativeProvider, SentimentProvider},
    providers::{
        CoinGeckoProvider, OpenAiNarrativeProvider, RedditSentimentProvider,
        TwitterSentimentProvider,
    },
    store::SnapshotStore,
    types::{Category, ComponentHealth, HealthStatus, ScannerEvent, TokenRecord, TokenStub},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

/// Capacity of the refresh-event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Refresh unit: gainers and losers come from one upstream call, so they
/// refresh (and go stale) together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshGroup {
    Trending,
    NewlyLaunched,
    Movers,
}

impl RefreshGroup {
    fn all() -> [RefreshGroup; 3] {
        [
            RefreshGroup::Trending,
            RefreshGroup::NewlyLaunched,
            RefreshGroup::Movers,
        ]
    }

    fn categories(&self) -> &'static [Category] {
        match self {
            RefreshGroup::Trending => &[Category::Trending],
            RefreshGroup::NewlyLaunched => &[Category::NewlyLaunched],
            RefreshGroup::Movers => &[Category::TopGainers, Category::TopLosers],
        }
    }
}

/// One mutex per refresh group: at most one in-flight refresh per group, and
/// a request that finds the lock held waits for that refresh and reuses its
/// result instead of fanning out a duplicate
struct RefreshLocks {
    trending: Mutex<()>,
    newly_launched: Mutex<()>,
    movers: Mutex<()>,
}

impl RefreshLocks {
    fn new() -> Self {
        Self {
            trending: Mutex::new(()),
            newly_launched: Mutex::new(()),
            movers: Mutex::new(()),
        }
    }

    fn for_group(&self, group: RefreshGroup) -> &Mutex<()> {
        match group {
            RefreshGroup::Trending => &self.trending,
            RefreshGroup::NewlyLaunched => &self.newly_launched,
            RefreshGroup::Movers => &self.movers,
        }
    }
}

/// Trending-token scanner
///
/// Constructed once per process and shared; holds the only mutable state in
/// the system (the category cache slots).
///
/// # Example
/// ```no_run
/// use token_scanner_sdk::TokenScanner;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let scanner = TokenScanner::new()?;
/// let snapshot = scanner.get_snapshot().await;
/// for (category, records) in snapshot {
///     println!("{}: {} tokens", category, records.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct TokenScanner {
    store: SnapshotStore,
    markets: Arc<dyn MarketDataProvider>,
    enricher: Enricher,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsCollector>,
    events: broadcast::Sender<ScannerEvent>,
    locks: RefreshLocks,
}

impl TokenScanner {
    /// Creates a scanner wired to the real upstream providers
    ///
    /// Reads `OPENAI_API_KEY`, `TWITTER_BEARER_TOKEN` and `REDDIT_USER_AGENT`
    /// from the environment; a missing twitter token disables that source.
    pub fn new() -> Result<Self, ProviderError> {
        let markets = Arc::new(CoinGeckoProvider::new()?);
        let narrative = Arc::new(OpenAiNarrativeProvider::from_env()?);
        let reddit = Arc::new(RedditSentimentProvider::from_env()?);
        let twitter = Arc::new(TwitterSentimentProvider::from_env()?);

        Ok(Self::with_components(
            markets,
            narrative,
            reddit,
            twitter,
            Arc::new(SystemClock),
        ))
    }

    /// Creates a scanner with injected components
    ///
    /// This is the seam tests use: mock providers and a manual clock.
    pub fn with_components(
        markets: Arc<dyn MarketDataProvider>,
        narrative: Arc<dyn NarrativeProvider>,
        reddit: Arc<dyn SentimentProvider>,
        twitter: Arc<dyn SentimentProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metrics = Arc::new(MetricsCollector::new(markets.provider_name()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let enricher = Enricher::new(markets.clone(), narrative, reddit, twitter);

        Self {
            store: SnapshotStore::new(),
            markets,
            enricher,
            clock,
            metrics,
            events,
            locks: RefreshLocks::new(),
        }
    }

    /// Returns the consolidated snapshot of all four categories, refreshing
    /// any stale one first
    ///
    /// Never fails: a category whose refresh failed serves its previous
    /// (possibly empty) records.
    pub async fn get_snapshot(&self) -> HashMap<Category, Vec<TokenRecord>> {
        for group in RefreshGroup::all() {
            self.ensure_fresh(group).await;
        }
        self.store.snapshot().await
    }

    /// Forces a refresh of every category regardless of staleness
    ///
    /// Serving processes call this once at startup so the first reader does
    /// not pay the full fan-out.
    pub async fn refresh_now(&self) {
        for group in RefreshGroup::all() {
            let _guard = self.locks.for_group(group).lock().await;
            self.refresh_group(group).await;
        }
    }

    /// Subscribes to refresh events
    pub fn subscribe(&self) -> broadcast::Receiver<ScannerEvent> {
        self.events.subscribe()
    }

    /// Returns the name of the market-data provider
    pub fn provider_name(&self) -> &'static str {
        self.markets.provider_name()
    }

    /// Refresh latency percentiles and success rate
    pub async fn get_metrics(&self) -> RefreshMetrics {
        self.metrics.get_metrics().await
    }

    async fn ensure_fresh(&self, group: RefreshGroup) {
        if !self.group_stale(group).await {
            return;
        }

        let _guard = self.locks.for_group(group).lock().await;

        // Re-check: the refresh we waited on may have done the work
        if !self.group_stale(group).await {
            return;
        }

        self.refresh_group(group).await;
    }

    async fn group_stale(&self, group: RefreshGroup) -> bool {
        let now = self.clock.now();
        for category in group.categories() {
            if self.store.is_stale(*category, now).await {
                return true;
            }
        }
        false
    }

    async fn refresh_group(&self, group: RefreshGroup) {
        let start = Instant::now();
        let success = match group {
            RefreshGroup::Trending => {
                let fetched = categories::fetch_trending_list(self.markets.as_ref()).await;
                self.apply_refresh(Category::Trending, fetched).await
            }
            RefreshGroup::NewlyLaunched => {
                let fetched = categories::fetch_newly_launched(self.markets.as_ref()).await;
                self.apply_refresh(Category::NewlyLaunched, fetched).await
            }
            RefreshGroup::Movers => self.refresh_movers().await,
        };
        self.metrics.record_refresh(start.elapsed(), success).await;
    }

    /// Publishes a fetch result into one category slot
    ///
    /// On failure the slot keeps its previous records and only the timestamp
    /// advances: serving stale data beats hammering a failing upstream on
    /// every request for the rest of the interval.
    async fn apply_refresh(
        &self,
        category: Category,
        fetched: Result<Vec<TokenStub>, ProviderError>,
    ) -> bool {
        match fetched {
            Ok(stubs) => {
                let records = self.enricher.enrich(stubs).await;
                self.publish(category, records).await;
                true
            }
            Err(e) => {
                self.mark_failed(category, &e).await;
                false
            }
        }
    }

    /// Refreshes gainers and losers from one upstream ranking call; both
    /// slots and both timestamps move together
    async fn refresh_movers(&self) -> bool {
        match categories::fetch_movers(self.markets.as_ref()).await {
            Ok((gainers, losers)) => {
                let gainer_records = self.enricher.enrich(gainers).await;
                let loser_records = self.enricher.enrich(losers).await;
                self.publish(Category::TopGainers, gainer_records).await;
                self.publish(Category::TopLosers, loser_records).await;
                true
            }
            Err(e) => {
                self.mark_failed(Category::TopGainers, &e).await;
                self.mark_failed(Category::TopLosers, &e).await;
                false
            }
        }
    }

    async fn publish(&self, category: Category, records: Vec<TokenRecord>) {
        let now = self.clock.now();
        let count = records.len();
        self.store.replace(category, records, now).await;

        tracing::info!(category = %category, records = count, "Category refreshed");
        let _ = self.events.send(ScannerEvent::CategoryRefreshed {
            id: Uuid::new_v4(),
            category,
            records: count,
            timestamp: now,
        });
    }

    async fn mark_failed(&self, category: Category, error: &ProviderError) {
        let now = self.clock.now();
        self.store.touch(category, now).await;

        tracing::warn!(
            category = %category,
            error = %error,
            "Refresh failed; keeping previous records"
        );
        let _ = self.events.send(ScannerEvent::CategoryRefreshFailed {
            id: Uuid::new_v4(),
            category,
            error_message: error.to_string(),
            timestamp: now,
        });
    }

    /// Perform a health check on the scanner
    pub async fn health_check(&self) -> ComponentHealth {
        let now = self.clock.now();
        let mut details = std::collections::HashMap::new();

        let mut record_counts = std::collections::HashMap::new();
        let mut stale_categories = Vec::new();
        let mut total_records = 0;
        for category in Category::all() {
            let count = self.store.records(*category).await.len();
            total_records += count;
            record_counts.insert(category.as_str().to_string(), count);
            if self.store.is_stale(*category, now).await {
                stale_categories.push(category.as_str().to_string());
            }
        }

        details.insert(
            "record_counts".to_string(),
            serde_json::json!(record_counts),
        );
        details.insert(
            "stale_categories".to_string(),
            serde_json::json!(stale_categories),
        );
        details.insert(
            "provider_name".to_string(),
            serde_json::json!(self.provider_name()),
        );

        let status = if total_records == 0 {
            HealthStatus::Unhealthy
        } else if !stale_categories.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let message = match status {
            HealthStatus::Healthy => "All categories hold fresh data".to_string(),
            HealthStatus::Degraded => {
                format!("{} categories are stale or empty", stale_categories.len())
            }
            HealthStatus::Unhealthy => "No category holds any data".to_string(),
        };

        ComponentHealth {
            name: "token_scanner".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: now,
        }
    }
}

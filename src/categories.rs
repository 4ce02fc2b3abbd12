//! Per-category selection policies over the ranked market-data source
//!
//! Each fetcher turns one upstream listing into the raw ordered token list
//! for a category. Ordering is part of the contract: it is what the cache
//! stores and what readers ultimately see.

use crate::{
    constants::{LOW_CAP_LIMIT, MOVERS_LIST_LEN, MOVERS_UNIVERSE, VS_CURRENCY},
    error::ProviderError,
    provider::MarketDataProvider,
    types::TokenStub,
};

/// Trending ranking, upstream order, no truncation
pub async fn fetch_trending_list(
    markets: &dyn MarketDataProvider,
) -> Result<Vec<TokenStub>, ProviderError> {
    markets.fetch_trending().await
}

/// "Newly launched" approximation: the 50 lowest-market-cap coins, ascending
/// by market cap.
///
/// There is no upstream recently-listed endpoint; low market cap stands in
/// for listing age. A known misnomer, kept as-is.
pub async fn fetch_newly_launched(
    markets: &dyn MarketDataProvider,
) -> Result<Vec<TokenStub>, ProviderError> {
    let mut stubs = markets.fetch_low_cap(LOW_CAP_LIMIT).await?;
    stubs.truncate(LOW_CAP_LIMIT);
    Ok(stubs)
}

/// Top gainers and top losers from one ranked call over the 250 largest
/// coins.
///
/// The universe is sorted descending by 24h percent change. Gainers are the
/// first 20 (strongest gain first). Losers are the last 20 kept in slice
/// order, which presents the mildest loser first and the worst loser last -
/// the opposite extremity placement from the gainers list, and intentional.
/// Entries with no reported 24h change cannot be ranked and are dropped.
pub async fn fetch_movers(
    markets: &dyn MarketDataProvider,
) -> Result<(Vec<TokenStub>, Vec<TokenStub>), ProviderError> {
    let mut ranked = markets
        .fetch_ranked_by_change(MOVERS_UNIVERSE, VS_CURRENCY)
        .await?;

    ranked.retain(|stub| stub.change_24h.is_some());
    ranked.sort_by(|a, b| {
        b.change_24h
            .unwrap_or(0.0)
            .total_cmp(&a.change_24h.unwrap_or(0.0))
    });

    let gainers: Vec<TokenStub> = ranked.iter().take(MOVERS_LIST_LEN).cloned().collect();
    let losers: Vec<TokenStub> = ranked
        .iter()
        .skip(ranked.len().saturating_sub(MOVERS_LIST_LEN))
        .cloned()
        .collect();

    Ok((gainers, losers))
}

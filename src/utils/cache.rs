use crate::utils::amount::CurrencyAmount;
use crate::utils::token::Currency;
use alloy_primitives::Address;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct CacheItem<T> {
    pub data: T,
    pub timestamp: Instant,
    pub ttl: Duration,
}

impl<T> CacheItem<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self { data, timestamp: Instant::now(), ttl }
    }

    pub fn is_expired(&self) -> bool {
        self.timestamp.elapsed() > self.ttl
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 { 0.0 } else { hits as f64 / total as f64 }
    }
}

/// Wallet balances keyed by (account, currency), each entry living for `default_ttl`.
#[derive(Debug)]
pub struct BalanceCache {
    balances: DashMap<(Address, Currency), CacheItem<CurrencyAmount>>,
    pub stats: CacheStats,
    default_ttl: Duration,
}

impl BalanceCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self { balances: DashMap::new(), stats: CacheStats::default(), default_ttl }
    }

    /// One block's worth of freshness.
    pub fn new_default() -> Self {
        Self::new(Duration::from_secs(12))
    }

    pub fn get_balance(&self, account: Address, currency: &Currency) -> Option<CurrencyAmount> {
        let key = (account, currency.clone());
        let cached = self.balances.get(&key).map(|item| (item.is_expired(), item.data.clone()));
        match cached {
            Some((false, balance)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(balance);
            }
            Some((true, _)) => {
                self.balances.remove(&key);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set_balance(&self, account: Address, balance: CurrencyAmount) {
        let key = (account, balance.currency().clone());
        self.balances.insert(key, CacheItem::new(balance, self.default_ttl));
    }

    /// Drops every cached balance of `account`, e.g. after a swap settled.
    pub fn invalidate_account(&self, account: Address) {
        self.balances.retain(|(cached_account, _), _| *cached_account != account);
    }

    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.balances.retain(|_, item| {
            let expired = now.duration_since(item.timestamp) > item.ttl;
            if expired {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
            !expired
        });
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn clear_all(&self) {
        self.balances.clear();
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new_default()
    }
}

//! Month-keyed stale-while-revalidate cache used by [`PlanningClient`].

pub mod client;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::MonthKey;

pub use client::PlanningClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub budget_account_id: Uuid,
    pub period: MonthKey,
}

impl CacheKey {
    pub fn new(budget_account_id: Uuid, period: MonthKey) -> Self {
        Self {
            budget_account_id,
            period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    Fresh(V),
    /// Served as-is; the caller is expected to revalidate.
    Stale(V),
    Miss,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
}

pub struct PlanningCache<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    stale_after: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> PlanningCache<V> {
    pub fn new(stale_after: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stale_after: Duration::from_std(stale_after).unwrap_or_else(|_| Duration::days(36_500)),
            clock,
        }
    }

    pub fn lookup(&self, key: &CacheKey) -> CacheLookup<V> {
        match self.entries.get(key) {
            None => CacheLookup::Miss,
            Some(entry) if self.clock.now() - entry.fetched_at >= self.stale_after => {
                CacheLookup::Stale(entry.value.clone())
            }
            Some(entry) => CacheLookup::Fresh(entry.value.clone()),
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: self.clock.now(),
            },
        );
    }

    /// Drops the entry for `key`, returning whether one existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! In-memory memo cache for fetched series.
//!
//! Keyed by the full request: ticker, window, retry count and base delay.
//! Retention is unbounded for the life of the cache object. Scan universes
//! are a handful of tickers, and the point is to never hit the provider twice
//! for the same request within one process.

use crate::domain::PriceSeries;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Parameters identifying one fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub ticker: String,
    pub window_days: u32,
    pub max_retries: u32,
    pub base_delay: Duration,
}

/// Unbounded, process-lifetime cache of successful fetches.
///
/// Failures are never cached. The mutex keeps the cache `Sync`; the scan
/// itself only touches it from one thread.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: Mutex<HashMap<FetchKey, Arc<PriceSeries>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FetchKey) -> Option<Arc<PriceSeries>> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: FetchKey, series: Arc<PriceSeries>) {
        self.lock().insert(key, series);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<FetchKey, Arc<PriceSeries>>> {
        // A poisoned map is still a valid map: every insert is a single call.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

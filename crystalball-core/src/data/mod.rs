//! Data acquisition: provider trait, Yahoo adapter, memo cache, and retrying fetcher.

pub mod cache;
pub mod fetcher;
pub mod provider;
pub mod yahoo;

pub use cache::{FetchCache, FetchKey};
pub use fetcher::{backoff_delay, Backoff, FetchError, SeriesFetcher, ThreadSleep};
pub use provider::{DataError, DataProvider};
pub use yahoo::YahooProvider;

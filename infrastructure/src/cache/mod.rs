//! File-backed response and role-detection cache

mod file_cache;

pub use file_cache::{CacheEntry, CacheListing, CacheStats, FileCache};

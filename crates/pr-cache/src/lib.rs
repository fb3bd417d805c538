//! Bounded in-memory cache for analysis results
//!
//! The cache is an explicit value owned by its caller, usually shared as
//! `Arc<Mutex<LruCache<V>>>`. There is no process-wide instance.
//!
//! Keys are plain strings. Analysis results are keyed as
//! `{owner}/{repo}:{number}:{head_sha}`, which lets
//! [`LruCache::invalidate_prefix_except`] drop results for older commits of
//! the same pull request.

mod lru;

pub use lru::{CacheStats, LruCache};

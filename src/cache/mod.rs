// Cache module for upstream responses.
// A single on-disk JSON document with per-entry expiry.

pub mod key;
pub mod store;

pub use key::{RequestKind, cache_key};
pub use store::{CachedData, DEFAULT_TTL, ResponseCache, read_text, write_text};

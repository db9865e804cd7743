//! Read cache for the API client.
//!
//! Successful `GET` payloads are kept for a freshness window (five minutes
//! by default) and bounded to a fixed number of keys (fifty by default).
//! When the bound is exceeded the oldest-inserted key is dropped, regardless
//! of how recently it was read.
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! capacity = 50
//! ```

mod clock;
mod config;
mod keys;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::CacheKey;
pub use store::ResponseCache;

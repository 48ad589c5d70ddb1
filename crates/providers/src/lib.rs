//! Enhancement provider adapters
//!
//! Backends that execute enhancement tools, plus the router that binds
//! tools to backends and the shared plumbing they use:
//! - `skylab` / `staged` - remote rendering APIs (by-reference and inline)
//! - `local` - in-process pixel operations
//! - `router` - tool-to-backend resolution with cost estimates
//! - `rate_limit` - minimum-interval pacing for remote calls
//! - `store` - filesystem and in-memory image stores

pub mod http_client;
pub mod local;
pub mod rate_limit;
pub mod router;
pub mod skylab;
pub mod staged;
pub mod store;
pub mod types;

// ── Backends ──
pub use local::LocalPixelProvider;
pub use skylab::{SkylabConfig, SkylabProvider};
pub use staged::{StagedConfig, StagedProvider};

// ── Routing and pacing ──
pub use rate_limit::RateLimiter;
pub use router::ProviderRouter;
pub use types::{parse_http_error, parse_retry_after, ProviderId, Route};

// ── Stores ──
pub use store::{FsImageStore, MemoryImageStore};

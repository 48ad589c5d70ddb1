//! Provider Types
//!
//! Provider identities, routing decisions, and the shared HTTP error
//! mapping used by all remote adapters.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use listinglens_core::{EnhancementProvider, ProviderError};

/// Closed set of execution backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Remote exterior/lighting backend (sky, twilight, lawn, pool, HDR)
    Skylab,
    /// Remote inpainting/staging backend (virtual staging, declutter)
    Staged,
    /// In-process pixel operations (color, perspective, HDR fallback)
    Local,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Skylab => "skylab",
            ProviderId::Staged => "staged",
            ProviderId::Local => "local",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved route for one tool: the backend to call plus the estimates
/// the planner and cost accounting use.
#[derive(Clone)]
pub struct Route {
    pub provider_id: ProviderId,
    pub provider: Arc<dyn EnhancementProvider>,
    pub estimated_cost_cents: u32,
    pub estimated_duration: Duration,
}

/// Map an HTTP failure status to a typed provider error.
///
/// `retry_after` is the parsed Retry-After header, when the response
/// carried one.
pub fn parse_http_error(
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
    provider: &str,
) -> ProviderError {
    match status {
        401 | 403 => ProviderError::auth(format!("{}: {}", provider, body)),
        400 | 404 | 413 | 415 | 422 => {
            ProviderError::invalid_input(format!("{}: {}", provider, body))
        }
        429 => ProviderError::RateLimited {
            message: format!("{}: {}", provider, body),
            retry_after,
        },
        500..=599 => ProviderError::unavailable(format!("{}: HTTP {}: {}", provider, status, body)),
        _ => ProviderError::network(format!("{}: HTTP {}: {}", provider, status, body)),
    }
}

/// Parse a Retry-After header value given in whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

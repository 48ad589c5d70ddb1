//! Provider Router
//!
//! Maps each tool to its execution backend and exposes the cost/time
//! estimates shared by the planner and the executor. Pure lookup - the
//! router never makes network calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use listinglens_core::{CoreResult, EnhancementProvider, PipelineError, ToolId};

use crate::types::{ProviderId, Route};

/// Static tool-to-backend routing with a small set of override rules.
pub struct ProviderRouter {
    providers: HashMap<ProviderId, Arc<dyn EnhancementProvider>>,
    /// When set, polish-group tools that the remote backend also offers
    /// (HDR) are routed to the local provider instead.
    prefer_local_polish: bool,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            prefer_local_polish: false,
        }
    }

    /// Route HDR to the local provider rather than the remote premium path.
    pub fn with_prefer_local_polish(mut self, prefer: bool) -> Self {
        self.prefer_local_polish = prefer;
        self
    }

    /// Register a backend under its identity.
    pub fn register(&mut self, id: ProviderId, provider: Arc<dyn EnhancementProvider>) {
        self.providers.insert(id, provider);
    }

    /// The backend identity a tool routes to, after override rules.
    pub fn route_for(&self, tool: ToolId) -> ProviderId {
        match tool {
            ToolId::SkyReplacement
            | ToolId::TwilightConversion
            | ToolId::LawnRepair
            | ToolId::PoolEnhancement => ProviderId::Skylab,
            ToolId::HdrBoost => {
                if self.prefer_local_polish {
                    ProviderId::Local
                } else {
                    ProviderId::Skylab
                }
            }
            ToolId::VirtualStaging | ToolId::Declutter => ProviderId::Staged,
            ToolId::PerspectiveCorrection | ToolId::ColorBalance => ProviderId::Local,
        }
    }

    /// Cost/time estimates per tool, in cents and wall-clock seconds.
    ///
    /// Local tools are free; remote generative tools are priced by how much
    /// rendering they trigger.
    pub fn estimate(&self, tool: ToolId) -> (u32, Duration) {
        match self.route_for(tool) {
            ProviderId::Local => (0, Duration::from_secs(2)),
            ProviderId::Skylab | ProviderId::Staged => match tool {
                ToolId::VirtualStaging => (150, Duration::from_secs(90)),
                ToolId::TwilightConversion => (100, Duration::from_secs(75)),
                ToolId::SkyReplacement => (60, Duration::from_secs(45)),
                ToolId::Declutter => (60, Duration::from_secs(60)),
                ToolId::LawnRepair => (40, Duration::from_secs(40)),
                ToolId::PoolEnhancement => (40, Duration::from_secs(40)),
                ToolId::HdrBoost => (20, Duration::from_secs(30)),
                ToolId::PerspectiveCorrection | ToolId::ColorBalance => {
                    (10, Duration::from_secs(20))
                }
            },
        }
    }

    /// Resolve a tool to its registered backend plus estimates.
    pub fn resolve(&self, tool: ToolId) -> CoreResult<Route> {
        let provider_id = self.route_for(tool);
        let provider = self.providers.get(&provider_id).cloned().ok_or_else(|| {
            PipelineError::internal(format!(
                "no provider registered for {} (tool {})",
                provider_id, tool
            ))
        })?;
        let (estimated_cost_cents, estimated_duration) = self.estimate(tool);
        Ok(Route {
            provider_id,
            provider,
            estimated_cost_cents,
            estimated_duration,
        })
    }
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use listinglens_core::{InvokeRequest, ProviderResult, ALL_TOOLS};

    struct StubProvider(&'static str);

    #[async_trait]
    impl EnhancementProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.0
        }
        fn supports(&self, _tool: ToolId) -> bool {
            true
        }
        async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String> {
            Ok(request.image_ref)
        }
        async fn health_check(&self) -> ProviderResult<()> {
            Ok(())
        }
    }

    fn full_router() -> ProviderRouter {
        let mut router = ProviderRouter::new();
        router.register(ProviderId::Skylab, Arc::new(StubProvider("skylab")));
        router.register(ProviderId::Staged, Arc::new(StubProvider("staged")));
        router.register(ProviderId::Local, Arc::new(StubProvider("local")));
        router
    }

    #[test]
    fn test_static_routes() {
        let router = full_router();
        assert_eq!(router.route_for(ToolId::SkyReplacement), ProviderId::Skylab);
        assert_eq!(router.route_for(ToolId::VirtualStaging), ProviderId::Staged);
        assert_eq!(router.route_for(ToolId::ColorBalance), ProviderId::Local);
        assert_eq!(router.route_for(ToolId::HdrBoost), ProviderId::Skylab);
    }

    #[test]
    fn test_prefer_local_polish_override() {
        let router = full_router().with_prefer_local_polish(true);
        assert_eq!(router.route_for(ToolId::HdrBoost), ProviderId::Local);
        // Only polish is overridden; content tools stay remote
        assert_eq!(router.route_for(ToolId::SkyReplacement), ProviderId::Skylab);
    }

    #[test]
    fn test_every_tool_resolves() {
        let router = full_router();
        for tool in ALL_TOOLS {
            assert!(router.resolve(tool).is_ok(), "tool {} did not resolve", tool);
        }
    }

    #[test]
    fn test_unregistered_backend_errors() {
        let router = ProviderRouter::new();
        assert!(matches!(
            router.resolve(ToolId::SkyReplacement),
            Err(PipelineError::Internal(_))
        ));
    }

    #[test]
    fn test_local_tools_are_free() {
        let router = full_router();
        let (cost, _) = router.estimate(ToolId::ColorBalance);
        assert_eq!(cost, 0);
        let (cost, _) = router.estimate(ToolId::VirtualStaging);
        assert!(cost > 0);
    }
}

//! # Component Graph & Capability Extraction
//!
//! The graph is an explicit capability registry: modules declare, at
//! configure time, which capability roles their instances satisfy. There is
//! no reflection and no ambient lookup; extraction filters the recorded
//! bindings by role, preserving binding-enumeration order end-to-end so the
//! start order downstream is deterministic.

use std::fmt;
use std::sync::Arc;

use crate::bootstrap::Environment;
use crate::error::BootstrapError;
use crate::service::Service;

/// Capability roles a bound instance can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityRole {
    /// A network-facing component handed to the transport registrar.
    NetworkFacing,
    /// A lifecycle-managed service owned by the orchestrator.
    Lifecycle,
}

/// A network-facing component. Its wire behavior is owned by the transport
/// server; the graph only carries it from binding to registration.
pub trait NetworkHandler: Send + Sync {
    /// Endpoint name the transport server mounts this handler under.
    fn endpoint(&self) -> &str;
}

/// The registration entry point of the transport server, consumed exactly
/// once per bootstrap with the full extracted handler list.
pub trait TransportRegistrar: Send + Sync {
    /// Hand the complete list of network handlers to the transport server.
    fn register_services(&self, handlers: Vec<Arc<dyn NetworkHandler>>);
}

/// A single capability binding contributed by a module.
#[derive(Clone)]
pub enum Binding {
    /// A network-facing component.
    Network(Arc<dyn NetworkHandler>),
    /// A named lifecycle-managed service.
    Lifecycle {
        /// Binding name, used in logs and error context.
        name: String,
        /// The bound service instance.
        service: Arc<dyn Service>,
    },
}

impl Binding {
    /// The capability role this binding satisfies.
    #[must_use]
    pub fn role(&self) -> CapabilityRole {
        match self {
            Binding::Network(_) => CapabilityRole::NetworkFacing,
            Binding::Lifecycle { .. } => CapabilityRole::Lifecycle,
        }
    }
}

/// Mutable binding surface handed to each module's `configure`.
pub struct GraphBuilder {
    env: Environment,
    bindings: Vec<Binding>,
    transport: Option<Arc<dyn TransportRegistrar>>,
}

impl GraphBuilder {
    /// Create a builder over the shared environment.
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            bindings: Vec::new(),
            transport: None,
        }
    }

    /// The shared environment modules construct components against.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Bind a network-facing component.
    pub fn bind_network(&mut self, handler: Arc<dyn NetworkHandler>) {
        self.bindings.push(Binding::Network(handler));
    }

    /// Bind a named lifecycle-managed service.
    pub fn bind_lifecycle(&mut self, name: impl Into<String>, service: Arc<dyn Service>) {
        self.bindings.push(Binding::Lifecycle {
            name: name.into(),
            service,
        });
    }

    /// Claim the transport registrar slot. At most one module may do this.
    pub fn set_transport(
        &mut self,
        registrar: Arc<dyn TransportRegistrar>,
    ) -> Result<(), BootstrapError> {
        if self.transport.is_some() {
            return Err(BootstrapError::TransportAlreadyBound);
        }
        self.transport = Some(registrar);
        Ok(())
    }

    /// Freeze the builder into an immutable graph.
    #[must_use]
    pub fn build(self) -> ComponentGraph {
        ComponentGraph {
            bindings: self.bindings,
            transport: self.transport,
        }
    }
}

/// The resolved, immutable component graph.
///
/// Extraction methods are the capability extractor: they return every bound
/// instance satisfying a role, in binding order, without deduplication.
pub struct ComponentGraph {
    bindings: Vec<Binding>,
    transport: Option<Arc<dyn TransportRegistrar>>,
}

impl fmt::Debug for ComponentGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<CapabilityRole> = self.bindings.iter().map(Binding::role).collect();
        f.debug_struct("ComponentGraph")
            .field("bindings", &roles)
            .field("transport_bound", &self.transport.is_some())
            .finish()
    }
}

impl ComponentGraph {
    /// All recorded bindings, in binding order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Extract every network-facing instance, in binding order.
    #[must_use]
    pub fn network_handlers(&self) -> Vec<Arc<dyn NetworkHandler>> {
        self.bindings
            .iter()
            .filter_map(|binding| match binding {
                Binding::Network(handler) => Some(Arc::clone(handler)),
                Binding::Lifecycle { .. } => None,
            })
            .collect()
    }

    /// Extract every lifecycle-managed service with its binding name, in
    /// binding order. This order flows unchanged into the orchestrator.
    #[must_use]
    pub fn lifecycle_services(&self) -> Vec<(String, Arc<dyn Service>)> {
        self.bindings
            .iter()
            .filter_map(|binding| match binding {
                Binding::Lifecycle { name, service } => {
                    Some((name.clone(), Arc::clone(service)))
                }
                Binding::Network(_) => None,
            })
            .collect()
    }

    /// The transport registrar, if a module bound one.
    #[must_use]
    pub fn transport(&self) -> Option<Arc<dyn TransportRegistrar>> {
        self.transport.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::service::{ServiceError, Service};
    use async_trait::async_trait;

    struct NoopService(&'static str);

    #[async_trait]
    impl Service for NoopService {
        fn name(&self) -> &str {
            self.0
        }
        async fn start(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct NoopHandler(&'static str);

    impl NetworkHandler for NoopHandler {
        fn endpoint(&self) -> &str {
            self.0
        }
    }

    struct NoopRegistrar;

    impl TransportRegistrar for NoopRegistrar {
        fn register_services(&self, _handlers: Vec<Arc<dyn NetworkHandler>>) {}
    }

    fn test_env() -> Environment {
        Environment::new(RuntimeConfig::default(), prometheus::Registry::new())
    }

    #[test]
    fn extraction_preserves_binding_order() {
        let mut builder = GraphBuilder::new(test_env());
        builder.bind_lifecycle("alpha", Arc::new(NoopService("alpha")));
        builder.bind_network(Arc::new(NoopHandler("/one")));
        builder.bind_lifecycle("beta", Arc::new(NoopService("beta")));
        builder.bind_network(Arc::new(NoopHandler("/two")));
        let graph = builder.build();

        let services: Vec<_> = graph
            .lifecycle_services()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(services, vec!["alpha", "beta"]);

        let endpoints: Vec<_> = graph
            .network_handlers()
            .iter()
            .map(|h| h.endpoint().to_string())
            .collect();
        assert_eq!(endpoints, vec!["/one", "/two"]);
    }

    #[test]
    fn graph_debug_lists_binding_roles() {
        let mut builder = GraphBuilder::new(test_env());
        builder.bind_network(Arc::new(NoopHandler("/one")));
        builder.bind_lifecycle("alpha", Arc::new(NoopService("alpha")));
        let rendered = format!("{:?}", builder.build());
        assert!(rendered.contains("NetworkFacing"));
        assert!(rendered.contains("Lifecycle"));
    }

    #[test]
    fn transport_slot_is_exclusive() {
        let mut builder = GraphBuilder::new(test_env());
        builder
            .set_transport(Arc::new(NoopRegistrar))
            .expect("first claim succeeds");
        assert!(matches!(
            builder.set_transport(Arc::new(NoopRegistrar)),
            Err(BootstrapError::TransportAlreadyBound)
        ));
    }
}

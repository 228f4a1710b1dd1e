//! # Module Descriptor Set
//!
//! The ordered catalogue of modules the runtime assembles: a fixed static
//! set in program order, followed by dynamically discovered modules in
//! (manifest-discovery-order, within-manifest order). The set is append-only
//! until [`ModuleSet::resolve`] consumes it, which freezes the catalogue by
//! move before the graph is built.

use tracing::info;

use crate::bootstrap::Environment;
use crate::error::BootstrapError;
use crate::graph::{ComponentGraph, GraphBuilder};

/// Where a module descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// Part of the fixed static set compiled into the runtime.
    Static,
    /// Discovered from a module manifest at bootstrap time.
    Dynamic,
}

/// An entry in the module catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Module identifier. For dynamic modules this is the manifest
    /// identifier the constructor was registered under.
    pub identifier: String,
    /// Static or dynamic origin.
    pub origin: ModuleOrigin,
}

/// A self-contained unit that contributes capability bindings to the graph.
pub trait Module: Send + Sync {
    /// Stable module name, used as the descriptor identifier for static
    /// modules.
    fn name(&self) -> &str;

    /// Contribute bindings. Any error here is fatal to the bootstrap.
    fn configure(&self, builder: &mut GraphBuilder) -> Result<(), BootstrapError>;
}

/// The append-only, ordered module catalogue.
#[derive(Default)]
pub struct ModuleSet {
    entries: Vec<(ModuleDescriptor, Box<dyn Module>)>,
}

impl ModuleSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a static module. Static modules keep program order.
    pub fn push_static(&mut self, module: Box<dyn Module>) {
        let descriptor = ModuleDescriptor {
            identifier: module.name().to_string(),
            origin: ModuleOrigin::Static,
        };
        self.entries.push((descriptor, module));
    }

    /// Append a dynamically discovered module under its manifest identifier.
    pub fn push_dynamic(&mut self, identifier: impl Into<String>, module: Box<dyn Module>) {
        let descriptor = ModuleDescriptor {
            identifier: identifier.into(),
            origin: ModuleOrigin::Dynamic,
        };
        self.entries.push((descriptor, module));
    }

    /// Descriptors in catalogue order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.entries.iter().map(|(d, _)| d.clone()).collect()
    }

    /// Identifiers in catalogue order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(d, _)| d.identifier.as_str())
            .collect()
    }

    /// Number of catalogued modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the catalogue into a component graph.
    ///
    /// Consumes the set, freezing the catalogue. Every module's `configure`
    /// runs in catalogue order against one shared builder; the first failure
    /// aborts resolution.
    pub fn resolve(self, env: Environment) -> Result<ComponentGraph, BootstrapError> {
        let mut builder = GraphBuilder::new(env);
        for (descriptor, module) in &self.entries {
            info!(
                module = %descriptor.identifier,
                origin = ?descriptor.origin,
                "configuring module"
            );
            module.configure(&mut builder)?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use std::sync::{Arc, Mutex};

    struct RecordingModule {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl Module for RecordingModule {
        fn name(&self) -> &str {
            self.name
        }

        fn configure(&self, _builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(BootstrapError::ModuleConfigure {
                    module: self.name.to_string(),
                    reason: "induced failure".to_string(),
                });
            }
            Ok(())
        }
    }

    fn module(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    ) -> Box<dyn Module> {
        Box::new(RecordingModule {
            name,
            log: Arc::clone(log),
            fail,
        })
    }

    fn test_env() -> Environment {
        Environment::new(RuntimeConfig::default(), prometheus::Registry::new())
    }

    #[test]
    fn static_then_dynamic_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = ModuleSet::new();
        set.push_static(module("config", &log, false));
        set.push_static(module("server", &log, false));
        set.push_dynamic("plugin.x", module("x", &log, false));
        set.push_dynamic("plugin.y", module("y", &log, false));

        assert_eq!(set.identifiers(), vec!["config", "server", "plugin.x", "plugin.y"]);
        assert_eq!(
            set.descriptors()
                .iter()
                .map(|d| d.origin)
                .collect::<Vec<_>>(),
            vec![
                ModuleOrigin::Static,
                ModuleOrigin::Static,
                ModuleOrigin::Dynamic,
                ModuleOrigin::Dynamic
            ]
        );
    }

    #[test]
    fn resolve_runs_configure_in_catalogue_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = ModuleSet::new();
        set.push_static(module("a", &log, false));
        set.push_static(module("b", &log, false));
        set.push_dynamic("c", module("c", &log, false));

        set.resolve(test_env()).expect("resolution succeeds");
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn resolve_aborts_on_first_configure_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = ModuleSet::new();
        set.push_static(module("a", &log, false));
        set.push_static(module("bad", &log, true));
        set.push_static(module("never", &log, false));

        let err = set.resolve(test_env()).unwrap_err();
        assert!(matches!(err, BootstrapError::ModuleConfigure { ref module, .. } if module == "bad"));
        assert_eq!(*log.lock().unwrap(), vec!["a", "bad"]);
    }
}

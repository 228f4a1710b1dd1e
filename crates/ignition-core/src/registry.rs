//! # Module Constructor Registry
//!
//! Dynamic module loading by string identifier is an explicit
//! identifier-to-constructor map: constructors are registered up front
//! (built-ins at bootstrap, plugins through the bootstrap container), and the
//! manifest loader looks identifiers up here. There is no open-ended runtime
//! resolution.

use std::collections::HashMap;

use tracing::debug;

use crate::module::Module;

/// Zero-argument module constructor.
pub type ModuleConstructor = fn() -> Box<dyn Module>;

/// Identifier-to-constructor map for dynamically loadable modules.
#[derive(Default)]
pub struct ModuleRegistry {
    constructors: HashMap<String, ModuleConstructor>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under an identifier. A later registration
    /// under the same identifier replaces the earlier one.
    pub fn register(&mut self, identifier: impl Into<String>, constructor: ModuleConstructor) {
        let identifier = identifier.into();
        debug!(module = %identifier, "registered module constructor");
        self.constructors.insert(identifier, constructor);
    }

    /// Whether an identifier has a registered constructor.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.constructors.contains_key(identifier)
    }

    /// Construct the module registered under `identifier`, if any.
    #[must_use]
    pub fn construct(&self, identifier: &str) -> Option<Box<dyn Module>> {
        self.constructors.get(identifier).map(|constructor| constructor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;
    use crate::graph::GraphBuilder;

    struct StubModule;

    impl Module for StubModule {
        fn name(&self) -> &str {
            "stub"
        }
        fn configure(&self, _builder: &mut GraphBuilder) -> Result<(), BootstrapError> {
            Ok(())
        }
    }

    #[test]
    fn constructs_registered_modules() {
        let mut registry = ModuleRegistry::new();
        registry.register("test.stub", || Box::new(StubModule));

        assert!(registry.contains("test.stub"));
        let module = registry.construct("test.stub").expect("registered");
        assert_eq!(module.name(), "stub");
    }

    #[test]
    fn unknown_identifier_yields_none() {
        let registry = ModuleRegistry::new();
        assert!(!registry.contains("nope"));
        assert!(registry.construct("nope").is_none());
    }
}

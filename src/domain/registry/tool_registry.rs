//! Tool Registry - Catalog of tools known to the orchestrator.
//!
//! Each entry pairs a validated [`ToolSpec`] with the adapter that executes
//! it. Registration order is preserved and is the default priority order
//! used by the pattern parser when several tools match the same clause.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{RegistryError, ToolSpec};
use crate::ports::ToolAdapter;

/// A spec together with its bound adapter.
#[derive(Clone)]
pub struct RegisteredTool {
    spec: Arc<ToolSpec>,
    adapter: Arc<dyn ToolAdapter>,
}

impl RegisteredTool {
    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    pub fn adapter(&self) -> Arc<dyn ToolAdapter> {
        Arc::clone(&self.adapter)
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("spec", &self.spec.name())
            .field("adapter", &self.adapter.kind())
            .finish()
    }
}

/// Registry of tool specs keyed by unique name.
///
/// Cloning is cheap: specs and adapters are reference counted, which lets
/// [`super::SharedToolRegistry`] publish new versions copy-on-write.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Tools in registration order
    tools: Vec<RegisteredTool>,

    /// Name to position in `tools`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool.
    ///
    /// Fails with [`RegistryError::DuplicateTool`] if the name is taken, in
    /// which case the existing entry is left untouched.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        adapter: Arc<dyn ToolAdapter>,
    ) -> Result<(), RegistryError> {
        spec.validate()?;
        if self.index.contains_key(spec.name()) {
            return Err(RegistryError::DuplicateTool(spec.name().to_string()));
        }

        self.index.insert(spec.name().to_string(), self.tools.len());
        self.tools.push(RegisteredTool {
            spec: Arc::new(spec),
            adapter,
        });
        Ok(())
    }

    /// Removes a tool, returning its spec.
    pub fn unregister(&mut self, name: &str) -> Result<Arc<ToolSpec>, RegistryError> {
        let position = self
            .index
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;
        let removed = self.tools.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Ok(removed.spec)
    }

    /// Looks up a spec by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolSpec, RegistryError> {
        self.entry(name).map(RegisteredTool::spec)
    }

    /// Returns the adapter bound to a tool.
    pub fn adapter(&self, name: &str) -> Result<Arc<dyn ToolAdapter>, RegistryError> {
        self.entry(name).map(RegisteredTool::adapter)
    }

    pub fn entry(&self, name: &str) -> Result<&RegisteredTool, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates all specs in registration order.
    ///
    /// The iterator is lazy and can be cloned to restart it.
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = &ToolSpec> + Clone + '_ {
        self.tools.iter().map(RegisteredTool::spec)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.list_all().map(ToolSpec::name).collect()
    }

    /// Position of a tool in registration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{ParameterSpec, ParameterType};
    use crate::ports::{AdapterError, ResolvedCall};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::Value;

    struct NoopAdapter;

    #[async_trait]
    impl ToolAdapter for NoopAdapter {
        async fn invoke(&self, _call: &ResolvedCall) -> Result<Value, AdapterError> {
            Ok(Value::Null)
        }
    }

    fn spec(name: &str) -> ToolSpec {
        ToolSpec::new(name, format!("{} tool", name))
            .with_parameter(ParameterSpec::required("query", ParameterType::String))
            .with_outputs(["result"])
    }

    fn registry_with(names: &[&str]) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in names {
            registry.register(spec(name), Arc::new(NoopAdapter)).unwrap();
        }
        registry
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.list_all().count(), 0);
    }

    #[test]
    fn register_then_lookup_returns_spec() {
        let registry = registry_with(&["weather"]);
        let found = registry.lookup("weather").unwrap();
        assert_eq!(found, &spec("weather"));
        assert!(registry.contains("weather"));
    }

    #[test]
    fn lookup_unknown_fails() {
        let registry = registry_with(&["weather"]);
        assert_eq!(
            registry.lookup("stocks").unwrap_err(),
            RegistryError::UnknownTool("stocks".into())
        );
        assert!(registry.adapter("stocks").is_err());
    }

    #[test]
    fn duplicate_registration_keeps_original() {
        let mut registry = registry_with(&["weather"]);
        let replacement = ToolSpec::new("weather", "different").with_outputs(["other"]);

        let err = registry
            .register(replacement, Arc::new(NoopAdapter))
            .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateTool("weather".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("weather").unwrap().description(), "weather tool");
    }

    #[test]
    fn invalid_spec_is_not_registered() {
        let mut registry = ToolRegistry::new();
        let bad = ToolSpec::new("", "nameless");
        assert!(matches!(
            registry.register(bad, Arc::new(NoopAdapter)),
            Err(RegistryError::InvalidSpec { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn list_all_preserves_registration_order() {
        let registry = registry_with(&["weather", "news", "currency"]);
        assert_eq!(registry.names(), vec!["weather", "news", "currency"]);
        assert_eq!(registry.position("news"), Some(1));
    }

    #[test]
    fn list_all_is_restartable() {
        let registry = registry_with(&["a", "b"]);
        let iter = registry.list_all();
        let first: Vec<_> = iter.clone().map(ToolSpec::name).collect();
        let second: Vec<_> = iter.map(ToolSpec::name).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn unregister_reindexes_remaining_tools() {
        let mut registry = registry_with(&["a", "b", "c"]);
        let removed = registry.unregister("a").unwrap();

        assert_eq!(removed.name(), "a");
        assert_eq!(registry.names(), vec!["b", "c"]);
        assert_eq!(registry.lookup("c").unwrap().name(), "c");
        assert_eq!(registry.position("c"), Some(1));
    }

    #[test]
    fn unregister_unknown_fails() {
        let mut registry = registry_with(&["a"]);
        assert!(registry.unregister("zzz").is_err());
    }

    #[test]
    fn lookup_does_not_mutate() {
        let registry = registry_with(&["a", "b"]);
        let before = registry.names().join(",");
        let _ = registry.lookup("a");
        let _ = registry.lookup("missing");
        assert_eq!(registry.names().join(","), before);
    }

    /// Distinct tool names in a random order.
    fn names_strategy() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::hash_set("[a-z][a-z0-9_]{0,11}", 1..16)
            .prop_flat_map(|names| Just(names.into_iter().collect::<Vec<_>>()).prop_shuffle())
    }

    proptest! {
        #[test]
        fn listing_follows_registration_order(names in names_strategy()) {
            let mut registry = ToolRegistry::new();
            for name in &names {
                registry.register(spec(name), Arc::new(NoopAdapter)).unwrap();
            }

            let listed: Vec<&str> = registry.list_all().map(ToolSpec::name).collect();
            let expected: Vec<&str> = names.iter().map(String::as_str).collect();
            prop_assert_eq!(listed, expected);
            for (i, name) in names.iter().enumerate() {
                prop_assert_eq!(registry.position(name), Some(i));
            }
        }

        #[test]
        fn duplicate_is_rejected_and_first_entry_kept(
            names in names_strategy(),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut registry = ToolRegistry::new();
            for name in &names {
                registry.register(spec(name), Arc::new(NoopAdapter)).unwrap();
            }
            let duplicate = pick.get(&names);

            let err = registry
                .register(ToolSpec::new(duplicate.as_str(), "replacement"), Arc::new(NoopAdapter))
                .unwrap_err();

            prop_assert_eq!(err, RegistryError::DuplicateTool(duplicate.clone()));
            prop_assert_eq!(registry.len(), names.len());
            let expected_description = format!("{} tool", duplicate);
            prop_assert_eq!(
                registry.lookup(duplicate).unwrap().description(),
                expected_description.as_str()
            );
            prop_assert_eq!(registry.names(), names.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}

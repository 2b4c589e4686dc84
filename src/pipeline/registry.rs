//! Plugin registry: Symbolic name to live node variant.
//!
//! The registry is a data-driven table keyed by class name (the third segment
//! of `analitico.plugin.<ClassName>`). Resolution never fails: names missing
//! from the table resolve to the raw JSON editor so that pipelines written by
//! newer clients stay viewable and editable.
//!
//! Containers do not depend on `PluginRegistry` directly but on the
//! `PluginResolver` seam, bundled with the placement configuration in a shared
//! `PipelineEnvironment`.

use crate::config::{EngineConfig, PlacementConfig, DEFAULT_SOURCE_MARKER};
use crate::pipeline::node::{AnyNode, BuiltinNode};
use crate::pipeline::nodes::{CodeNode, PipelineNode, RawJsonNode, SourceNode, TransformNode};
use crate::pipeline::placement::PlacementPolicy;
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::{class_name_of, PluginRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs a fresh, unbound live node.
pub type NodeFactory = fn(&Arc<PipelineEnvironment>) -> AnyNode;

/// A constructible plugin variant.
#[derive(Clone)]
pub struct PluginVariant {
    /// Built-in kind, `None` for variants registered from outside the crate
    pub kind: Option<PluginKind>,
    pub class_name: String,
    pub display_name: String,
    pub factory: NodeFactory,
}

impl PluginVariant {
    pub fn new(class_name: impl Into<String>, display_name: impl Into<String>, factory: NodeFactory) -> Self {
        Self {
            kind: None,
            class_name: class_name.into(),
            display_name: display_name.into(),
            factory,
        }
    }

    fn builtin(kind: PluginKind, factory: NodeFactory) -> Self {
        Self {
            kind: Some(kind),
            class_name: kind.class_name().to_string(),
            display_name: kind.display_name().to_string(),
            factory,
        }
    }

    pub fn instantiate(&self, env: &Arc<PipelineEnvironment>) -> AnyNode {
        (self.factory)(env)
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == Some(PluginKind::RawJson)
    }
}

impl std::fmt::Debug for PluginVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginVariant")
            .field("kind", &self.kind)
            .field("class_name", &self.class_name)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Lookup seam used by containers.
pub trait PluginResolver: Send + Sync {
    /// Variant for a full symbolic name. `None` means the configuration is
    /// broken; a container refuses to build the node.
    fn lookup(&self, symbolic_name: &str) -> Option<&PluginVariant>;
}

/// Static table of plugin variants with a raw JSON fallback.
pub struct PluginRegistry {
    variants: HashMap<String, PluginVariant>,
    fallback: PluginVariant,
}

fn pipeline_node(kind: PluginKind, env: &Arc<PipelineEnvironment>) -> AnyNode {
    AnyNode::Builtin(BuiltinNode::Pipeline(PipelineNode::new(kind, env)))
}

impl PluginRegistry {
    /// Registry holding every built-in variant.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(PluginVariant::builtin(PluginKind::Pipeline, |env| {
            pipeline_node(PluginKind::Pipeline, env)
        }));
        registry.register(PluginVariant::builtin(PluginKind::DataframePipeline, |env| {
            pipeline_node(PluginKind::DataframePipeline, env)
        }));
        registry.register(PluginVariant::builtin(PluginKind::RecipePipeline, |env| {
            pipeline_node(PluginKind::RecipePipeline, env)
        }));
        registry.register(PluginVariant::builtin(PluginKind::EndpointPipeline, |env| {
            pipeline_node(PluginKind::EndpointPipeline, env)
        }));
        registry.register(PluginVariant::builtin(PluginKind::CsvDataframeSource, |_| {
            AnyNode::Builtin(BuiltinNode::Source(SourceNode::new(PluginKind::CsvDataframeSource)))
        }));
        registry.register(PluginVariant::builtin(PluginKind::DatasetSource, |_| {
            AnyNode::Builtin(BuiltinNode::Source(SourceNode::new(PluginKind::DatasetSource)))
        }));
        registry.register(PluginVariant::builtin(PluginKind::TransformDataframe, |_| {
            AnyNode::Builtin(BuiltinNode::Transform(TransformNode::new()))
        }));
        registry.register(PluginVariant::builtin(PluginKind::CodeDataframe, |_| {
            AnyNode::Builtin(BuiltinNode::Code(CodeNode::new()))
        }));
        registry.register(PluginVariant::builtin(PluginKind::AugmentDates, |_| {
            AnyNode::Builtin(BuiltinNode::RawJson(RawJsonNode::with_kind(PluginKind::AugmentDates)))
        }));
        registry
    }

    /// Registry with only the fallback variant.
    pub fn empty() -> Self {
        Self {
            variants: HashMap::new(),
            fallback: PluginVariant::builtin(PluginKind::RawJson, |_| {
                AnyNode::Builtin(BuiltinNode::RawJson(RawJsonNode::new()))
            }),
        }
    }

    /// Add or replace the variant for `variant.class_name`.
    pub fn register(&mut self, variant: PluginVariant) {
        tracing::debug!("Registered plugin variant {}", variant.class_name);
        self.variants.insert(variant.class_name.clone(), variant);
    }

    /// Resolve a full symbolic name. Unknown names get the fallback.
    pub fn resolve(&self, symbolic_name: &str) -> &PluginVariant {
        let class_name = class_name_of(symbolic_name);
        match self.variants.get(class_name) {
            Some(variant) => variant,
            None => {
                tracing::warn!(
                    "No plugin variant for '{}', using {}",
                    symbolic_name,
                    self.fallback.display_name
                );
                &self.fallback
            }
        }
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.variants.contains_key(class_name)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn fallback(&self) -> &PluginVariant {
        &self.fallback
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PluginResolver for PluginRegistry {
    fn lookup(&self, symbolic_name: &str) -> Option<&PluginVariant> {
        Some(self.resolve(symbolic_name))
    }
}

/// Everything a container needs besides its records, shared by the root
/// container and every nested one.
pub struct PipelineEnvironment {
    resolver: Box<dyn PluginResolver>,
    placement: PlacementConfig,
    source_marker: String,
}

impl PipelineEnvironment {
    pub fn new(
        resolver: Box<dyn PluginResolver>,
        placement: PlacementConfig,
        source_marker: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            placement,
            source_marker: source_marker.into(),
        }
    }

    /// Built-in registry with default placement rules.
    pub fn builtin() -> Arc<Self> {
        Arc::new(Self::new(
            Box::new(PluginRegistry::builtin()),
            PlacementConfig::default(),
            DEFAULT_SOURCE_MARKER,
        ))
    }

    /// Built-in registry with the configured rules and marker.
    pub fn from_config(config: &EngineConfig) -> Arc<Self> {
        Arc::new(Self::new(
            Box::new(PluginRegistry::builtin()),
            config.placement.clone(),
            config.source_marker.clone(),
        ))
    }

    pub fn resolver(&self) -> &dyn PluginResolver {
        self.resolver.as_ref()
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    pub fn source_marker(&self) -> &str {
        &self.source_marker
    }

    /// Policy for a pipeline of the given class.
    pub fn policy_for(&self, class_name: &str) -> Box<dyn PlacementPolicy> {
        self.placement
            .rule_for(class_name)
            .policy(&self.source_marker)
    }

    pub fn is_source(&self, record: &PluginRecord) -> bool {
        record.is_source(&self.source_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_classes() {
        let registry = PluginRegistry::builtin();
        for kind in PluginKind::all() {
            let variant = registry.resolve(&kind.symbolic_name());
            assert_eq!(variant.kind, Some(*kind));
            assert!(!variant.is_fallback());
        }
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let registry = PluginRegistry::builtin();
        let variant = registry.resolve("analitico.plugin.TotallyUnknownPlugin");
        assert!(variant.is_fallback());
        assert_eq!(variant.display_name, "Raw JSON");

        // Too few segments to carry a class name.
        assert!(registry.resolve("garbage").is_fallback());
        assert!(registry.resolve("").is_fallback());
    }

    #[test]
    fn test_lookup_always_answers() {
        let registry = PluginRegistry::builtin();
        assert!(registry.lookup("analitico.plugin.Nope").is_some());
    }

    #[test]
    fn test_register_extends_table() {
        let mut registry = PluginRegistry::builtin();
        assert!(!registry.contains("ParquetSourcePlugin"));
        registry.register(PluginVariant::new("ParquetSourcePlugin", "Parquet Source", |_| {
            AnyNode::Builtin(BuiltinNode::RawJson(RawJsonNode::new()))
        }));
        assert!(registry.contains("ParquetSourcePlugin"));
        let variant = registry.resolve("analitico.plugin.ParquetSourcePlugin");
        assert_eq!(variant.display_name, "Parquet Source");
        assert_eq!(variant.kind, None);
    }

    #[test]
    fn test_class_names_sorted() {
        let registry = PluginRegistry::builtin();
        let names = registry.class_names();
        assert_eq!(names.len(), PluginKind::all().len());
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_instantiate_builds_matching_node() {
        let env = PipelineEnvironment::builtin();
        let node = env
            .resolver()
            .lookup("analitico.plugin.DataframePipelinePlugin")
            .unwrap()
            .instantiate(&env);
        assert_eq!(node.variant_name(), "Dataframe Pipeline");
        assert!(node.as_pipeline().is_some());
    }

    #[test]
    fn test_environment_policy_per_class() {
        let env = PipelineEnvironment::builtin();
        assert_eq!(env.policy_for("DataframePipelinePlugin").name(), "source_first");
        assert_eq!(env.policy_for("PipelinePlugin").name(), "unrestricted");
        assert!(env.is_source(&PluginKind::DatasetSource.new_record()));
        assert!(!env.is_source(&PluginKind::CodeDataframe.new_record()));
    }
}

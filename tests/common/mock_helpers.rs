//! Hand-written plugin nodes and resolvers for integration tests

use analitico_pipeline::error::Result;
use analitico_pipeline::pipeline::{
    AnyNode, ChangeEmitter, InstanceId, NodeEdit, PluginNode, PluginRecord, PluginRegistry,
    PluginResolver, PluginVariant, ViewNode,
};

/// Trait-object node that accepts any `SetValue` and records every edit.
#[derive(Default)]
pub struct RecordingNode {
    record: PluginRecord,
    emitter: Option<ChangeEmitter>,
    pub applied: Vec<&'static str>,
}

impl PluginNode for RecordingNode {
    fn variant_name(&self) -> &str {
        "Recording"
    }

    fn attach(&mut self, emitter: ChangeEmitter) {
        self.emitter = Some(emitter);
    }

    fn set_data(&mut self, record: PluginRecord) -> Result<()> {
        self.record = record;
        Ok(())
    }

    fn data(&self) -> PluginRecord {
        self.record.clone()
    }

    fn render(&self) -> ViewNode {
        ViewNode {
            instance: self
                .emitter
                .as_ref()
                .map(|e| e.instance())
                .unwrap_or(InstanceId::INVALID),
            variant: "Recording".to_string(),
            title: self.record.class_name().to_string(),
            fields: Vec::new(),
            children: Vec::new(),
        }
    }

    fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        self.applied.push(edit.label());
        if let NodeEdit::SetValue { pointer, value } = edit {
            self.record = self.record.with_pointer(&pointer, value)?;
            if let Some(emitter) = &self.emitter {
                emitter.emit(self.record.clone());
            }
            return Ok(true);
        }
        Ok(false)
    }
}

/// Registry with `RecordingPlugin` registered as a trait-object variant
pub fn registry_with_recording() -> PluginRegistry {
    let mut registry = PluginRegistry::builtin();
    registry.register(PluginVariant::new("RecordingPlugin", "Recording", |_| {
        AnyNode::Plugin(Box::new(RecordingNode::default()))
    }));
    registry
}

/// Resolver that answers nothing for names containing `missing`
pub struct GapResolver {
    pub registry: PluginRegistry,
    pub missing: &'static str,
}

impl PluginResolver for GapResolver {
    fn lookup(&self, symbolic_name: &str) -> Option<&PluginVariant> {
        if symbolic_name.contains(self.missing) {
            None
        } else {
            Some(self.registry.resolve(symbolic_name))
        }
    }
}

//! PipelineNode: A plugin whose payload is itself a pipeline.
//!
//! The node owns a nested `PipelineContainer` built from the shared
//! environment, so nested children resolve through the same registry and
//! the nested placement rule follows the configuration for this class.
//! Every change in the nested container is forwarded upward as one change of
//! this node, carrying the re-serialized nested pipeline.

use crate::error::{PipelineError, Result};
use crate::pipeline::channel::{ChangeEmitter, PipelineEvent};
use crate::pipeline::container::PipelineContainer;
use crate::pipeline::id::InstanceId;
use crate::pipeline::node::{NodeEdit, ViewNode};
use crate::pipeline::nodes::{check_identity, display_value, unsupported};
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::PluginRecord;
use crate::pipeline::registry::PipelineEnvironment;
use crossbeam_channel::Receiver;
use std::sync::Arc;

pub struct PipelineNode {
    kind: PluginKind,
    container: PipelineContainer,
    events: Receiver<PipelineEvent>,
    emitter: Option<ChangeEmitter>,
}

fn targets_children(pointer: &str) -> bool {
    pointer == "/plugins" || pointer.starts_with("/plugins/")
}

impl PipelineNode {
    pub fn new(kind: PluginKind, env: &Arc<PipelineEnvironment>) -> Self {
        debug_assert!(kind.is_pipeline());
        let mut container = PipelineContainer::new(Arc::clone(env), env.policy_for(kind.class_name()));
        let events = container.subscribe();
        Self {
            kind,
            container,
            events,
            emitter: None,
        }
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    pub fn container(&self) -> &PipelineContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut PipelineContainer {
        &mut self.container
    }

    pub fn attach(&mut self, emitter: ChangeEmitter) {
        self.emitter = Some(emitter);
    }

    pub fn set_data(&mut self, record: PluginRecord) -> Result<()> {
        self.container.load(record)
    }

    pub fn data(&self) -> PluginRecord {
        self.container.serialize()
    }

    pub fn render(&self) -> ViewNode {
        let root = self.container.root();
        let title = root
            .get("title")
            .map(display_value)
            .unwrap_or_else(|| self.kind.display_name().to_string());
        let mut fields = vec![
            ("plugins".to_string(), self.container.len().to_string()),
            ("placement".to_string(), self.container.policy_name().to_string()),
        ];
        let violations = self.container.placement_violations();
        if !violations.is_empty() {
            let positions: Vec<String> = violations.iter().map(|i| i.to_string()).collect();
            fields.push(("misplaced".to_string(), positions.join(", ")));
        }
        ViewNode {
            instance: self
                .emitter
                .as_ref()
                .map(|e| e.instance())
                .unwrap_or(InstanceId::INVALID),
            variant: self.kind.display_name().to_string(),
            title,
            fields,
            children: self.container.render(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        let variant = self.kind.display_name();
        match edit {
            NodeEdit::Nested { index, edit } => {
                let result = self.container.edit(index, *edit);
                self.forward_changes();
                result
            }
            NodeEdit::SetValue { pointer, value } if pointer.is_empty() => {
                let record = PluginRecord::from_value(value)?;
                self.apply(NodeEdit::Replace(record))
            }
            NodeEdit::SetValue { pointer, value } => {
                if targets_children(&pointer) {
                    return Err(PipelineError::InvalidEdit {
                        variant,
                        message: "nested plugins are edited through the nested container".to_string(),
                    });
                }
                let candidate = self.container.root().with_pointer(&pointer, value)?;
                check_identity(variant, self.container.root(), &candidate)?;
                let changed = self.container.set_root_fields(candidate);
                self.forward_changes();
                Ok(changed)
            }
            NodeEdit::Replace(record) => {
                check_identity(variant, self.container.root(), &record)?;
                if record == self.container.serialize() {
                    return Ok(false);
                }
                self.container.load(record)?;
                self.emit();
                Ok(true)
            }
            other => Err(unsupported(variant, &other)),
        }
    }

    /// Forward pending nested events upward, one emission per event.
    pub fn flush(&mut self) {
        self.forward_changes();
    }

    fn forward_changes(&mut self) -> usize {
        let pending = self.events.try_iter().count();
        for _ in 0..pending {
            self.emit();
        }
        pending
    }

    fn emit(&self) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(self.container.serialize());
        }
    }
}

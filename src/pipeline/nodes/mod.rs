//! Built-in plugin node variants.

pub mod code;
pub mod pipeline;
pub mod raw_json;
pub mod schema;
pub mod source;
pub mod transform;

pub use code::CodeNode;
pub use pipeline::PipelineNode;
pub use raw_json::RawJsonNode;
pub use schema::{Column, ColumnType};
pub use source::SourceNode;
pub use transform::TransformNode;

use crate::error::{PipelineError, Result};
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::id::InstanceId;
use crate::pipeline::node::NodeEdit;
use crate::pipeline::record::PluginRecord;
use serde_json::Value;

/// Longest field value shown in a rendered view.
const MAX_FIELD_CHARS: usize = 80;

/// Record and emitter shared by every leaf variant.
#[derive(Debug, Default)]
pub struct NodeCore {
    record: PluginRecord,
    emitter: Option<ChangeEmitter>,
}

impl NodeCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, emitter: ChangeEmitter) {
        self.emitter = Some(emitter);
    }

    pub fn instance(&self) -> InstanceId {
        self.emitter
            .as_ref()
            .map(|e| e.instance())
            .unwrap_or(InstanceId::INVALID)
    }

    pub fn record(&self) -> &PluginRecord {
        &self.record
    }

    /// Bind a record without emitting.
    pub fn bind(&mut self, record: PluginRecord) {
        self.record = record;
    }

    /// Store `candidate` and emit once, unless it equals the current record.
    pub fn commit(&mut self, candidate: PluginRecord) -> bool {
        if candidate == self.record {
            return false;
        }
        self.record = candidate;
        if let Some(emitter) = &self.emitter {
            emitter.emit(self.record.clone());
        }
        true
    }

    /// Generic JSON editing shared by all leaf variants.
    pub fn apply_raw(&mut self, variant: &'static str, edit: NodeEdit) -> Result<bool> {
        let candidate = match edit {
            NodeEdit::SetValue { pointer, value } => self.record.with_pointer(&pointer, value)?,
            NodeEdit::Replace(record) => record,
            other => return Err(unsupported(variant, &other)),
        };
        check_identity(variant, &self.record, &candidate)?;
        Ok(self.commit(candidate))
    }

    /// Top-level payload fields, formatted for display.
    pub fn payload_fields(&self) -> Vec<(String, String)> {
        self.record
            .payload
            .iter()
            .map(|(k, v)| (k.clone(), display_value(v)))
            .collect()
    }
}

/// A node's symbolic name selects its variant and placement, so an edit may
/// never change it. Renaming a plugin is a remove followed by an insert.
pub(crate) fn check_identity(
    variant: &'static str,
    current: &PluginRecord,
    candidate: &PluginRecord,
) -> Result<()> {
    if candidate.name.is_empty() {
        return Err(PipelineError::InvalidEdit {
            variant,
            message: "plugin name cannot be empty".to_string(),
        });
    }
    if candidate.name != current.name {
        return Err(PipelineError::InvalidEdit {
            variant,
            message: format!(
                "cannot turn '{}' into '{}', remove it and insert the new plugin",
                current.name, candidate.name
            ),
        });
    }
    Ok(())
}

pub(crate) fn unsupported(variant: &'static str, edit: &NodeEdit) -> PipelineError {
    PipelineError::InvalidEdit {
        variant,
        message: format!("unsupported edit '{}'", edit.label()),
    }
}

/// Compact, truncated rendering of a JSON value.
pub(crate) fn display_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_FIELD_CHARS {
        let mut short: String = text.chars().take(MAX_FIELD_CHARS - 1).collect();
        short.push('…');
        short
    } else {
        text
    }
}

//! Live node abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`PluginNode` trait**: for variants registered from outside the crate.
//! - **`BuiltinNode` enum**: for all built-in variants, dispatched by match.
//!
//! `AnyNode` wraps either so the container can handle both uniformly.

use crate::error::Result;
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::container::PipelineContainer;
use crate::pipeline::id::InstanceId;
use crate::pipeline::nodes::{CodeNode, PipelineNode, RawJsonNode, SourceNode, TransformNode};
use crate::pipeline::record::PluginRecord;
use serde_json::Value;

/// An edit a user applies to one node's payload.
///
/// Not every variant accepts every edit; unsupported edits fail with
/// `PipelineError::InvalidEdit` and leave the node untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    /// Write a value at an RFC 6901 pointer into the record.
    SetValue { pointer: String, value: Value },
    /// Replace the whole record.
    Replace(PluginRecord),
    /// Change the declared type of a schema column.
    SetColumnType { column: String, column_type: String },
    /// Rename a schema column.
    RenameColumn { column: String, new_name: String },
    /// Remove a column from the schema.
    DropColumn { column: String },
    /// Move a schema column to a new position.
    MoveColumn { column: String, to: usize },
    /// Make a column the dataframe index, or clear the index.
    SetIndexColumn { column: Option<String> },
    /// Replace the code snippet.
    SetCode(String),
    /// Edit a child of a nested pipeline.
    Nested { index: usize, edit: Box<NodeEdit> },
}

impl NodeEdit {
    /// Short label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            NodeEdit::SetValue { .. } => "set_value",
            NodeEdit::Replace(_) => "replace",
            NodeEdit::SetColumnType { .. } => "set_column_type",
            NodeEdit::RenameColumn { .. } => "rename_column",
            NodeEdit::DropColumn { .. } => "drop_column",
            NodeEdit::MoveColumn { .. } => "move_column",
            NodeEdit::SetIndexColumn { .. } => "set_index_column",
            NodeEdit::SetCode(_) => "set_code",
            NodeEdit::Nested { .. } => "nested",
        }
    }
}

/// Rendered view of one node, with nested pipelines as children.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub instance: InstanceId,
    /// Display name of the variant that rendered the node.
    pub variant: String,
    pub title: String,
    /// Summary fields shown under the title.
    pub fields: Vec<(String, String)>,
    pub children: Vec<ViewNode>,
}

/// Trait for variants registered from outside the crate.
pub trait PluginNode: Send {
    /// Display name of the variant.
    fn variant_name(&self) -> &str;

    /// Hand the node the sending half of its change channel.
    fn attach(&mut self, emitter: ChangeEmitter);

    /// Bind a record into the node. Does not emit.
    fn set_data(&mut self, record: PluginRecord) -> Result<()>;

    /// Current record, reflecting every applied edit.
    fn data(&self) -> PluginRecord;

    fn render(&self) -> ViewNode;

    /// Apply an edit. Returns whether the payload changed; every change
    /// emits exactly one notification.
    fn apply(&mut self, edit: NodeEdit) -> Result<bool>;

    /// Forward notifications buffered by nested containers.
    fn flush(&mut self) {}

    fn as_pipeline(&self) -> Option<&PipelineContainer> {
        None
    }

    fn as_pipeline_mut(&mut self) -> Option<&mut PipelineContainer> {
        None
    }
}

/// Enum dispatch for built-in variants.
pub enum BuiltinNode {
    RawJson(RawJsonNode),
    Source(SourceNode),
    Transform(TransformNode),
    Code(CodeNode),
    Pipeline(PipelineNode),
}

impl BuiltinNode {
    pub fn variant_name(&self) -> &str {
        match self {
            BuiltinNode::RawJson(n) => n.kind().display_name(),
            BuiltinNode::Source(n) => n.kind().display_name(),
            BuiltinNode::Transform(n) => n.kind().display_name(),
            BuiltinNode::Code(n) => n.kind().display_name(),
            BuiltinNode::Pipeline(n) => n.kind().display_name(),
        }
    }

    pub fn attach(&mut self, emitter: ChangeEmitter) {
        match self {
            BuiltinNode::RawJson(n) => n.attach(emitter),
            BuiltinNode::Source(n) => n.attach(emitter),
            BuiltinNode::Transform(n) => n.attach(emitter),
            BuiltinNode::Code(n) => n.attach(emitter),
            BuiltinNode::Pipeline(n) => n.attach(emitter),
        }
    }

    pub fn set_data(&mut self, record: PluginRecord) -> Result<()> {
        match self {
            BuiltinNode::RawJson(n) => n.set_data(record),
            BuiltinNode::Source(n) => n.set_data(record),
            BuiltinNode::Transform(n) => n.set_data(record),
            BuiltinNode::Code(n) => n.set_data(record),
            BuiltinNode::Pipeline(n) => n.set_data(record),
        }
    }

    pub fn data(&self) -> PluginRecord {
        match self {
            BuiltinNode::RawJson(n) => n.data(),
            BuiltinNode::Source(n) => n.data(),
            BuiltinNode::Transform(n) => n.data(),
            BuiltinNode::Code(n) => n.data(),
            BuiltinNode::Pipeline(n) => n.data(),
        }
    }

    pub fn render(&self) -> ViewNode {
        match self {
            BuiltinNode::RawJson(n) => n.render(),
            BuiltinNode::Source(n) => n.render(),
            BuiltinNode::Transform(n) => n.render(),
            BuiltinNode::Code(n) => n.render(),
            BuiltinNode::Pipeline(n) => n.render(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        match self {
            BuiltinNode::RawJson(n) => n.apply(edit),
            BuiltinNode::Source(n) => n.apply(edit),
            BuiltinNode::Transform(n) => n.apply(edit),
            BuiltinNode::Code(n) => n.apply(edit),
            BuiltinNode::Pipeline(n) => n.apply(edit),
        }
    }

    pub fn flush(&mut self) {
        if let BuiltinNode::Pipeline(n) = self {
            n.flush();
        }
    }
}

/// Wrapper that holds either a built-in node (enum dispatch) or a plugin (trait object).
pub enum AnyNode {
    Builtin(BuiltinNode),
    Plugin(Box<dyn PluginNode>),
}

impl AnyNode {
    pub fn variant_name(&self) -> &str {
        match self {
            AnyNode::Builtin(n) => n.variant_name(),
            AnyNode::Plugin(n) => n.variant_name(),
        }
    }

    pub fn attach(&mut self, emitter: ChangeEmitter) {
        match self {
            AnyNode::Builtin(n) => n.attach(emitter),
            AnyNode::Plugin(n) => n.attach(emitter),
        }
    }

    pub fn set_data(&mut self, record: PluginRecord) -> Result<()> {
        match self {
            AnyNode::Builtin(n) => n.set_data(record),
            AnyNode::Plugin(n) => n.set_data(record),
        }
    }

    pub fn data(&self) -> PluginRecord {
        match self {
            AnyNode::Builtin(n) => n.data(),
            AnyNode::Plugin(n) => n.data(),
        }
    }

    pub fn render(&self) -> ViewNode {
        match self {
            AnyNode::Builtin(n) => n.render(),
            AnyNode::Plugin(n) => n.render(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        match self {
            AnyNode::Builtin(n) => n.apply(edit),
            AnyNode::Plugin(n) => n.apply(edit),
        }
    }

    pub fn flush(&mut self) {
        match self {
            AnyNode::Builtin(n) => n.flush(),
            AnyNode::Plugin(n) => n.flush(),
        }
    }

    /// Nested container, when this node is a pipeline.
    pub fn as_pipeline(&self) -> Option<&PipelineContainer> {
        match self {
            AnyNode::Builtin(BuiltinNode::Pipeline(n)) => Some(n.container()),
            AnyNode::Builtin(_) => None,
            AnyNode::Plugin(n) => n.as_pipeline(),
        }
    }

    pub fn as_pipeline_mut(&mut self) -> Option<&mut PipelineContainer> {
        match self {
            AnyNode::Builtin(BuiltinNode::Pipeline(n)) => Some(n.container_mut()),
            AnyNode::Builtin(_) => None,
            AnyNode::Plugin(n) => n.as_pipeline_mut(),
        }
    }
}

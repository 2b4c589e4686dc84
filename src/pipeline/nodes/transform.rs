//! TransformNode: Applies a schema to a dataframe.
//!
//! The schema in the payload can drop columns, retype them, rename them,
//! reorder them and promote one to the dataframe index.

use crate::error::Result;
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::node::{NodeEdit, ViewNode};
use crate::pipeline::nodes::schema::{apply_column_edit, column_fields, read_columns, write_columns};
use crate::pipeline::nodes::NodeCore;
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::PluginRecord;

const COLUMNS_POINTER: &str = "/schema/columns";

pub struct TransformNode {
    core: NodeCore,
}

impl TransformNode {
    pub fn new() -> Self {
        Self {
            core: NodeCore::new(),
        }
    }

    pub fn kind(&self) -> PluginKind {
        PluginKind::TransformDataframe
    }

    pub fn attach(&mut self, emitter: ChangeEmitter) {
        self.core.attach(emitter);
    }

    pub fn set_data(&mut self, record: PluginRecord) -> Result<()> {
        self.core.bind(record);
        Ok(())
    }

    pub fn data(&self) -> PluginRecord {
        self.core.record().clone()
    }

    pub fn render(&self) -> ViewNode {
        let fields = read_columns(self.core.record(), COLUMNS_POINTER)
            .map(|columns| column_fields(&columns))
            .unwrap_or_default();
        ViewNode {
            instance: self.core.instance(),
            variant: self.kind().display_name().to_string(),
            title: self.kind().display_name().to_string(),
            fields,
            children: Vec::new(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        let variant = self.kind().display_name();
        match edit {
            NodeEdit::SetColumnType { .. }
            | NodeEdit::RenameColumn { .. }
            | NodeEdit::DropColumn { .. }
            | NodeEdit::MoveColumn { .. }
            | NodeEdit::SetIndexColumn { .. } => {
                let mut columns = read_columns(self.core.record(), COLUMNS_POINTER)?;
                apply_column_edit(&mut columns, variant, &edit)?;
                let candidate = write_columns(self.core.record(), COLUMNS_POINTER, &columns)?;
                Ok(self.core.commit(candidate))
            }
            other => self.core.apply_raw(variant, other),
        }
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

//! RawJsonNode: Generic JSON editor.
//!
//! The fallback variant for plugin names the registry does not know. It
//! shows the record's top-level fields and accepts pointer writes or whole
//! record replacement, so unknown plugins stay viewable and editable.

use crate::error::Result;
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::node::{NodeEdit, ViewNode};
use crate::pipeline::nodes::NodeCore;
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::PluginRecord;

pub struct RawJsonNode {
    kind: PluginKind,
    core: NodeCore,
}

impl RawJsonNode {
    pub fn new() -> Self {
        Self::with_kind(PluginKind::RawJson)
    }

    /// Raw editing for a known kind without a dedicated editor.
    pub fn with_kind(kind: PluginKind) -> Self {
        Self {
            kind,
            core: NodeCore::new(),
        }
    }

    pub fn kind(&self) -> PluginKind {
        self.kind
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
        let record = self.core.record();
        let title = match record.class_name() {
            "" => record.name.clone(),
            class => class.to_string(),
        };
        let mut fields = self.core.payload_fields();
        if !record.children().is_empty() {
            fields.push(("plugins".to_string(), format!("{} nested", record.children().len())));
        }
        ViewNode {
            instance: self.core.instance(),
            variant: self.kind.display_name().to_string(),
            title,
            fields,
            children: Vec::new(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        let changed = self.core.apply_raw(self.kind.display_name(), edit)?;
        if changed {
            tracing::debug!("{} edited {}", self.kind, self.core.record().name);
        }
        Ok(changed)
    }
}

impl Default for RawJsonNode {
    fn default() -> Self {
        Self::new()
    }
}

//! SourceNode: Dataframe source editor.
//!
//! Shows where a source reads from and lets the user adjust the declared
//! column types of `source.schema` before data reaches the rest of the
//! pipeline.

use crate::error::Result;
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::node::{NodeEdit, ViewNode};
use crate::pipeline::nodes::schema::{apply_column_edit, column_fields, read_columns, write_columns};
use crate::pipeline::nodes::{display_value, NodeCore};
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::PluginRecord;

const COLUMNS_POINTER: &str = "/source/schema/columns";

pub struct SourceNode {
    kind: PluginKind,
    core: NodeCore,
}

impl SourceNode {
    pub fn new(kind: PluginKind) -> Self {
        debug_assert!(kind.is_source());
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
        let mut fields = Vec::new();
        if let Some(url) = record.pointer("/source/url") {
            fields.push(("url".to_string(), display_value(&url)));
        }
        // A malformed schema still renders; editing it reports the error.
        if let Ok(columns) = read_columns(record, COLUMNS_POINTER) {
            fields.extend(column_fields(&columns));
        }
        ViewNode {
            instance: self.core.instance(),
            variant: self.kind.display_name().to_string(),
            title: self.kind.display_name().to_string(),
            fields,
            children: Vec::new(),
        }
    }

    pub fn apply(&mut self, edit: NodeEdit) -> Result<bool> {
        let variant = self.kind.display_name();
        match edit {
            NodeEdit::SetColumnType { .. } | NodeEdit::SetIndexColumn { .. } => {
                let mut columns = read_columns(self.core.record(), COLUMNS_POINTER)?;
                apply_column_edit(&mut columns, variant, &edit)?;
                let candidate = write_columns(self.core.record(), COLUMNS_POINTER, &columns)?;
                let changed = self.core.commit(candidate);
                if changed {
                    tracing::debug!("{} applied {}", variant, edit.label());
                }
                Ok(changed)
            }
            other => self.core.apply_raw(variant, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::channel::change_channel;
    use crate::pipeline::id::InstanceId;
    use serde_json::json;

    fn csv_record() -> PluginRecord {
        PluginKind::CsvDataframeSource.new_record().with_field(
            "source",
            json!({
                "url": "analitico://datasets/ds_1/data/csv",
                "schema": { "columns": [
                    { "name": "id", "type": "integer" },
                    { "name": "created", "type": "string" }
                ] }
            }),
        )
    }

    #[test]
    fn test_render_lists_url_and_columns() {
        let mut node = SourceNode::new(PluginKind::CsvDataframeSource);
        node.set_data(csv_record()).unwrap();
        let view = node.render();
        assert_eq!(view.title, "CSV Source");
        assert_eq!(view.fields[0].0, "url");
        assert_eq!(view.fields[2], ("created".to_string(), "string".to_string()));
    }

    #[test]
    fn test_column_type_edit_writes_back() {
        let (emitter, sub) = change_channel(InstanceId::next());
        let mut node = SourceNode::new(PluginKind::CsvDataframeSource);
        node.attach(emitter);
        node.set_data(csv_record()).unwrap();

        let changed = node
            .apply(NodeEdit::SetColumnType {
                column: "created".into(),
                column_type: "datetime".into(),
            })
            .unwrap();
        assert!(changed);
        assert_eq!(
            node.data().pointer("/source/schema/columns/1/type"),
            Some(json!("datetime"))
        );
        assert_eq!(
            node.data().pointer("/source/url"),
            Some(json!("analitico://datasets/ds_1/data/csv"))
        );
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn test_raw_edit_on_source_url() {
        let mut node = SourceNode::new(PluginKind::DatasetSource);
        node.set_data(PluginKind::DatasetSource.new_record()).unwrap();
        node.apply(NodeEdit::SetValue {
            pointer: "/source/url".into(),
            value: json!("analitico://datasets/ds_2"),
        })
        .unwrap();
        assert_eq!(
            node.data().pointer("/source/url"),
            Some(json!("analitico://datasets/ds_2"))
        );
    }

    #[test]
    fn test_failed_edit_leaves_record() {
        let mut node = SourceNode::new(PluginKind::CsvDataframeSource);
        node.set_data(csv_record()).unwrap();
        assert!(node
            .apply(NodeEdit::SetColumnType {
                column: "missing".into(),
                column_type: "float".into(),
            })
            .is_err());
        assert_eq!(node.data(), csv_record());
    }
}

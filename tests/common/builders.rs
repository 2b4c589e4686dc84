//! Test data builders for plugin records and items

use analitico_pipeline::pipeline::{PluginKind, PluginRecord};
use serde_json::{json, Value};

/// Builder for creating test plugin records
pub struct RecordBuilder {
    record: PluginRecord,
}

impl RecordBuilder {
    pub fn new(kind: PluginKind) -> Self {
        Self {
            record: kind.new_record(),
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            record: PluginRecord::new(name),
        }
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.record.payload.insert(key.to_string(), value);
        self
    }

    pub fn child(mut self, child: PluginRecord) -> Self {
        self.record.plugins.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn children(mut self, children: Vec<PluginRecord>) -> Self {
        self.record.plugins = Some(children);
        self
    }

    pub fn build(self) -> PluginRecord {
        self.record
    }
}

/// CSV source with a small schema
pub fn source() -> PluginRecord {
    RecordBuilder::new(PluginKind::CsvDataframeSource)
        .field(
            "source",
            json!({
                "url": "analitico://datasets/ds_boston/data/csv",
                "schema": { "columns": [
                    { "name": "crim", "type": "float" },
                    { "name": "chas", "type": "integer" }
                ] }
            }),
        )
        .build()
}

/// Transform with a tag so list positions can be told apart
pub fn transform(tag: &str) -> PluginRecord {
    RecordBuilder::new(PluginKind::TransformDataframe)
        .field("tag", json!(tag))
        .field("schema", json!({ "columns": [ { "name": "crim", "type": "float" } ] }))
        .build()
}

pub fn code(snippet: &str) -> PluginRecord {
    RecordBuilder::new(PluginKind::CodeDataframe)
        .field("code", json!(snippet))
        .build()
}

/// Dataframe pipeline (source-first rule) holding `children`
pub fn dataframe_pipeline(children: Vec<PluginRecord>) -> PluginRecord {
    RecordBuilder::new(PluginKind::DataframePipeline)
        .children(children)
        .build()
}

/// Plain pipeline (unrestricted rule) holding `children`
pub fn plain_pipeline(children: Vec<PluginRecord>) -> PluginRecord {
    RecordBuilder::new(PluginKind::Pipeline)
        .children(children)
        .build()
}

/// Parent item carrying `plugin` in its attributes
pub fn item(id: &str, title: Option<&str>, plugin: Option<PluginRecord>) -> Value {
    let mut attributes = serde_json::Map::new();
    if let Some(title) = title {
        attributes.insert("title".to_string(), json!(title));
    }
    if let Some(plugin) = plugin {
        attributes.insert(
            "plugin".to_string(),
            serde_json::to_value(plugin).expect("record serializes"),
        );
    }
    json!({ "id": id, "attributes": attributes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new(PluginKind::RecipePipeline)
            .field("title", json!("Train"))
            .child(code("df"))
            .build();

        assert_eq!(record.name, "analitico.plugin.RecipePipelinePlugin");
        assert_eq!(record.children().len(), 1);
        assert_eq!(record.get("title"), Some(&json!("Train")));
    }
}

//! CodeNode: Code snippet applied to a dataframe.

use crate::error::Result;
use crate::pipeline::channel::ChangeEmitter;
use crate::pipeline::node::{NodeEdit, ViewNode};
use crate::pipeline::nodes::NodeCore;
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::PluginRecord;
use serde_json::Value;

pub struct CodeNode {
    core: NodeCore,
}

impl CodeNode {
    pub fn new() -> Self {
        Self {
            core: NodeCore::new(),
        }
    }

    pub fn kind(&self) -> PluginKind {
        PluginKind::CodeDataframe
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

    /// Current snippet, empty when none is set.
    pub fn code(&self) -> &str {
        self.core
            .record()
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn render(&self) -> ViewNode {
        let code = self.code();
        let fields = if code.is_empty() {
            vec![("code".to_string(), "(empty)".to_string())]
        } else {
            let first = code.lines().next().unwrap_or("").to_string();
            vec![
                ("code".to_string(), first),
                ("lines".to_string(), code.lines().count().to_string()),
            ]
        };
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
            NodeEdit::SetCode(code) => {
                let mut candidate = self.core.record().clone();
                candidate.payload.insert("code".to_string(), Value::String(code));
                Ok(self.core.commit(candidate))
            }
            other => self.core.apply_raw(variant, other),
        }
    }
}

impl Default for CodeNode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_code() {
        let mut node = CodeNode::new();
        node.set_data(PluginKind::CodeDataframe.new_record()).unwrap();
        assert_eq!(node.render().fields[0].1, "(empty)");

        assert!(node
            .apply(NodeEdit::SetCode("df = df[df.price > 0]\ndf['x'] = 1".into()))
            .unwrap());
        assert_eq!(node.code(), "df = df[df.price > 0]\ndf['x'] = 1");
        let view = node.render();
        assert_eq!(view.fields[0].1, "df = df[df.price > 0]");
        assert_eq!(view.fields[1].1, "2");
    }

    #[test]
    fn test_same_code_not_a_change() {
        let mut node = CodeNode::new();
        node.set_data(PluginKind::CodeDataframe.new_record()).unwrap();
        assert!(node.apply(NodeEdit::SetCode("df".into())).unwrap());
        assert!(!node.apply(NodeEdit::SetCode("df".into())).unwrap());
    }
}

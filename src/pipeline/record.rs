//! Serializable plugin records.
//!
//! A record is the persisted shape of one plugin:
//!
//! ```json
//! { "type": "analitico/plugin", "name": "analitico.plugin.<ClassName>",
//!   "plugins": [ ... ], ...plugin specific fields }
//! ```
//!
//! The root of a pipeline is itself a record whose `plugins` field holds the
//! ordered children, so pipelines nest recursively. Everything besides
//! `type`, `name` and `plugins` is kept in `payload` and only interpreted by
//! the variant the record resolves to.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type tag carried by every plugin record.
pub const PLUGIN_TYPE: &str = "analitico/plugin";

/// Namespace prefix of plugin symbolic names.
pub const PLUGIN_NAMESPACE: &str = "analitico.plugin";

/// Position of the class name when a symbolic name is split on `.`.
pub const CLASS_SEGMENT: usize = 2;

fn default_type_tag() -> String {
    PLUGIN_TYPE.to_string()
}

/// One persisted plugin: type tag, symbolic name, optional children and an
/// opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    #[serde(rename = "type", default = "default_type_tag")]
    pub type_tag: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginRecord>>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// The root record of a pipeline. Same shape as any other plugin.
pub type PipelineRecord = PluginRecord;

impl Default for PluginRecord {
    fn default() -> Self {
        Self {
            type_tag: default_type_tag(),
            name: String::new(),
            plugins: None,
            payload: Map::new(),
        }
    }
}

/// Extract the class name from a dotted symbolic name.
///
/// `analitico.plugin.CsvDataframeSourcePlugin` yields `CsvDataframeSourcePlugin`.
/// Names with fewer segments yield an empty string.
pub fn class_name_of(symbolic_name: &str) -> &str {
    symbolic_name.split('.').nth(CLASS_SEGMENT).unwrap_or("")
}

impl PluginRecord {
    /// Create a record with the given symbolic name and an empty payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a record that holds an (empty) ordered list of children.
    pub fn pipeline(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugins: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Builder-style payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Builder-style child append. Turns the record into a pipeline if needed.
    pub fn with_child(mut self, child: PluginRecord) -> Self {
        self.plugins.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Class name segment of the symbolic name.
    pub fn class_name(&self) -> &str {
        class_name_of(&self.name)
    }

    /// Structural source-type predicate: substring match of `marker` on the
    /// symbolic name. Decidable without resolving the plugin.
    pub fn is_source(&self, marker: &str) -> bool {
        !marker.is_empty() && self.name.contains(marker)
    }

    /// Children of this record, empty when it is not a pipeline.
    pub fn children(&self) -> &[PluginRecord] {
        self.plugins.as_deref().unwrap_or(&[])
    }

    /// Payload field lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Parse a record out of an arbitrary JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PipelineError::InvalidRecord(e.to_string()))
    }

    /// Convert back into a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Read the value at an RFC 6901 pointer, relative to the whole record.
    pub fn pointer(&self, pointer: &str) -> Option<Value> {
        let value = serde_json::to_value(self).ok()?;
        value.pointer(pointer).cloned()
    }

    /// Return a copy of this record with `value` written at `pointer`.
    ///
    /// Intermediate objects are created as needed. The result must still be
    /// a valid record (string `name`, string `type`).
    pub fn with_pointer(&self, pointer: &str, value: Value) -> Result<Self> {
        let mut root = self.to_value()?;
        set_pointer(&mut root, pointer, value)?;
        Self::from_value(root)
    }
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Write `value` at an RFC 6901 pointer inside `root`.
///
/// Missing object members along the way are created; `null` members are
/// replaced by objects. Array tokens must address an existing element, except
/// for the last token which may also be `-` or the array length (append).
pub fn set_pointer(root: &mut Value, pointer: &str, value: Value) -> Result<()> {
    if pointer.is_empty() {
        *root = value;
        return Ok(());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PipelineError::InvalidPointer(format!(
            "'{}' must start with '/'",
            pointer
        )));
    };

    let tokens: Vec<String> = rest.split('/').map(unescape_token).collect();
    let (last, parents) = tokens
        .split_last()
        .ok_or_else(|| PipelineError::InvalidPointer(pointer.to_string()))?;

    let mut current = root;
    for token in parents {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let len = items.len();
                let idx = token
                    .parse::<usize>()
                    .ok()
                    .filter(|i| *i < len)
                    .ok_or_else(|| {
                        PipelineError::InvalidPointer(format!(
                            "'{}': no element '{}' in array of {}",
                            pointer, token, len
                        ))
                    })?;
                &mut items[idx]
            }
            _ => {
                return Err(PipelineError::InvalidPointer(format!(
                    "'{}': '{}' is not a container",
                    pointer, token
                )))
            }
        };
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let len = items.len();
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            match last.parse::<usize>() {
                Ok(i) if i < len => {
                    items[i] = value;
                    Ok(())
                }
                Ok(i) if i == len => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(PipelineError::InvalidPointer(format!(
                    "'{}': no element '{}' in array of {}",
                    pointer, last, len
                ))),
            }
        }
        _ => Err(PipelineError::InvalidPointer(format!(
            "'{}': parent of '{}' is not a container",
            pointer, last
        ))),
    }
}

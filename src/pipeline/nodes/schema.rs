//! Dataframe schema editing shared by source and transform variants.
//!
//! A schema is stored in the payload as `{ "columns": [ { "name", "type", "index"? } ] }`.
//! Unknown column attributes are preserved.

use crate::error::{PipelineError, Result};
use crate::pipeline::node::NodeEdit;
use crate::pipeline::record::PluginRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column data types understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Timespan,
    Category,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Datetime => "datetime",
            ColumnType::Timespan => "timespan",
            ColumnType::Category => "category",
        }
    }

    pub fn all() -> &'static [ColumnType] {
        &[
            ColumnType::String,
            ColumnType::Integer,
            ColumnType::Float,
            ColumnType::Boolean,
            ColumnType::Datetime,
            ColumnType::Timespan,
            ColumnType::Category,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == name)
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// One schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    /// Kept as a string so schemas written by newer backends still load.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub index: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type: Some(column_type.as_str().to_string()),
            index: false,
            extra: Map::new(),
        }
    }
}

/// Read the column list at `pointer`. Missing or null means no columns.
pub fn read_columns(record: &PluginRecord, pointer: &str) -> Result<Vec<Column>> {
    match record.pointer(pointer) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| PipelineError::InvalidRecord(format!("schema at '{}': {}", pointer, e))),
    }
}

/// Return a copy of `record` with `columns` written at `pointer`.
pub fn write_columns(record: &PluginRecord, pointer: &str, columns: &[Column]) -> Result<PluginRecord> {
    record.with_pointer(pointer, serde_json::to_value(columns)?)
}

fn position(columns: &[Column], variant: &'static str, name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| PipelineError::InvalidEdit {
            variant,
            message: format!("unknown column '{}'", name),
        })
}

/// Apply a column edit in place. Non-column edits are rejected.
pub fn apply_column_edit(columns: &mut Vec<Column>, variant: &'static str, edit: &NodeEdit) -> Result<()> {
    match edit {
        NodeEdit::SetColumnType {
            column,
            column_type,
        } => {
            let parsed = ColumnType::from_name(column_type).ok_or_else(|| PipelineError::InvalidEdit {
                variant,
                message: format!("unknown column type '{}'", column_type),
            })?;
            let idx = position(columns, variant, column)?;
            columns[idx].column_type = Some(parsed.as_str().to_string());
        }
        NodeEdit::RenameColumn { column, new_name } => {
            if new_name.is_empty() {
                return Err(PipelineError::InvalidEdit {
                    variant,
                    message: "column name cannot be empty".to_string(),
                });
            }
            let idx = position(columns, variant, column)?;
            if column != new_name && columns.iter().any(|c| &c.name == new_name) {
                return Err(PipelineError::InvalidEdit {
                    variant,
                    message: format!("column '{}' already exists", new_name),
                });
            }
            columns[idx].name = new_name.clone();
        }
        NodeEdit::DropColumn { column } => {
            let idx = position(columns, variant, column)?;
            columns.remove(idx);
        }
        NodeEdit::MoveColumn { column, to } => {
            let idx = position(columns, variant, column)?;
            if *to >= columns.len() {
                return Err(PipelineError::InvalidEdit {
                    variant,
                    message: format!("position {} out of range for {} columns", to, columns.len()),
                });
            }
            let moved = columns.remove(idx);
            columns.insert(*to, moved);
        }
        NodeEdit::SetIndexColumn { column } => {
            if let Some(name) = column {
                position(columns, variant, name)?;
            }
            for c in columns.iter_mut() {
                c.index = column.as_deref() == Some(c.name.as_str());
            }
        }
        other => return Err(super::unsupported(variant, other)),
    }
    Ok(())
}

/// `name: type` summary lines for rendering.
pub fn column_fields(columns: &[Column]) -> Vec<(String, String)> {
    columns
        .iter()
        .map(|c| {
            let mut ty = c.column_type.clone().unwrap_or_else(|| "?".to_string());
            if c.index {
                ty.push_str(" (index)");
            }
            (c.name.clone(), ty)
        })
        .collect()
}

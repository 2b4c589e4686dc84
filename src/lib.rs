//! # analitico-pipeline: plugin pipeline composition engine
//!
//! Represents a data-preparation workflow as an ordered chain of plugin
//! nodes, resolves each node's implementation by symbolic name, propagates
//! change notifications upward and enforces placement rules on structural
//! edits.
//!
//! ## Architecture
//!
//! - **Records**: `PluginRecord` is the persisted JSON shape; pipelines nest
//! - **Registry**: class name to variant, with a raw JSON fallback
//! - **Container**: live nodes, structural edits, change fan-out
//! - **Placement**: pluggable rules, configured per pipeline class
//! - **Document**: the owner side, a parent item carrying a pipeline
//!
//! ## Configuration
//!
//! Engine settings are stored in the platform-appropriate data directory
//! under `analitico-pipeline`:
//!
//! - **Linux**: `~/.local/share/analitico-pipeline/engine.toml`
//! - **macOS**: `~/Library/Application Support/analitico-pipeline/engine.toml`
//! - **Windows**: `%APPDATA%\analitico-pipeline\engine.toml`
//!
//! ## Example
//!
//! ```ignore
//! use analitico_pipeline::{EngineConfig, PipelineDocument, PipelineEnvironment, PluginKind};
//!
//! let config = EngineConfig::load_or_default();
//! let env = PipelineEnvironment::from_config(&config);
//! let mut doc = PipelineDocument::load(&env, item_json)?;
//!
//! if let Some(pipeline) = doc.pipeline_mut() {
//!     let accepted = pipeline.insert_at(1, PluginKind::CodeDataframe.new_record())?;
//! }
//! let item = doc.save_item()?;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use config::{EngineConfig, PlacementConfig, PlacementRule};
pub use document::{PipelineDocument, PlacementReport, SaveScheduler};
pub use error::{PipelineError, Result, ResultExt};
pub use pipeline::{
    NodeEdit, PipelineContainer, PipelineEnvironment, PipelineEvent, PluginKind, PluginRecord,
    PluginRegistry, ViewNode,
};

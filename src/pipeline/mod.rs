//! Plugin pipeline composition engine.
//!
//! A pipeline is an ordered chain of plugin records. The container resolves
//! each record to a live node through the registry, keeps one change channel
//! per live node, and asks a placement policy before every structural edit.
//!
//! # Architecture
//!
//! ```text
//!  PipelineRecord ──load──► PipelineContainer ──lookup──► PluginResolver
//!                               │    ▲                     (PluginRegistry)
//!                   instantiate │    │ NodeChange
//!                               ▼    │
//!                      [CSV Source] [Transform] [Pipeline ─► nested container]
//!                               │
//!                               └──► PipelineEvent::Changed ──► owner (autosave)
//! ```
//!
//! # Design
//!
//! - **Enum dispatch**: `BuiltinNode` for the built-in variants, `PluginNode`
//!   trait objects for variants registered from outside.
//! - **Never-failing resolution**: unknown names resolve to the raw JSON editor.
//! - **Instance-bound subscriptions**: a node's channel lives and dies with it.
//! - **Recursive records**: nested pipelines are plain `PluginRecord` trees.

pub mod channel;
pub mod container;
pub mod id;
pub mod node;
pub mod nodes;
pub mod placement;
pub mod plugin_kind;
pub mod record;
pub mod registry;

pub use channel::{change_channel, ChangeEmitter, ChangeSubscription, EventFanout, NodeChange, PipelineEvent};
pub use container::PipelineContainer;
pub use id::InstanceId;
pub use node::{AnyNode, BuiltinNode, NodeEdit, PluginNode, ViewNode};
pub use placement::{PlacementPolicy, SourceFirstPolicy, UnrestrictedPolicy};
pub use plugin_kind::{PluginKind, PluginRole};
pub use record::{class_name_of, PipelineRecord, PluginRecord, PLUGIN_NAMESPACE, PLUGIN_TYPE};
pub use registry::{NodeFactory, PipelineEnvironment, PluginRegistry, PluginResolver, PluginVariant};

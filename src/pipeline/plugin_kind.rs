//! Catalogue of known plugin classes.
//!
//! Used by the registry to build its table and by editors to offer an
//! "add plugin" menu.

use crate::pipeline::record::{PluginRecord, PLUGIN_NAMESPACE};
use serde::{Deserialize, Serialize};

/// Role a plugin plays in the conceptual data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginRole {
    /// Originates data; constrained to position 0 in dataframe pipelines.
    Source,
    /// Takes a dataframe and returns a dataframe.
    Transform,
    /// Groups other plugins into an ordered chain.
    Pipeline,
    /// Generic JSON editor used when no specific variant exists.
    Raw,
}

/// Plugin classes this client knows how to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginKind {
    // Pipelines
    /// Linear chain of plugins.
    Pipeline,
    /// Chain producing a dataframe; sources must come first.
    DataframePipeline,
    /// Chain used to train a model.
    RecipePipeline,
    /// Chain used to serve predictions.
    EndpointPipeline,

    // Sources
    /// Dataframe read from a CSV file.
    CsvDataframeSource,
    /// Dataframe read from another dataset.
    DatasetSource,

    // Transforms
    /// Applies a schema to a dataframe.
    TransformDataframe,
    /// Applies a code snippet to a dataframe.
    CodeDataframe,
    /// Expands datetime columns.
    AugmentDates,

    /// Fallback generic JSON editor.
    RawJson,
}

impl PluginKind {
    /// Class name as used in symbolic names.
    pub fn class_name(&self) -> &'static str {
        match self {
            PluginKind::Pipeline => "PipelinePlugin",
            PluginKind::DataframePipeline => "DataframePipelinePlugin",
            PluginKind::RecipePipeline => "RecipePipelinePlugin",
            PluginKind::EndpointPipeline => "EndpointPipelinePlugin",
            PluginKind::CsvDataframeSource => "CsvDataframeSourcePlugin",
            PluginKind::DatasetSource => "DatasetSourcePlugin",
            PluginKind::TransformDataframe => "TransformDataframePlugin",
            PluginKind::CodeDataframe => "CodeDataframePlugin",
            PluginKind::AugmentDates => "AugmentDatesPlugin",
            PluginKind::RawJson => "RawJsonPlugin",
        }
    }

    /// Look a kind up by class name.
    pub fn from_class_name(class_name: &str) -> Option<Self> {
        Self::every()
            .iter()
            .copied()
            .find(|k| k.class_name() == class_name)
    }

    /// Full dotted symbolic name, e.g. `analitico.plugin.PipelinePlugin`.
    pub fn symbolic_name(&self) -> String {
        format!("{}.{}", PLUGIN_NAMESPACE, self.class_name())
    }

    /// Get the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            PluginKind::Pipeline => "Pipeline",
            PluginKind::DataframePipeline => "Dataframe Pipeline",
            PluginKind::RecipePipeline => "Recipe Pipeline",
            PluginKind::EndpointPipeline => "Endpoint Pipeline",
            PluginKind::CsvDataframeSource => "CSV Source",
            PluginKind::DatasetSource => "Dataset Source",
            PluginKind::TransformDataframe => "Transform Dataframe",
            PluginKind::CodeDataframe => "Code",
            PluginKind::AugmentDates => "Augment Dates",
            PluginKind::RawJson => "Raw JSON",
        }
    }

    pub fn role(&self) -> PluginRole {
        match self {
            PluginKind::Pipeline
            | PluginKind::DataframePipeline
            | PluginKind::RecipePipeline
            | PluginKind::EndpointPipeline => PluginRole::Pipeline,
            PluginKind::CsvDataframeSource | PluginKind::DatasetSource => PluginRole::Source,
            PluginKind::TransformDataframe
            | PluginKind::CodeDataframe
            | PluginKind::AugmentDates => PluginRole::Transform,
            PluginKind::RawJson => PluginRole::Raw,
        }
    }

    /// Check if this kind is a source.
    pub fn is_source(&self) -> bool {
        self.role() == PluginRole::Source
    }

    /// Check if this kind holds child plugins.
    pub fn is_pipeline(&self) -> bool {
        self.role() == PluginRole::Pipeline
    }

    /// Every kind, including the fallback editor.
    pub fn every() -> &'static [PluginKind] {
        &[
            PluginKind::Pipeline,
            PluginKind::DataframePipeline,
            PluginKind::RecipePipeline,
            PluginKind::EndpointPipeline,
            PluginKind::CsvDataframeSource,
            PluginKind::DatasetSource,
            PluginKind::TransformDataframe,
            PluginKind::CodeDataframe,
            PluginKind::AugmentDates,
            PluginKind::RawJson,
        ]
    }

    /// Kinds a user can insert into a pipeline.
    pub fn all() -> &'static [PluginKind] {
        &Self::every()[..Self::every().len() - 1]
    }

    /// Blank record of this kind, ready to be inserted.
    pub fn new_record(&self) -> PluginRecord {
        if self.is_pipeline() {
            PluginRecord::pipeline(self.symbolic_name())
        } else {
            PluginRecord::new(self.symbolic_name())
        }
    }

    /// Get a detailed description of what this plugin does.
    pub fn description(&self) -> &'static str {
        match self {
            PluginKind::Pipeline =>
                "Chains plugins into a linear workflow.\n\
                 Each plugin's output feeds the next one.",

            PluginKind::DataframePipeline =>
                "Chains plugins that produce a dataframe.\n\
                 The first plugin must be a source.",

            PluginKind::RecipePipeline =>
                "Chains plugins that train a model\n\
                 from a prepared dataframe.",

            PluginKind::EndpointPipeline =>
                "Chains plugins that turn incoming\n\
                 records into predictions.",

            PluginKind::CsvDataframeSource =>
                "Reads a dataframe from a CSV file.\n\
                 Column types come from the source schema.",

            PluginKind::DatasetSource =>
                "Reads a dataframe from another dataset.",

            PluginKind::TransformDataframe =>
                "Applies a schema to a dataframe.\n\
                 Drop, rename, retype and reorder columns.\n\
                 Can promote a column to index.",

            PluginKind::CodeDataframe =>
                "Runs a short code snippet on the dataframe.\n\
                 The dataframe is available as `df`.",

            PluginKind::AugmentDates =>
                "Expands datetime columns into year, month,\n\
                 day, dayofweek, hour and minute columns.",

            PluginKind::RawJson =>
                "Edits the plugin settings as raw JSON.",
        }
    }
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

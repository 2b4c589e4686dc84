//! Placement rule configuration.
//!
//! Which placement rule a pipeline follows is configured per pipeline class
//! instead of being hard-coded per kind:
//!
//! ```toml
//! [placement]
//! default_rule = "unrestricted"
//!
//! [placement.rules]
//! DataframePipelinePlugin = "source_first"
//! ```

use crate::pipeline::placement::{PlacementPolicy, SourceFirstPolicy, UnrestrictedPolicy};
use crate::pipeline::plugin_kind::PluginKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement rule a pipeline class follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRule {
    /// Any in-range insert or move is accepted.
    #[default]
    Unrestricted,
    /// Position 0 is reserved for source plugins, every other position for
    /// non-source plugins.
    SourceFirst,
}

impl PlacementRule {
    /// Build the policy object for this rule.
    pub fn policy(&self, source_marker: &str) -> Box<dyn PlacementPolicy> {
        match self {
            PlacementRule::Unrestricted => Box::new(UnrestrictedPolicy),
            PlacementRule::SourceFirst => Box::new(SourceFirstPolicy::new(source_marker)),
        }
    }
}

/// Placement rule per pipeline class name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Rule for classes without an entry in `rules`
    #[serde(default)]
    pub default_rule: PlacementRule,

    /// Class name (e.g. `DataframePipelinePlugin`) to rule
    #[serde(default)]
    pub rules: BTreeMap<String, PlacementRule>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            PluginKind::DataframePipeline.class_name().to_string(),
            PlacementRule::SourceFirst,
        );
        Self {
            default_rule: PlacementRule::Unrestricted,
            rules,
        }
    }
}

impl PlacementConfig {
    /// Same rule for every class.
    pub fn uniform(rule: PlacementRule) -> Self {
        Self {
            default_rule: rule,
            rules: BTreeMap::new(),
        }
    }

    pub fn rule_for(&self, class_name: &str) -> PlacementRule {
        self.rules
            .get(class_name)
            .copied()
            .unwrap_or(self.default_rule)
    }

    pub fn set_rule(&mut self, class_name: impl Into<String>, rule: PlacementRule) {
        self.rules.insert(class_name.into(), rule);
    }
}

//! Engine configuration.

use rill_eval::InterpreterOptions;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Settings for an [`Engine`](crate::Engine). Every field has a default, so
/// a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// File name reported in parse diagnostics.
    pub source_name: String,
    /// Install the built-in globals (`Object`, `Array`, `Error`, ...).
    pub prelude: bool,
    /// Call depth at which a `RangeError` is thrown. `None` is unbounded.
    pub max_call_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_name: "<script>".to_string(),
            prelude: true,
            max_call_depth: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        // A struct of strings, bools and integers always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub(crate) fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            prelude: self.prelude,
            max_call_depth: self.max_call_depth,
        }
    }
}

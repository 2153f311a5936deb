//! Typed, versioned candidate capability flags.
//!
//! Capabilities are persisted as JSONB but always round-trip through this
//! struct so every writer produces the same shape. `schema_version` lets a
//! future migration evolve the flags without guessing what an old row meant;
//! unknown fields are ignored and missing fields default to `false`.

use crate::error::CoreError;

/// Current capability schema version, stamped into every serialized value.
pub const CAPABILITIES_SCHEMA_VERSION: i32 = 1;

/// Feature flags a candidate declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Capabilities {
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    /// Candidate can emit strict JSON output on request.
    #[serde(default)]
    pub json_mode: bool,
    /// Candidate supports tool / function calling.
    #[serde(default)]
    pub tool_use: bool,
    /// Candidate accepts image input.
    #[serde(default)]
    pub vision: bool,
}

fn default_schema_version() -> i32 {
    CAPABILITIES_SCHEMA_VERSION
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            schema_version: CAPABILITIES_SCHEMA_VERSION,
            json_mode: false,
            tool_use: false,
            vision: false,
        }
    }
}

impl Capabilities {
    /// Parse capabilities from a stored JSONB value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Validation(format!("invalid capabilities payload: {e}")))
    }

    /// Serialize for JSONB storage, always stamping the current schema version.
    pub fn to_value(&self) -> serde_json::Value {
        let mut caps = *self;
        caps.schema_version = CAPABILITIES_SCHEMA_VERSION;
        serde_json::json!(caps)
    }

    /// Whether these flags cover the given required set.
    pub fn covers(&self, needs_json: bool, needs_tools: bool, needs_vision: bool) -> bool {
        (!needs_json || self.json_mode)
            && (!needs_tools || self.tool_use)
            && (!needs_vision || self.vision)
    }
}

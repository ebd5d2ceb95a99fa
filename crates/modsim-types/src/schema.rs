//! Introspection records for the state-manager registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Describes one supported state-manager function for form builders.
///
/// `inputs` is an ordered list of single-entry maps (`{name: type}`) so the
/// argument order survives JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateManagerSchema {
    /// Registry name of the function.
    pub function_name: String,
    /// Parameters in call order, each `{name: type}`.
    pub inputs: Vec<BTreeMap<String, String>>,
    /// Type name of the returned value.
    pub output_type: String,
}

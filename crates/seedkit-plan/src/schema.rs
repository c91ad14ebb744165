use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Plan;

/// Emit the JSON Schema for plan files.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(Plan)
}

/// JSON Schema as a `serde_json::Value`, ready for validation.
pub fn plan_json_schema_value() -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(plan_json_schema())
}

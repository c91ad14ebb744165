//! Plan contracts and validation for fixture seeding.
//!
//! A plan is pure data: how many users to create, which accounts to open for
//! each of them and which operations to record on each account.

pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{AccountPlan, OperationCountPlan, Plan, PlanTotals, UsersPlan};
pub use schema::plan_json_schema;
pub use validate::{
    ValidatedPlan, load_plan_file, validate_plan, validate_plan_json, validate_plan_structure,
};

pub use seedkit_core::{AccountKind, OperationKind};

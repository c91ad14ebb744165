use std::collections::HashMap;
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::{Plan, PlanTotals};
use crate::schema::plan_json_schema_value;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: Plan,
    pub totals: PlanTotals,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Check the invariants that the type system cannot express.
pub fn validate_plan_structure(plan: &Plan) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.is_empty() {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "users_zero",
            "/users/count",
            "plan does not create any user",
            Some("set users.count to a positive integer".to_string()),
        ));
    }

    let mut seen: HashMap<_, usize> = HashMap::new();
    for (idx, account) in plan.users.accounts.iter().enumerate() {
        let base_path = format!("/users/accounts/{idx}");

        if let Some(first) = seen.insert(account.kind, idx) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_account_kind",
                format!("{base_path}/kind"),
                format!(
                    "account kind '{}' is already planned at /users/accounts/{first}",
                    account.kind
                ),
                Some("merge the entries and add their counts".to_string()),
            ));
        }

        if account.count == 0 {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "account_count_zero",
                format!("{base_path}/count"),
                format!("no '{}' account will be opened", account.kind),
                None,
            ));
            if !account.operations.is_empty() {
                report.push_warning(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "operations_unreachable",
                    format!("{base_path}/operations"),
                    "operations are planned for an account that is never opened",
                    None,
                ));
            }
        }

        for (kind, operation) in &account.operations {
            if operation.count == 0 {
                report.push_warning(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "operation_count_zero",
                    format!("{base_path}/operations/{kind}/count"),
                    format!("no '{kind}' operation will be recorded"),
                    None,
                ));
            }
        }
    }

    if plan.totals().is_none() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "totals_overflow",
            "/users",
            "planned item count does not fit in 64 bits",
            Some("lower the user or operation counts".to_string()),
        ));
    }

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = match validate_plan_json(plan_json, plan_schema) {
        Ok(report) => report,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: Plan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            return Err(ValidationReport::single_error(
                "invalid_plan_json",
                "/",
                err.to_string(),
            ));
        }
    };

    let report = validate_plan_structure(&plan);
    if !report.is_ok() {
        return Err(report);
    }

    let totals = plan
        .totals()
        .ok_or_else(|| ValidationReport::single_error("totals_overflow", "/users", "overflow"))?;

    Ok(ValidatedPlan {
        plan,
        totals,
        warnings: report.warnings,
    })
}

/// Read a JSON plan file and validate it against the built-in plan schema.
pub fn load_plan_file(path: &Path) -> Result<ValidatedPlan, PlanError> {
    let contents = std::fs::read_to_string(path)?;
    let plan_json: Value = serde_json::from_str(&contents)?;
    let plan_schema = plan_json_schema_value()?;
    validate_plan(&plan_json, &plan_schema).map_err(PlanError::Invalid)
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountPlan, UsersPlan};
    use seedkit_core::{AccountKind, OperationKind};

    #[test]
    fn duplicate_account_kind_is_an_error() {
        let plan = Plan::new(
            UsersPlan::new(1)
                .with_account(AccountPlan::new(AccountKind::Deposit, 1))
                .with_account(AccountPlan::new(AccountKind::Deposit, 2)),
        );
        let report = validate_plan_structure(&plan);
        assert!(!report.is_ok());
        assert_eq!(report.errors[0].code, "duplicate_account_kind");
        assert_eq!(report.errors[0].path, "/users/accounts/1/kind");
    }

    #[test]
    fn zero_counts_only_warn() {
        let plan = Plan::new(
            UsersPlan::new(0).with_account(
                AccountPlan::new(AccountKind::Savings, 0)
                    .with_operations(OperationKind::TopUp, 0),
            ),
        );
        let report = validate_plan_structure(&plan);
        assert!(report.is_ok());
        let codes: Vec<&str> = report.warnings.iter().map(|w| w.code.as_str()).collect();
        assert!(codes.contains(&"users_zero"));
        assert!(codes.contains(&"account_count_zero"));
        assert!(codes.contains(&"operations_unreachable"));
        assert!(codes.contains(&"operation_count_zero"));
    }
}

use std::env;
use std::path::PathBuf;

use seedkit_plan::{PlanError, ValidationReport, load_plan_file};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let plan_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: validate_plan <plan.json>")?;

    let validated = match load_plan_file(&plan_path) {
        Ok(validated) => validated,
        Err(PlanError::Invalid(report)) => {
            eprintln!("plan validation failed");
            print_report(&report);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "plan validated: {} items ({} users, {} accounts, {} operations)",
        validated.totals.items(),
        validated.totals.users,
        validated.totals.accounts,
        validated.totals.operations
    );
    if !validated.warnings.is_empty() {
        print_report(&ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        });
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in report.errors.iter().chain(&report.warnings) {
        eprintln!("{issue}");
    }
}

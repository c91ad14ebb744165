use std::fmt::Write;

use seedkit_engine::{LevelSummary, SeedReport};

/// Errors listed individually before the rest are summarized.
const MAX_LISTED_ERRORS: usize = 10;

pub fn render_report(report: &SeedReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "scenario {} (run {})",
        report.scenario_name, report.run_id
    );
    let _ = writeln!(
        out,
        "{:<12}{:>9}{:>9}{:>9}{:>11}",
        "level", "planned", "created", "failed", "cancelled"
    );
    for (label, level) in [
        ("users", &report.summary.users),
        ("accounts", &report.summary.accounts),
        ("operations", &report.summary.operations),
    ] {
        render_level(&mut out, label, level);
    }
    let _ = writeln!(out, "cards issued: {}", report.tree.card_count());

    if !report.errors.is_empty() {
        let _ = writeln!(out, "errors: {}", report.errors.len());
        for error in report
            .errors
            .iter()
            .filter(|error| !error.is_cancelled())
            .take(MAX_LISTED_ERRORS)
        {
            let _ = writeln!(out, "  {error}");
        }
        let failed = report.errors.iter().filter(|e| !e.is_cancelled()).count();
        if failed > MAX_LISTED_ERRORS {
            let _ = writeln!(out, "  ... and {} more", failed - MAX_LISTED_ERRORS);
        }
    }
    out
}

fn render_level(out: &mut String, label: &str, level: &LevelSummary) {
    let _ = writeln!(
        out,
        "{:<12}{:>9}{:>9}{:>9}{:>11}",
        label, level.planned, level.created, level.failed, level.cancelled
    );
}

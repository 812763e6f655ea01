use std::path::Path;
use std::process;

use dockcheck_core::verify_report;

use super::load_report;
use crate::{report_error, OutputFormat};

/// Replay a report's ledger and list every invariant it breaks.
/// Exits 1 when the report is inconsistent.
pub(crate) fn cmd_verify(path: &Path, output: OutputFormat, quiet: bool) {
    let report = match load_report(path) {
        Ok(r) => r,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let violations = verify_report(&report);

    match output {
        OutputFormat::Json => {
            let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            let result = serde_json::json!({
                "id": report.id,
                "status": report.status,
                "entries": report.action_history.len(),
                "consistent": violations.is_empty(),
                "violations": messages,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => {
            if violations.is_empty() {
                if !quiet {
                    println!(
                        "report {} is consistent ({} entries, status {})",
                        report.id,
                        report.action_history.len(),
                        report.status
                    );
                }
            } else {
                println!(
                    "report {}: {} violation(s)",
                    report.id,
                    violations.len()
                );
                for v in &violations {
                    println!("  - {}", v);
                }
            }
        }
    }

    if !violations.is_empty() {
        process::exit(1);
    }
}

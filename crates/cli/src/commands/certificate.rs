use std::path::Path;
use std::process;

use dockcheck_core::Timestamp;
use dockcheck_engine::certificate;
use time::format_description::well_known::Rfc3339;

use super::load_report;
use crate::{report_error, OutputFormat};

/// Print the certificate data for a report file.
pub(crate) fn cmd_certificate(path: &Path, output: OutputFormat, quiet: bool) {
    let report = match load_report(path) {
        Ok(r) => r,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let cert = certificate(&report);

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&cert)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => {
            let state = if cert.completed {
                "completed".to_string()
            } else {
                format!("not final, status {}", cert.status)
            };
            println!("Damage certificate {} ({})", cert.report_id, state);
            println!(
                "  Container {}  B/L {}  Vehicle {}  Date {}",
                cert.shipment.container_no,
                cert.shipment.bl_no,
                cert.shipment.vehicle_no,
                cert.shipment.report_date
            );
            for party in &cert.parties {
                println!(
                    "  {:<7} {:<12} damage: {}  signature: {}  signed: {}",
                    party.role.as_str(),
                    party.name.as_deref().unwrap_or("-"),
                    party.damage.as_deref().unwrap_or("-"),
                    party.signature.as_deref().unwrap_or("-"),
                    format_time(party.signed_at)
                );
            }
            if !cert.damage_photos.is_empty() {
                println!("  Photos: {}", cert.damage_photos.join(", "));
            }
        }
    }
}

fn format_time(at: Option<Timestamp>) -> String {
    at.and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_string())
}

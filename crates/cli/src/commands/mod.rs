pub(crate) mod certificate;
pub(crate) mod verify;

use std::path::Path;

use dockcheck_core::Report;

/// Read and parse a report JSON file.
pub(crate) fn load_report(path: &Path) -> Result<Report, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("error parsing report in '{}': {}", path.display(), e))
}

//! Application state shared across request handlers.

use crate::workflow::ReportService;

pub(crate) struct AppState {
    pub(crate) service: ReportService,
}

//! dockcheck-core: container damage report types and the action history ledger.
//!
//! The lifecycle engine, the storage backends and the API layer all share
//! these types. Nothing here performs I/O.
//!
//! # Public API
//!
//! - [`Report`] -- the report record, with its three [`PartySection`]s
//! - [`ReportStatus`], [`ActionType`], [`Role`] -- closed workflow enums
//! - [`ActionHistory`] / [`HistoryEntry`] -- the append-only ledger
//! - [`verify_report`] -- replay a report's ledger and list violated invariants

pub mod ledger;
pub mod types;
pub mod verify;

pub use ledger::{ActionHistory, HistoryEntry};
pub use types::{
    ActionType, PartySection, Report, ReportId, ReportStatus, Role, ShipmentInfo, Timestamp,
};
pub use verify::{verify_report, ConsistencyViolation};

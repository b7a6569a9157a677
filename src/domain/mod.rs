//! Core domain layer. No external I/O dependencies.
//!
//! Entities, calendar rules and errors live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod week;

pub use entities::{
    ContentItem, ContentRow, DigestDocument, DispatchReceipt, OutboundEmail, ReportingWeek,
    VocabEntry, WeekLabel,
};
pub use errors::DomainError;
pub use week::{compute_reporting_week, compute_week_label, format_day_label};

//! Read-side summaries for the dormitory bed tracker.
//!
//! This crate provides:
//! - [`Projection`] trait for folding the room listing into a view
//! - [`SummaryProjector`] for running projections against a schema store
//! - Grouped bed totals, the overall summary and the occupancy report

pub mod error;
pub mod projection;
pub mod projector;
pub mod views;

pub use error::{ProjectionError, Result};
pub use projection::Projection;
pub use projector::SummaryProjector;
pub use views::{
    AcTypeRow, AcTypeSummary, BedTotals, FloorAcRow, FloorAcSummary, FloorReport, FloorRow,
    FloorSummary, OccupancyReport, OverallSummary, RoomReport, RoomStatus,
};

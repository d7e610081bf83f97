//! Summary views over the room listing.

mod grouped;
mod occupancy;
mod overall;
mod totals;

pub use grouped::{AcTypeRow, AcTypeSummary, FloorAcRow, FloorAcSummary, FloorRow, FloorSummary};
pub use occupancy::{FloorReport, OccupancyReport, RoomReport, RoomStatus};
pub use overall::OverallSummary;
pub use totals::BedTotals;

//! Summary projector: runs projections over a fresh room listing.

use futures_util::StreamExt;
use schema_store::{RoomQuery, SchemaStore};

use crate::Result;
use crate::projection::Projection;
use crate::views::{
    AcTypeRow, AcTypeSummary, FloorAcRow, FloorAcSummary, FloorRow, FloorSummary,
    OccupancyReport, OverallSummary,
};

/// Computes summaries and reports from the schema store.
///
/// Nothing is cached: every call streams the rooms again, so results always
/// reflect the last committed write.
#[derive(Debug, Clone)]
pub struct SummaryProjector<S: SchemaStore> {
    store: S,
}

impl<S: SchemaStore> SummaryProjector<S> {
    /// Creates a new projector over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Runs a projection over every room matching `query`.
    #[tracing::instrument(skip(self), fields(projection = P::name()))]
    pub async fn project<P: Projection>(&self, query: RoomQuery) -> Result<P::Output> {
        let mut stream = self.store.list_rooms(query).await?;
        let mut projection = P::default();
        let mut rooms_scanned: u64 = 0;

        while let Some(result) = stream.next().await {
            let listing = result?;
            projection.handle(&listing);
            rooms_scanned += 1;
        }

        metrics::counter!("projection_runs_total", "projection" => P::name()).increment(1);
        tracing::debug!(rooms_scanned, "projection complete");

        Ok(projection.finish())
    }

    /// Room and bed totals per (floor, AC type), ordered by floor.
    pub async fn floor_ac_summary(&self) -> Result<Vec<FloorAcRow>> {
        self.project::<FloorAcSummary>(RoomQuery::new()).await
    }

    /// Room and bed totals across the whole building.
    pub async fn overall_summary(&self) -> Result<OverallSummary> {
        self.project::<OverallSummary>(RoomQuery::new()).await
    }

    /// Room and bed totals per floor.
    pub async fn floor_summary(&self) -> Result<Vec<FloorRow>> {
        self.project::<FloorSummary>(RoomQuery::new()).await
    }

    /// Room and bed totals per AC type.
    pub async fn ac_type_summary(&self) -> Result<Vec<AcTypeRow>> {
        self.project::<AcTypeSummary>(RoomQuery::new()).await
    }

    /// Every room grouped by floor with its bed assignments.
    pub async fn occupancy_report(&self) -> Result<OccupancyReport> {
        self.project::<OccupancyReport>(RoomQuery::new()).await
    }
}

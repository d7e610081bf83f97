//! Core projection trait.

use schema_store::RoomListing;

/// A read-side view folded from a pass over the room listing.
///
/// Projections hold no state between runs: each run starts from
/// `Default`, sees every matching room once and is then finished into its
/// output.
pub trait Projection: Default + Send {
    /// The value produced once every room has been seen.
    type Output: Send;

    /// Returns the name of this projection.
    fn name() -> &'static str;

    /// Folds one room into the projection.
    fn handle(&mut self, listing: &RoomListing);

    /// Consumes the projection, producing its output.
    fn finish(self) -> Self::Output;
}

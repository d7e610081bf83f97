use crate::{AcType, Room};

/// Filter for room listings.
///
/// All set criteria must match. `search` is a case-insensitive substring
/// matched against the floor, the room number or the AC type label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomQuery {
    /// Exact floor label.
    pub floor: Option<String>,

    /// Room climate type.
    pub ac_type: Option<AcType>,

    /// Free-text search term.
    pub search: Option<String>,
}

impl RoomQuery {
    /// Creates a query matching every room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a single floor.
    pub fn for_floor(floor: impl Into<String>) -> Self {
        Self {
            floor: Some(floor.into()),
            ..Default::default()
        }
    }

    /// Filters by floor.
    pub fn floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = Some(floor.into());
        self
    }

    /// Filters by AC type.
    pub fn ac_type(mut self, ac_type: AcType) -> Self {
        self.ac_type = Some(ac_type);
        self
    }

    /// Filters by free-text search. Blank terms are ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Returns true if the room satisfies every criterion.
    pub fn matches(&self, room: &Room) -> bool {
        if let Some(ref floor) = self.floor
            && &room.floor != floor
        {
            return false;
        }
        if let Some(ac_type) = self.ac_type
            && room.ac_type != ac_type
        {
            return false;
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = room.floor.to_lowercase().contains(&term)
                || room.room_number.to_lowercase().contains(&term)
                || room.ac_type.as_str().to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        true
    }
}

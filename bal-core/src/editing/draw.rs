//! Drawing tool preselected when an entity editor opens.

use crate::entity::Entity;

/// Map drawing mode for a street trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Draw a new trace from scratch.
    DrawLine,
    /// Adjust the vertices of an existing trace.
    Edit,
}

impl DrawMode {
    /// Mode to activate when editing `entity`.
    ///
    /// Only streets carry a trace; other entities are placed with markers and
    /// get no drawing mode.
    #[must_use]
    pub fn for_entity(entity: &Entity) -> Option<Self> {
        match entity {
            Entity::Street(street) if street.trace.is_some() => Some(Self::Edit),
            Entity::Street(_) => Some(Self::DrawLine),
            Entity::NamedPlace(_) | Entity::HouseNumber(_) => None,
        }
    }
}

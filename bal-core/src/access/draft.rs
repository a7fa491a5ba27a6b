//! Payloads submitted when creating or updating entities.

use geo::LineString;

use crate::entity::{EntityId, EntityKind, HouseNumber, ParcelId, Position};

use super::error::DraftError;

/// Largest house number accepted by the address database.
pub const MAX_HOUSE_NUMBER: u32 = 9_999;

/// Any entity payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDraft {
    /// Street payload.
    Street(StreetDraft),
    /// Named place payload.
    NamedPlace(NamedPlaceDraft),
    /// House number payload.
    HouseNumber(HouseNumberDraft),
}

impl EntityDraft {
    /// Kind of entity the draft produces.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Street(_) => EntityKind::Street,
            Self::NamedPlace(_) => EntityKind::NamedPlace,
            Self::HouseNumber(_) => EntityKind::HouseNumber,
        }
    }
}

impl From<StreetDraft> for EntityDraft {
    fn from(draft: StreetDraft) -> Self {
        Self::Street(draft)
    }
}

impl From<NamedPlaceDraft> for EntityDraft {
    fn from(draft: NamedPlaceDraft) -> Self {
        Self::NamedPlace(draft)
    }
}

impl From<HouseNumberDraft> for EntityDraft {
    fn from(draft: HouseNumberDraft) -> Self {
        Self::HouseNumber(draft)
    }
}

fn require_name(name: &str) -> Result<String, DraftError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DraftError::BlankName);
    }
    Ok(name.to_owned())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Street payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetDraft {
    name: String,
    trace: Option<LineString<f64>>,
}

impl StreetDraft {
    /// Validate and construct a street payload.
    pub fn new(name: &str) -> Result<Self, DraftError> {
        Ok(Self {
            name: require_name(name)?,
            trace: None,
        })
    }

    /// Attach a traced geometry.
    #[must_use]
    pub fn with_trace(mut self, trace: LineString<f64>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Street name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Traced geometry.
    #[must_use]
    pub const fn trace(&self) -> Option<&LineString<f64>> {
        self.trace.as_ref()
    }
}

/// Named place payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPlaceDraft {
    name: String,
    positions: Vec<Position>,
    parcels: Vec<ParcelId>,
}

impl NamedPlaceDraft {
    /// Validate and construct a named place payload.
    pub fn new(name: &str) -> Result<Self, DraftError> {
        Ok(Self {
            name: require_name(name)?,
            positions: Vec::new(),
            parcels: Vec::new(),
        })
    }

    /// Replace the positions, typically one per marker on the map.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }

    /// Replace the referenced parcels.
    #[must_use]
    pub fn with_parcels<I>(mut self, parcels: I) -> Self
    where
        I: IntoIterator<Item = ParcelId>,
    {
        self.parcels = parcels.into_iter().collect();
        self
    }

    /// Name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positions.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Referenced parcels.
    #[must_use]
    pub fn parcels(&self) -> &[ParcelId] {
        &self.parcels
    }
}

/// House number payload.
///
/// Suffixes are stored lower-case and trimmed; blank suffixes and comments
/// are dropped.
///
/// # Examples
///
/// ```
/// use bal_core::{EntityId, HouseNumberDraft};
///
/// # fn main() -> Result<(), bal_core::DraftError> {
/// let draft = HouseNumberDraft::new(12, EntityId::from("v1"))?
///     .with_suffix("  BIS ")
///     .with_comment("");
/// assert_eq!(draft.suffix(), Some("bis"));
/// assert_eq!(draft.comment(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HouseNumberDraft {
    number: u32,
    suffix: Option<String>,
    street: EntityId,
    positions: Vec<Position>,
    parcels: Vec<ParcelId>,
    comment: Option<String>,
}

impl HouseNumberDraft {
    /// Validate and construct a house number payload.
    pub fn new(number: u32, street: EntityId) -> Result<Self, DraftError> {
        if number > MAX_HOUSE_NUMBER {
            return Err(DraftError::NumberOutOfRange {
                number,
                max: MAX_HOUSE_NUMBER,
            });
        }
        Ok(Self {
            number,
            suffix: None,
            street,
            positions: Vec::new(),
            parcels: Vec::new(),
            comment: None,
        })
    }

    /// Set the suffix, normalised to lower case.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = non_blank(suffix).map(|value| value.to_lowercase());
        self
    }

    /// Set the operator comment.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = non_blank(comment);
        self
    }

    /// Replace the positions; at most two are accepted.
    pub fn with_positions(mut self, positions: Vec<Position>) -> Result<Self, DraftError> {
        if positions.len() > HouseNumber::MAX_POSITIONS {
            return Err(DraftError::TooManyPositions {
                found: positions.len(),
                max: HouseNumber::MAX_POSITIONS,
            });
        }
        self.positions = positions;
        Ok(self)
    }

    /// Replace the referenced parcels.
    #[must_use]
    pub fn with_parcels<I>(mut self, parcels: I) -> Self
    where
        I: IntoIterator<Item = ParcelId>,
    {
        self.parcels = parcels.into_iter().collect();
        self
    }

    /// Numeric part.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Normalised suffix.
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Owning street.
    #[must_use]
    pub const fn street(&self) -> &EntityId {
        &self.street
    }

    /// Positions.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Referenced parcels.
    #[must_use]
    pub fn parcels(&self) -> &[ParcelId] {
        &self.parcels
    }

    /// Operator comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

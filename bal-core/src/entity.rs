//! Address entities edited within a session.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching
//! the conventions used by the map engine and the remote address database.

use std::fmt;

use geo::{Coord, LineString};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote address database.
///
/// Identifiers are unique within one entity kind. Uniqueness across kinds is
/// not guaranteed, which is why editing targets use [`EntityRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a cadastral parcel, e.g. `"94067000AB0012"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ParcelId(String);

impl ParcelId {
    /// Wrap a raw parcel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The three editable entity variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntityKind {
    /// A street ("voie").
    Street,
    /// A named place without house numbers ("toponyme").
    NamedPlace,
    /// A house number attached to a street ("numéro").
    HouseNumber,
}

impl EntityKind {
    /// Probe order used when only an untagged id is known.
    pub const PROBE_ORDER: [Self; 3] = [Self::Street, Self::NamedPlace, Self::HouseNumber];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Street => "street",
            Self::NamedPlace => "named place",
            Self::HouseNumber => "house number",
        };
        f.write_str(label)
    }
}

/// An identifier tagged with the kind of entity it designates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRef {
    /// Entity variant.
    pub kind: EntityKind,
    /// Identifier within that variant's collection.
    pub id: EntityId,
}

impl EntityRef {
    /// Tag `id` with `kind`.
    pub fn new(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Reference a street.
    pub fn street(id: impl Into<EntityId>) -> Self {
        Self::new(EntityKind::Street, id)
    }

    /// Reference a named place.
    pub fn named_place(id: impl Into<EntityId>) -> Self {
        Self::new(EntityKind::NamedPlace, id)
    }

    /// Reference a house number.
    pub fn house_number(id: impl Into<EntityId>) -> Self {
        Self::new(EntityKind::HouseNumber, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// What a position designates on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionKind {
    /// Main entrance ("entrée"), the default for new house numbers.
    #[default]
    Entrance,
    /// Building footprint ("bâtiment").
    Building,
    /// Staircase entrance ("cage d'escalier").
    StaircaseEntrance,
    /// Unit entrance ("logement").
    UnitEntrance,
    /// Service access ("service technique").
    Service,
    /// Delivery area ("délivrance postale").
    DeliveryArea,
    /// Parcel centroid ("parcelle").
    Parcel,
    /// Projection on the street segment ("segment").
    Segment,
    /// Anything else ("inconnue").
    Other,
}

/// A located point attached to a house number or named place.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Longitude/latitude of the point.
    pub coordinate: Coord<f64>,
    /// Nature of the point.
    pub kind: PositionKind,
}

impl Position {
    /// Construct a position.
    #[must_use]
    pub const fn new(coordinate: Coord<f64>, kind: PositionKind) -> Self {
        Self { coordinate, kind }
    }
}

/// A street of the edited municipality.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Street {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Traced geometry, absent until the operator draws it.
    pub trace: Option<LineString<f64>>,
    /// Owning local address base.
    pub base_locale: EntityId,
    /// INSEE code of the municipality.
    pub commune: String,
}

/// A house number attached to a street.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HouseNumber {
    /// Identifier.
    pub id: EntityId,
    /// Numeric part, e.g. `12` in "12 bis".
    pub number: u32,
    /// Lower-case suffix, e.g. `"bis"`.
    pub suffix: Option<String>,
    /// Owning street.
    pub street: EntityId,
    /// One or two located points.
    pub positions: Vec<Position>,
    /// Referenced cadastral parcels.
    pub parcels: Vec<ParcelId>,
    /// Free-form operator comment.
    pub comment: Option<String>,
}

impl HouseNumber {
    /// Maximum number of positions a house number may carry.
    pub const MAX_POSITIONS: usize = 2;

    /// Whether another position may still be placed for this number.
    #[must_use]
    pub fn accepts_additional_position(&self) -> bool {
        self.positions.len() < Self::MAX_POSITIONS
    }

    /// Human-readable label, e.g. `"12 bis"`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{} {suffix}", self.number),
            None => self.number.to_string(),
        }
    }
}

/// A named place such as a hamlet or locality.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedPlace {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Located points.
    pub positions: Vec<Position>,
    /// Referenced cadastral parcels.
    pub parcels: Vec<ParcelId>,
}

/// Any editable entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Entity {
    /// A street.
    Street(Street),
    /// A named place.
    NamedPlace(NamedPlace),
    /// A house number.
    HouseNumber(HouseNumber),
}

impl Entity {
    /// Identifier of the wrapped entity.
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        match self {
            Self::Street(street) => &street.id,
            Self::NamedPlace(place) => &place.id,
            Self::HouseNumber(number) => &number.id,
        }
    }

    /// Variant of the wrapped entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Street(_) => EntityKind::Street,
            Self::NamedPlace(_) => EntityKind::NamedPlace,
            Self::HouseNumber(_) => EntityKind::HouseNumber,
        }
    }

    /// Tagged reference to the wrapped entity.
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id().clone())
    }

    /// Parcels referenced by the entity; streets reference none.
    #[must_use]
    pub fn parcels(&self) -> &[ParcelId] {
        match self {
            Self::Street(_) => &[],
            Self::NamedPlace(place) => &place.parcels,
            Self::HouseNumber(number) => &number.parcels,
        }
    }
}

/// Entities that can live in a [`crate::store::Collection`].
pub trait Identified {
    /// Kind shared by every value of the implementing type.
    const KIND: EntityKind;

    /// Identifier of the value.
    fn id(&self) -> &EntityId;

    /// Wrap the value into an [`Entity`].
    fn into_entity(self) -> Entity;
}

impl Identified for Street {
    const KIND: EntityKind = EntityKind::Street;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn into_entity(self) -> Entity {
        Entity::Street(self)
    }
}

impl Identified for NamedPlace {
    const KIND: EntityKind = EntityKind::NamedPlace;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn into_entity(self) -> Entity {
        Entity::NamedPlace(self)
    }
}

impl Identified for HouseNumber {
    const KIND: EntityKind = EntityKind::HouseNumber;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn into_entity(self) -> Entity {
        Entity::HouseNumber(self)
    }
}

/// One element of the derived map-feature collection rendered by the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapFeature {
    /// Feature identifier as published by the address database.
    pub id: String,
    /// Entity the feature was derived from, when known.
    pub entity: Option<EntityRef>,
    /// Rendered geometry.
    pub geometry: geo::Geometry<f64>,
}

/// Metadata of the local address base being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaseLocale {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the base has been published to the national address base.
    pub published: bool,
}

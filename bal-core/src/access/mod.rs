//! Boundary with the remote address database.
//!
//! The [`DataAccess`] trait abstracts fetching collections and submitting
//! mutations. Futures are `!Send`: the editor runs on a single cooperative
//! event loop, interleaving I/O with user input.

mod draft;
mod error;

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;

use crate::credential::Credential;
use crate::entity::{
    BaseLocale, Entity, EntityId, EntityKind, EntityRef, HouseNumber, MapFeature, NamedPlace,
    Street,
};

pub use draft::{EntityDraft, HouseNumberDraft, MAX_HOUSE_NUMBER, NamedPlaceDraft, StreetDraft};
pub use error::{DraftError, FetchError, MutationError, ValidationError};

/// Identifies one editing session: a municipality within a local address base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionScope {
    /// Local address base identifier.
    pub base_locale: String,
    /// INSEE code of the municipality.
    pub commune: String,
    /// Street whose house numbers are loaded, if any.
    pub street: Option<EntityId>,
}

impl SessionScope {
    /// Scope covering a municipality without a focused street.
    pub fn new(base_locale: impl Into<String>, commune: impl Into<String>) -> Self {
        Self {
            base_locale: base_locale.into(),
            commune: commune.into(),
            street: None,
        }
    }

    /// Focus the house-number collection on `street`.
    #[must_use]
    pub fn with_street(mut self, street: impl Into<EntityId>) -> Self {
        self.street = Some(street.into());
        self
    }
}

/// Collections held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    /// Streets of the municipality.
    Streets,
    /// Named places of the municipality.
    NamedPlaces,
    /// House numbers of the focused street.
    HouseNumbers,
    /// Map features derived server-side from the other collections.
    MapFeatures,
}

impl CollectionKind {
    /// Every collection, in reload order.
    pub const ALL: [Self; 4] = [
        Self::Streets,
        Self::NamedPlaces,
        Self::HouseNumbers,
        Self::MapFeatures,
    ];

    /// Collection holding entities of `kind`.
    #[must_use]
    pub const fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Street => Self::Streets,
            EntityKind::NamedPlace => Self::NamedPlaces,
            EntityKind::HouseNumber => Self::HouseNumbers,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Streets => "streets",
            Self::NamedPlaces => "named places",
            Self::HouseNumbers => "house numbers",
            Self::MapFeatures => "map features",
        };
        f.write_str(label)
    }
}

/// Payload returned by [`DataAccess::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionPayload {
    /// Streets.
    Streets(Vec<Street>),
    /// Named places.
    NamedPlaces(Vec<NamedPlace>),
    /// House numbers.
    HouseNumbers(Vec<HouseNumber>),
    /// Derived map features.
    MapFeatures(Vec<MapFeature>),
}

impl CollectionPayload {
    /// Collection the payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> CollectionKind {
        match self {
            Self::Streets(_) => CollectionKind::Streets,
            Self::NamedPlaces(_) => CollectionKind::NamedPlaces,
            Self::HouseNumbers(_) => CollectionKind::HouseNumbers,
            Self::MapFeatures(_) => CollectionKind::MapFeatures,
        }
    }

    /// Number of elements carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Streets(items) => items.len(),
            Self::NamedPlaces(items) => items.len(),
            Self::HouseNumbers(items) => items.len(),
            Self::MapFeatures(items) => items.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether a mutation creates a new entity or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationTarget {
    /// Create a new entity within the session scope.
    Create,
    /// Update the entity with this identifier.
    Update(EntityId),
}

/// Access to the remote address database.
///
/// Implementations return wholesale collections; the store never patches a
/// collection incrementally.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use bal_core::{
///     CollectionKind, CollectionPayload, Credential, DataAccess, Entity, EntityDraft,
///     EntityRef, FetchError, MutationError, MutationTarget, SessionScope,
/// };
///
/// struct EmptyDatabase;
///
/// #[async_trait(?Send)]
/// impl DataAccess for EmptyDatabase {
///     async fn fetch(
///         &self,
///         kind: CollectionKind,
///         _scope: &SessionScope,
///     ) -> Result<CollectionPayload, FetchError> {
///         Ok(match kind {
///             CollectionKind::Streets => CollectionPayload::Streets(Vec::new()),
///             CollectionKind::NamedPlaces => CollectionPayload::NamedPlaces(Vec::new()),
///             CollectionKind::HouseNumbers => CollectionPayload::HouseNumbers(Vec::new()),
///             CollectionKind::MapFeatures => CollectionPayload::MapFeatures(Vec::new()),
///         })
///     }
///
///     async fn mutate(
///         &self,
///         _target: &MutationTarget,
///         _draft: &EntityDraft,
///         _scope: &SessionScope,
///         _credential: &Credential,
///     ) -> Result<Entity, MutationError> {
///         Err(MutationError::MissingCredential)
///     }
///
///     async fn remove(
///         &self,
///         _target: &EntityRef,
///         _credential: &Credential,
///     ) -> Result<(), MutationError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait DataAccess {
    /// Fetch the complete `kind` collection for `scope`.
    async fn fetch(
        &self,
        kind: CollectionKind,
        scope: &SessionScope,
    ) -> Result<CollectionPayload, FetchError>;

    /// Fetch metadata of the local address base.
    ///
    /// The default implementation reports an unpublished base named after
    /// its identifier.
    async fn fetch_base_locale(&self, scope: &SessionScope) -> Result<BaseLocale, FetchError> {
        Ok(BaseLocale {
            id: scope.base_locale.clone(),
            name: scope.base_locale.clone(),
            published: false,
        })
    }

    /// Create or update an entity.
    async fn mutate(
        &self,
        target: &MutationTarget,
        draft: &EntityDraft,
        scope: &SessionScope,
        credential: &Credential,
    ) -> Result<Entity, MutationError>;

    /// Delete an entity.
    async fn remove(&self, target: &EntityRef, credential: &Credential)
    -> Result<(), MutationError>;
}

#[async_trait(?Send)]
impl<D: DataAccess + ?Sized> DataAccess for Rc<D> {
    async fn fetch(
        &self,
        kind: CollectionKind,
        scope: &SessionScope,
    ) -> Result<CollectionPayload, FetchError> {
        (**self).fetch(kind, scope).await
    }

    async fn fetch_base_locale(&self, scope: &SessionScope) -> Result<BaseLocale, FetchError> {
        (**self).fetch_base_locale(scope).await
    }

    async fn mutate(
        &self,
        target: &MutationTarget,
        draft: &EntityDraft,
        scope: &SessionScope,
        credential: &Credential,
    ) -> Result<Entity, MutationError> {
        (**self).mutate(target, draft, scope, credential).await
    }

    async fn remove(
        &self,
        target: &EntityRef,
        credential: &Credential,
    ) -> Result<(), MutationError> {
        (**self).remove(target, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::Street, CollectionKind::Streets)]
    #[case(EntityKind::NamedPlace, CollectionKind::NamedPlaces)]
    #[case(EntityKind::HouseNumber, CollectionKind::HouseNumbers)]
    fn collection_follows_entity_kind(#[case] kind: EntityKind, #[case] expected: CollectionKind) {
        assert_eq!(CollectionKind::of(kind), expected);
    }

    #[rstest]
    fn scope_focuses_street() {
        let scope = SessionScope::new("bal-1", "94067").with_street("v1");
        assert_eq!(scope.street, Some(EntityId::from("v1")));
    }
}

//! Editing-state core of the BAL address editor.
//!
//! The crate owns the in-memory collections of one editing session, the
//! single "being edited" pointer, the parcel selection mirrored into a map
//! engine, and the metric house-number suggestion. Remote data access, the
//! map engine and credential storage are consumed through the
//! [`DataAccess`], [`MapEngine`] and [`CredentialProvider`] traits.
//!
//! All asynchronous work runs on a single cooperative event loop: futures
//! are `!Send` and state lives in `Cell`/`RefCell`.

#![forbid(unsafe_code)]

pub mod access;
pub mod credential;
pub mod editing;
pub mod entity;
pub mod geometry;
pub mod selection;
pub mod store;
pub mod suggestion;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use access::{
    CollectionKind, CollectionPayload, DataAccess, DraftError, EntityDraft, FetchError,
    HouseNumberDraft, MAX_HOUSE_NUMBER, MutationError, MutationTarget, NamedPlaceDraft,
    SessionScope, StreetDraft, ValidationError,
};
pub use credential::{Credential, CredentialProvider};
pub use editing::{DrawMode, EditingCoordinator, EditingState, MutationReport};
pub use entity::{
    BaseLocale, Entity, EntityId, EntityKind, EntityRef, HouseNumber, Identified, MapFeature,
    NamedPlace, ParcelId, Position, PositionKind, Street,
};
pub use geometry::{PathProjection, distance_along, project_onto_path};
pub use selection::{
    FeatureId, FeatureState, FeatureTarget, FilterExpression, HoveredParcel, MapEngine,
    RenderedFeature, SelectionBridge, SelectionState, StyleEvent, toggled,
};
pub use store::{Collection, EntityStore, ReloadOutcome};
pub use suggestion::{MarkerSuggestionEngine, accepts_marker, marker_label, suggest_numero};

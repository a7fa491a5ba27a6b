//! Facade crate for the BAL address editor.
//!
//! This crate re-exports the editing core and exposes the HTTP data access
//! behind the `http` feature flag.

#![forbid(unsafe_code)]

pub use bal_core::{
    BaseLocale, CollectionKind, CollectionPayload, Credential, CredentialProvider, DataAccess,
    DrawMode, EditingCoordinator, EditingState, Entity, EntityDraft, EntityId, EntityKind,
    EntityRef, EntityStore, FetchError, FilterExpression, HouseNumber, HouseNumberDraft,
    MapEngine, MapFeature, MarkerSuggestionEngine, MutationError, MutationReport, MutationTarget,
    NamedPlace, NamedPlaceDraft, ParcelId, Position, PositionKind, ReloadOutcome, SelectionBridge,
    SelectionState, SessionScope, Street, StreetDraft, StyleEvent, ValidationError,
    suggest_numero,
};

#[cfg(feature = "http")]
pub use bal_data::{ClientBuildError, HttpDataAccess, HttpDataAccessConfig};

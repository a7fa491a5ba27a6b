//! Parcel selection mirrored into the map engine's visual state.
//!
//! The map engine drops every filter and feature-state flag when it reloads
//! its style, and signals this out of band. [`SelectionBridge`] owns the
//! selection state and reapplies it idempotently on each readiness event.

mod bridge;
mod engine;
mod filter;

pub use bridge::{HoveredParcel, SelectionBridge, SelectionState, toggled};
pub use engine::{FeatureId, FeatureState, FeatureTarget, MapEngine, RenderedFeature, StyleEvent};
pub use filter::FilterExpression;

/// Vector source holding cadastral parcels.
pub const CADASTRE_SOURCE: &str = "cadastre";
/// Layer of [`CADASTRE_SOURCE`] with one feature per parcel.
pub const PARCEL_SOURCE_LAYER: &str = "parcelles";
/// Layer drawing the selected parcels.
pub const HIGHLIGHT_LAYER: &str = "parcelle-highlighted";
/// Layers restricted to the edited municipality.
pub const COMMUNE_FILTER_LAYERS: [&str; 2] = ["parcelles", "parcelles-fill"];

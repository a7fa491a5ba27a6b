//! Interface to the third-party map rendering engine.

use std::rc::Rc;

use crate::entity::ParcelId;
use crate::selection::FilterExpression;

/// Ephemeral identifier the engine assigns to a rendered feature.
///
/// Valid for the current render only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

/// Key of the engine's feature-state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTarget {
    /// Vector source name.
    pub source: String,
    /// Layer within the source.
    pub source_layer: String,
    /// Rendered feature.
    pub feature: FeatureId,
}

/// Mutable visual flags of a rendered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureState {
    /// Whether the feature is drawn as hovered.
    pub hover: bool,
}

/// A feature returned by [`MapEngine::query_rendered_features`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeature {
    /// Parcel the feature draws.
    pub parcel: ParcelId,
    /// Engine-assigned id; absent when the source does not provide one.
    pub feature_id: Option<FeatureId>,
}

/// Style lifecycle notifications, delivered without payload at unspecified
/// frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleEvent {
    /// The style finished loading (`styledata`).
    StyleData,
    /// A style reload started (`styledataloading`); feature state and
    /// filters are being discarded.
    StyleDataLoading,
}

impl StyleEvent {
    /// Both events, in subscription order.
    pub const ALL: [Self; 2] = [Self::StyleData, Self::StyleDataLoading];
}

/// Operations the selection bridge needs from the map engine.
///
/// Calls are fire-and-forget: the engine applies them on its next frame and
/// reports nothing back.
pub trait MapEngine {
    /// Set the visual flags of a rendered feature.
    fn set_feature_state(&self, target: &FeatureTarget, state: FeatureState);

    /// Replace the filter of `layer`.
    fn set_filter(&self, layer: &str, filter: &FilterExpression);

    /// Features of `source`/`source_layer` currently rendered and matching
    /// `filter`.
    fn query_rendered_features(
        &self,
        source: &str,
        source_layer: &str,
        filter: &FilterExpression,
    ) -> Vec<RenderedFeature>;

    /// Whether the current style contains `layer`.
    fn has_layer(&self, layer: &str) -> bool;

    /// Start delivering `event` to the adapter.
    fn subscribe(&self, event: StyleEvent);

    /// Stop delivering `event`.
    fn unsubscribe(&self, event: StyleEvent);
}

impl<E: MapEngine + ?Sized> MapEngine for Rc<E> {
    fn set_feature_state(&self, target: &FeatureTarget, state: FeatureState) {
        (**self).set_feature_state(target, state);
    }

    fn set_filter(&self, layer: &str, filter: &FilterExpression) {
        (**self).set_filter(layer, filter);
    }

    fn query_rendered_features(
        &self,
        source: &str,
        source_layer: &str,
        filter: &FilterExpression,
    ) -> Vec<RenderedFeature> {
        (**self).query_rendered_features(source, source_layer, filter)
    }

    fn has_layer(&self, layer: &str) -> bool {
        (**self).has_layer(layer)
    }

    fn subscribe(&self, event: StyleEvent) {
        (**self).subscribe(event);
    }

    fn unsubscribe(&self, event: StyleEvent) {
        (**self).unsubscribe(event);
    }
}

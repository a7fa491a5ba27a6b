//! Keeps the engine's highlight state in step with the parcel selection.

use std::collections::BTreeSet;

use log::debug;

use crate::entity::ParcelId;
use crate::selection::{
    CADASTRE_SOURCE, COMMUNE_FILTER_LAYERS, FeatureId, FeatureState, FeatureTarget,
    FilterExpression, HIGHLIGHT_LAYER, MapEngine, PARCEL_SOURCE_LAYER, StyleEvent,
};

/// Parcel under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoveredParcel {
    /// Parcel identifier.
    pub parcel: ParcelId,
    /// Rendered feature carrying the hover flag; absent when the parcel was
    /// not rendered or the style reloaded since.
    pub feature: Option<FeatureId>,
}

/// Selection mode with its selected and hovered parcels.
///
/// While disabled, `selected` is empty and `hovered` is none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    enabled: bool,
    selected: BTreeSet<ParcelId>,
    hovered: Option<HoveredParcel>,
}

impl SelectionState {
    /// Whether selection mode is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Selected parcels.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<ParcelId> {
        &self.selected
    }

    /// Hovered parcel, if any.
    #[must_use]
    pub const fn hovered(&self) -> Option<&HoveredParcel> {
        self.hovered.as_ref()
    }
}

/// Return `selected` with `parcel` added when absent or removed when present.
///
/// ```
/// use std::collections::BTreeSet;
/// use bal_core::{ParcelId, toggled};
///
/// let parcel = ParcelId::from("94067000AB0012");
/// let once = toggled(&BTreeSet::new(), &parcel);
/// assert!(once.contains(&parcel));
/// assert!(toggled(&once, &parcel).is_empty());
/// ```
#[must_use]
pub fn toggled(selected: &BTreeSet<ParcelId>, parcel: &ParcelId) -> BTreeSet<ParcelId> {
    let mut next = selected.clone();
    if !next.remove(parcel) {
        next.insert(parcel.clone());
    }
    next
}

/// Mediates between the parcel selection and the map engine.
///
/// Every engine call is skipped while no engine is attached; the bridge then
/// tracks state only and catches up on the next [`on_style_ready`].
///
/// [`on_style_ready`]: Self::on_style_ready
#[derive(Debug)]
pub struct SelectionBridge<E> {
    engine: Option<E>,
    subscribed: bool,
    layer_ready: bool,
    cadastre_displayed: bool,
    commune: Option<String>,
    state: SelectionState,
}

impl<E> Default for SelectionBridge<E> {
    fn default() -> Self {
        Self {
            engine: None,
            subscribed: false,
            layer_ready: false,
            cadastre_displayed: true,
            commune: None,
            state: SelectionState::default(),
        }
    }
}

impl<E: MapEngine> SelectionBridge<E> {
    /// Bridge with selection disabled and no engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Whether this bridge holds the style-event subscription.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Whether the highlight layer was present at the last readiness check.
    #[must_use]
    pub const fn is_layer_ready(&self) -> bool {
        self.layer_ready
    }

    /// Acquire the engine handle and subscribe to style events once.
    ///
    /// A previously attached engine is detached first.
    pub fn attach(&mut self, engine: E) {
        if self.engine.is_some() {
            self.detach();
        }
        let engine = self.engine.insert(engine);
        if !self.subscribed {
            for event in StyleEvent::ALL {
                engine.subscribe(event);
            }
            self.subscribed = true;
        }
        self.on_style_ready();
    }

    /// Release the engine handle, reversing the hover flag and the
    /// subscription.
    pub fn detach(&mut self) -> Option<E> {
        self.clear_hover_flag();
        if let Some(hovered) = self.state.hovered.as_mut() {
            hovered.feature = None;
        }
        let engine = self.engine.take();
        if let Some(engine) = engine.as_ref()
            && self.subscribed
        {
            for event in StyleEvent::ALL {
                engine.unsubscribe(event);
            }
        }
        self.subscribed = false;
        self.layer_ready = false;
        engine
    }

    /// Turn selection mode on or off.
    ///
    /// Enabling starts from an empty selection. Disabling first resets the
    /// hover flag pushed to the engine, then clears the state and hides the
    /// highlight. Repeating the current mode changes nothing.
    pub fn set_mode(&mut self, enabled: bool) {
        if enabled == self.state.enabled {
            return;
        }
        if !enabled {
            self.clear_hover_flag();
        }
        self.state = SelectionState {
            enabled,
            ..SelectionState::default()
        };
        self.apply_highlight();
        if enabled {
            self.apply_stored_commune_filter();
        }
    }

    /// Flip membership of `parcel` in the selection.
    ///
    /// Returns `false` and does nothing while selection mode is off.
    pub fn toggle(&mut self, parcel: &ParcelId) -> bool {
        if !self.state.enabled {
            debug!("toggle of parcel {parcel} ignored: selection disabled");
            return false;
        }
        self.state.selected = toggled(&self.state.selected, parcel);
        self.apply_highlight();
        true
    }

    /// Replace the selection, typically with the parcels of the entity being
    /// edited. Ignored while selection mode is off.
    pub fn set_selected(&mut self, parcels: impl IntoIterator<Item = ParcelId>) {
        if !self.state.enabled {
            return;
        }
        self.state.selected = parcels.into_iter().collect();
        self.apply_highlight();
    }

    /// Move the hover highlight to `parcel`, or clear it with `None`.
    ///
    /// The previous hover flag is always reset first. When the parcel is not
    /// rendered, it is recorded without a feature and nothing is pushed.
    /// Ignored while selection mode is off.
    pub fn set_hovered(&mut self, parcel: Option<ParcelId>) {
        if !self.state.enabled {
            return;
        }
        self.clear_hover_flag();
        self.state.hovered = parcel.map(|parcel| {
            let feature = self.rendered_feature(&parcel);
            if let Some(feature) = feature {
                self.push_hover(feature, true);
            }
            HoveredParcel { parcel, feature }
        });
    }

    /// Adapter entry point for engine style events.
    ///
    /// A reload in progress discards engine feature state, so the hovered
    /// feature id is forgotten before the readiness check.
    pub fn on_style_event(&mut self, event: StyleEvent) {
        if event == StyleEvent::StyleDataLoading
            && let Some(hovered) = self.state.hovered.as_mut()
        {
            hovered.feature = None;
        }
        self.on_style_ready();
    }

    /// Recompute layer presence and reapply the filters the style lost.
    ///
    /// Idempotent: repeated calls push equivalent filters.
    pub fn on_style_ready(&mut self) {
        self.layer_ready = self
            .engine
            .as_ref()
            .is_some_and(|engine| engine.has_layer(HIGHLIGHT_LAYER));
        if !self.layer_ready {
            return;
        }
        self.apply_highlight();
        if self.state.enabled {
            self.apply_stored_commune_filter();
        }
    }

    /// Restrict selectable parcels to the municipality `code`.
    ///
    /// The code is remembered and reapplied on every readiness event while
    /// selection mode is on.
    pub fn apply_commune_filter(&mut self, code: impl Into<String>) {
        self.commune = Some(code.into());
        if self.state.enabled {
            self.apply_stored_commune_filter();
        }
    }

    /// Record whether the cadastre layers are shown. Showing them again
    /// reapplies the filters.
    pub fn set_cadastre_displayed(&mut self, displayed: bool) {
        if self.cadastre_displayed == displayed {
            return;
        }
        self.cadastre_displayed = displayed;
        if displayed {
            self.on_style_ready();
        } else {
            self.clear_hover_flag();
            if let Some(hovered) = self.state.hovered.as_mut() {
                hovered.feature = None;
            }
        }
    }

    fn visible_engine(&self) -> Option<&E> {
        self.engine
            .as_ref()
            .filter(|_| self.cadastre_displayed && self.layer_ready)
    }

    fn apply_highlight(&self) {
        let Some(engine) = self.visible_engine() else {
            return;
        };
        let filter = if self.state.enabled {
            FilterExpression::highlight(&self.state.selected)
        } else {
            FilterExpression::Nothing
        };
        engine.set_filter(HIGHLIGHT_LAYER, &filter);
    }

    fn apply_stored_commune_filter(&self) {
        let (Some(engine), Some(code)) = (self.visible_engine(), self.commune.as_ref()) else {
            return;
        };
        let filter = FilterExpression::Commune(code.clone());
        for layer in COMMUNE_FILTER_LAYERS {
            engine.set_filter(layer, &filter);
        }
    }

    // The parcel source layer is queryable without the highlight layer.
    fn rendered_feature(&self, parcel: &ParcelId) -> Option<FeatureId> {
        let engine = self.engine.as_ref().filter(|_| self.cadastre_displayed)?;
        engine
            .query_rendered_features(
                CADASTRE_SOURCE,
                PARCEL_SOURCE_LAYER,
                &FilterExpression::Parcel(parcel.clone()),
            )
            .into_iter()
            .next()
            .and_then(|rendered| rendered.feature_id)
    }

    fn clear_hover_flag(&self) {
        if let Some(feature) = self.state.hovered.as_ref().and_then(|h| h.feature) {
            self.push_hover(feature, false);
        }
    }

    fn push_hover(&self, feature: FeatureId, hover: bool) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        engine.set_feature_state(
            &FeatureTarget {
                source: CADASTRE_SOURCE.to_owned(),
                source_layer: PARCEL_SOURCE_LAYER.to_owned(),
                feature,
            },
            FeatureState { hover },
        );
    }
}

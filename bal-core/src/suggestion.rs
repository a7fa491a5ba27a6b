//! House-number suggestions derived from a marker position.
//!
//! French addressing allows "metric" numbering, where a house number is the
//! distance in metres from the start of the street. The suggestion is only a
//! placeholder for the number field; it is never validated against existing
//! numbers and never persisted unless the operator submits it.

use geo::{Coord, LineString};

use crate::entity::{HouseNumber, Street};
use crate::geometry::{distance_along, project_onto_path};

/// Suggest a metric house number for `marker` on `street`.
///
/// Returns `None` when the street has no trace. Otherwise the marker is
/// projected onto the trace and the distance from the trace start to the
/// projection is rounded to whole metres.
///
/// # Examples
///
/// ```
/// use geo::{Coord, LineString};
/// use bal_core::{EntityId, Street, suggest_numero};
///
/// let street = Street {
///     id: EntityId::from("v1"),
///     name: "Grande Rue".into(),
///     trace: Some(LineString::from(vec![(2.30, 48.85), (2.31, 48.85)])),
///     base_locale: EntityId::from("bal"),
///     commune: "75056".into(),
/// };
/// let suggestion = suggest_numero(Coord { x: 2.3015, y: 48.8501 }, &street);
/// assert_eq!(suggestion.as_deref(), Some("110"));
/// ```
#[must_use]
pub fn suggest_numero(marker: Coord<f64>, street: &Street) -> Option<String> {
    street
        .trace
        .as_ref()
        .and_then(|trace| suggest_on_trace(marker, trace))
}

fn suggest_on_trace(marker: Coord<f64>, trace: &LineString<f64>) -> Option<String> {
    let start = trace.0.first().copied()?;
    let projection = project_onto_path(marker, trace)?;
    let metres = distance_along(trace, start, projection.point)?;
    Some(format!("{:.0}", metres.round()))
}

/// Label displayed next to the marker: the typed number, else the suggestion.
#[must_use]
pub fn marker_label(entered: &str, suggestion: Option<&str>) -> Option<String> {
    let entered = entered.trim();
    if entered.is_empty() {
        suggestion.map(str::to_owned)
    } else {
        Some(entered.to_owned())
    }
}

/// Whether a marker may be placed while editing `existing`.
///
/// New house numbers always accept a marker; existing ones only while they
/// hold fewer than two positions.
#[must_use]
pub fn accepts_marker(existing: Option<&HouseNumber>) -> bool {
    existing.is_none_or(HouseNumber::accepts_additional_position)
}

/// Keeps the suggestion in step with marker moves and street changes.
///
/// The editor feeds explicit events (street chosen, marker moved, marker
/// removed) and reads back the current suggestion.
#[derive(Debug, Clone, Default)]
pub struct MarkerSuggestionEngine {
    trace: Option<LineString<f64>>,
    marker: Option<Coord<f64>>,
    suggestion: Option<String>,
}

impl MarkerSuggestionEngine {
    /// Create an engine with no street and no marker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the street the house number belongs to.
    pub fn set_street(&mut self, street: &Street) -> Option<&str> {
        self.trace.clone_from(&street.trace);
        self.recompute()
    }

    /// Record a new marker position.
    pub fn move_marker(&mut self, marker: Coord<f64>) -> Option<&str> {
        self.marker = Some(marker);
        self.recompute()
    }

    /// Remove the marker, e.g. when the editor closes.
    pub fn clear_marker(&mut self) {
        self.marker = None;
        self.suggestion = None;
    }

    /// Current suggestion, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Label for the marker given the number typed so far.
    #[must_use]
    pub fn label(&self, entered: &str) -> Option<String> {
        marker_label(entered, self.suggestion())
    }

    fn recompute(&mut self) -> Option<&str> {
        self.suggestion = match (self.marker, self.trace.as_ref()) {
            (Some(marker), Some(trace)) => suggest_on_trace(marker, trace),
            _ => None,
        };
        self.suggestion.as_deref()
    }
}

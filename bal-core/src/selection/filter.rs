//! Layer filter expressions in the engine's JSON expression syntax.

use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::entity::ParcelId;

/// Filter pushed to a map layer or used to query rendered features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// Matches features whose `id` equals any of the parcels.
    AnyParcel(Vec<ParcelId>),
    /// Matches the single parcel.
    Parcel(ParcelId),
    /// Matches nothing.
    Nothing,
    /// Matches features of one municipality.
    Commune(String),
}

impl FilterExpression {
    /// Highlight filter for a selection.
    #[must_use]
    pub fn highlight(selected: &BTreeSet<ParcelId>) -> Self {
        Self::AnyParcel(selected.iter().cloned().collect())
    }

    /// Render to the engine's expression syntax.
    ///
    /// ```
    /// use bal_core::{FilterExpression, ParcelId};
    /// use serde_json::json;
    ///
    /// let filter = FilterExpression::AnyParcel(vec![ParcelId::from("94067000AB0012")]);
    /// assert_eq!(
    ///     filter.to_json(),
    ///     json!(["any", ["==", ["get", "id"], "94067000AB0012"]])
    /// );
    /// ```
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::AnyParcel(parcels) => {
                let mut expression = vec![json!("any")];
                expression.extend(parcels.iter().map(|parcel| id_equals(parcel.as_str())));
                Value::Array(expression)
            }
            Self::Parcel(parcel) => id_equals(parcel.as_str()),
            Self::Nothing => id_equals(""),
            Self::Commune(code) => json!(["match", ["get", "commune"], code, true, false]),
        }
    }
}

fn id_equals(id: &str) -> Value {
    json!(["==", ["get", "id"], id])
}

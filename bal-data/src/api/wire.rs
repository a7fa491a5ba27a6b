//! JSON shapes exchanged with the address-database REST API.
//!
//! Field names follow the API (`_id`, `nom`, `numero`, ...). Conversions into
//! `bal_core` entities fill values the API omits from the session scope.

use bal_core::{
    BaseLocale, EntityId, EntityKind, EntityRef, HouseNumber, HouseNumberDraft, MapFeature,
    NamedPlace, NamedPlaceDraft, ParcelId, Position, PositionKind, SessionScope, Street,
    StreetDraft, ValidationError,
};
use geo::{Coord, Geometry, LineString, Point};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GeoJSON geometry as sent by the API.
///
/// Only `Point` and `LineString` are used by the editor; other types are
/// kept opaque so a single odd feature does not fail a whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

impl WireGeometry {
    fn point(coord: Coord<f64>) -> Self {
        Self {
            kind: "Point".to_owned(),
            coordinates: serde_json::json!([coord.x, coord.y]),
        }
    }

    fn line_string(line: &LineString<f64>) -> Self {
        let coordinates: Vec<[f64; 2]> = line.coords().map(|c| [c.x, c.y]).collect();
        Self {
            kind: "LineString".to_owned(),
            coordinates: serde_json::json!(coordinates),
        }
    }

    fn as_geometry(&self) -> Option<Geometry<f64>> {
        match self.kind.as_str() {
            "Point" => serde_json::from_value::<[f64; 2]>(self.coordinates.clone())
                .ok()
                .map(|[x, y]| Geometry::Point(Point::new(x, y))),
            "LineString" => serde_json::from_value::<Vec<[f64; 2]>>(self.coordinates.clone())
                .ok()
                .map(|coords| {
                    Geometry::LineString(coords.into_iter().map(|[x, y]| (x, y)).collect())
                }),
            _ => None,
        }
    }

    fn as_line_string(&self) -> Option<LineString<f64>> {
        match self.as_geometry()? {
            Geometry::LineString(line) => Some(line),
            _ => None,
        }
    }

    fn as_coord(&self) -> Option<Coord<f64>> {
        match self.as_geometry()? {
            Geometry::Point(point) => Some(point.0),
            _ => None,
        }
    }
}

/// Position of a house number or named place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePosition {
    pub point: WireGeometry,
    #[serde(rename = "type", default = "default_position_type")]
    pub kind: String,
}

fn default_position_type() -> String {
    position_type(PositionKind::Entrance).to_owned()
}

const fn position_type(kind: PositionKind) -> &'static str {
    match kind {
        PositionKind::Entrance => "entrée",
        PositionKind::Building => "bâtiment",
        PositionKind::StaircaseEntrance => "cage d’escalier",
        PositionKind::UnitEntrance => "logement",
        PositionKind::Service => "service technique",
        PositionKind::DeliveryArea => "délivrance postale",
        PositionKind::Parcel => "parcelle",
        PositionKind::Segment => "segment",
        PositionKind::Other => "inconnue",
    }
}

fn position_kind(label: &str) -> PositionKind {
    match label {
        "entrée" => PositionKind::Entrance,
        "bâtiment" => PositionKind::Building,
        "cage d’escalier" | "cage d'escalier" => PositionKind::StaircaseEntrance,
        "logement" => PositionKind::UnitEntrance,
        "service technique" => PositionKind::Service,
        "délivrance postale" => PositionKind::DeliveryArea,
        "parcelle" => PositionKind::Parcel,
        "segment" => PositionKind::Segment,
        _ => PositionKind::Other,
    }
}

impl From<&Position> for WirePosition {
    fn from(position: &Position) -> Self {
        Self {
            point: WireGeometry::point(position.coordinate),
            kind: position_type(position.kind).to_owned(),
        }
    }
}

fn positions_from_wire(owner: &str, positions: Vec<WirePosition>) -> Vec<Position> {
    positions
        .into_iter()
        .filter_map(|position| {
            let coordinate = position.point.as_coord();
            if coordinate.is_none() {
                warn!("skipping position of {owner} with {} geometry", position.point.kind);
            }
            coordinate.map(|c| Position::new(c, position_kind(&position.kind)))
        })
        .collect()
}

fn parcels_from_wire(parcels: Vec<String>) -> Vec<ParcelId> {
    parcels.into_iter().map(ParcelId::new).collect()
}

/// A street ("voie").
#[derive(Debug, Clone, Deserialize)]
pub struct WireStreet {
    #[serde(rename = "_id")]
    pub id: String,
    pub nom: String,
    #[serde(default)]
    pub trace: Option<WireGeometry>,
    #[serde(rename = "_bal", default)]
    pub bal: Option<String>,
    #[serde(default)]
    pub commune: Option<String>,
}

impl WireStreet {
    pub fn into_street(self, scope: &SessionScope) -> Street {
        let trace = self.trace.as_ref().and_then(|trace| {
            let line = trace.as_line_string();
            if line.is_none() {
                warn!("ignoring {} trace of street {}", trace.kind, self.id);
            }
            line
        });
        Street {
            id: EntityId::new(self.id),
            name: self.nom,
            trace,
            base_locale: EntityId::new(self.bal.unwrap_or_else(|| scope.base_locale.clone())),
            commune: self.commune.unwrap_or_else(|| scope.commune.clone()),
        }
    }
}

/// A named place ("toponyme").
#[derive(Debug, Clone, Deserialize)]
pub struct WireNamedPlace {
    #[serde(rename = "_id")]
    pub id: String,
    pub nom: String,
    #[serde(default)]
    pub positions: Vec<WirePosition>,
    #[serde(default)]
    pub parcelles: Vec<String>,
}

impl WireNamedPlace {
    pub fn into_named_place(self) -> NamedPlace {
        NamedPlace {
            positions: positions_from_wire(&self.id, self.positions),
            id: EntityId::new(self.id),
            name: self.nom,
            parcels: parcels_from_wire(self.parcelles),
        }
    }
}

/// A house number ("numéro").
#[derive(Debug, Clone, Deserialize)]
pub struct WireHouseNumber {
    #[serde(rename = "_id")]
    pub id: String,
    pub numero: u32,
    #[serde(default)]
    pub suffixe: Option<String>,
    pub voie: String,
    #[serde(default)]
    pub positions: Vec<WirePosition>,
    #[serde(default)]
    pub parcelles: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl WireHouseNumber {
    pub fn into_house_number(self) -> HouseNumber {
        HouseNumber {
            positions: positions_from_wire(&self.id, self.positions),
            id: EntityId::new(self.id),
            number: self.numero,
            suffix: self.suffixe.filter(|s| !s.is_empty()),
            street: EntityId::new(self.voie),
            parcels: parcels_from_wire(self.parcelles),
            comment: self.comment.filter(|c| !c.is_empty()),
        }
    }
}

/// Local address base metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBaseLocale {
    #[serde(rename = "_id")]
    pub id: String,
    pub nom: String,
}

impl WireBaseLocale {
    /// Convert, flagging the base as published when `published` lists it.
    pub fn into_base_locale(self, published: &[WirePublishedBase]) -> BaseLocale {
        let listed = published.iter().any(|base| base.id == self.id);
        BaseLocale {
            id: self.id,
            name: self.nom,
            published: listed,
        }
    }
}

/// Entry of the published base locale list.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePublishedBase {
    #[serde(rename = "_id")]
    pub id: String,
}

/// GeoJSON feature collection derived from the municipality's entities.
#[derive(Debug, Clone, Deserialize)]
pub struct WireFeatureCollection {
    #[serde(default)]
    pub features: Vec<WireFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFeature {
    #[serde(default)]
    pub properties: WireFeatureProperties,
    pub geometry: Option<WireGeometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireFeatureProperties {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl WireFeatureCollection {
    /// Convert supported features, skipping the others with a warning.
    pub fn into_map_features(self) -> Vec<MapFeature> {
        self.features
            .into_iter()
            .enumerate()
            .filter_map(|(index, feature)| feature.into_map_feature(index))
            .collect()
    }
}

impl WireFeature {
    fn into_map_feature(self, index: usize) -> Option<MapFeature> {
        let id = self.properties.id.unwrap_or_else(|| index.to_string());
        let Some(geometry) = self.geometry.as_ref().and_then(WireGeometry::as_geometry) else {
            let kind = self.geometry.map_or_else(|| "missing".to_owned(), |g| g.kind);
            warn!("skipping map feature {id} with {kind} geometry");
            return None;
        };
        let entity = self
            .properties
            .kind
            .as_deref()
            .and_then(entity_kind)
            .map(|kind| EntityRef::new(kind, id.as_str()));
        Some(MapFeature {
            id,
            entity,
            geometry,
        })
    }
}

fn entity_kind(label: &str) -> Option<EntityKind> {
    match label {
        "voie" => Some(EntityKind::Street),
        "toponyme" => Some(EntityKind::NamedPlace),
        "numero" => Some(EntityKind::HouseNumber),
        _ => None,
    }
}

/// Path segment addressing entities of `kind`.
pub const fn resource(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Street => "voies",
        EntityKind::NamedPlace => "toponymes",
        EntityKind::HouseNumber => "numeros",
    }
}

/// Request body for creating or updating a street.
#[derive(Debug, Serialize)]
pub struct StreetBody {
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<WireGeometry>,
}

impl From<&StreetDraft> for StreetBody {
    fn from(draft: &StreetDraft) -> Self {
        Self {
            nom: draft.name().to_owned(),
            trace: draft.trace().map(WireGeometry::line_string),
        }
    }
}

/// Request body for creating or updating a named place.
#[derive(Debug, Serialize)]
pub struct NamedPlaceBody {
    pub nom: String,
    pub positions: Vec<WirePosition>,
    pub parcelles: Vec<String>,
}

impl From<&NamedPlaceDraft> for NamedPlaceBody {
    fn from(draft: &NamedPlaceDraft) -> Self {
        Self {
            nom: draft.name().to_owned(),
            positions: draft.positions().iter().map(WirePosition::from).collect(),
            parcelles: draft.parcels().iter().map(|p| p.as_str().to_owned()).collect(),
        }
    }
}

/// Request body for creating or updating a house number.
#[derive(Debug, Serialize)]
pub struct HouseNumberBody {
    pub numero: u32,
    pub voie: String,
    pub suffixe: Option<String>,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<WirePosition>,
    pub parcelles: Vec<String>,
}

impl From<&HouseNumberDraft> for HouseNumberBody {
    fn from(draft: &HouseNumberDraft) -> Self {
        Self {
            numero: draft.number(),
            voie: draft.street().as_str().to_owned(),
            suffixe: draft.suffix().map(str::to_owned),
            comment: draft.comment().map(str::to_owned),
            positions: draft.positions().iter().map(WirePosition::from).collect(),
            parcelles: draft.parcels().iter().map(|p| p.as_str().to_owned()).collect(),
        }
    }
}

/// Body of an HTTP 400 response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub validation: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    /// Field messages, falling back to the general message under `"_"`.
    pub fn into_validation_error(self) -> ValidationError {
        if !self.validation.is_empty() {
            return ValidationError {
                messages: self.validation,
            };
        }
        let message = self
            .message
            .unwrap_or_else(|| "request rejected".to_owned());
        ValidationError::from_pairs([("_", message)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn scope() -> SessionScope {
        SessionScope::new("bal-1", "94067")
    }

    #[rstest]
    fn street_trace_is_parsed() {
        let wire: WireStreet = serde_json::from_value(json!({
            "_id": "v1",
            "nom": "Rue de la Paix",
            "trace": {"type": "LineString", "coordinates": [[2.30, 48.85], [2.31, 48.85]]},
        }))
        .expect("valid street");

        let street = wire.into_street(&scope());

        assert_eq!(street.name, "Rue de la Paix");
        assert_eq!(street.trace.map(|t| t.0.len()), Some(2));
        assert_eq!(street.base_locale, EntityId::from("bal-1"));
        assert_eq!(street.commune, "94067");
    }

    #[rstest]
    fn non_line_trace_is_dropped() {
        let wire: WireStreet = serde_json::from_value(json!({
            "_id": "v1",
            "nom": "Place du Marché",
            "trace": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]},
        }))
        .expect("valid street");

        assert_eq!(wire.into_street(&scope()).trace, None);
    }

    #[rstest]
    fn house_number_positions_and_suffix() {
        let wire: WireHouseNumber = serde_json::from_value(json!({
            "_id": "n1",
            "numero": 12,
            "suffixe": "bis",
            "voie": "v1",
            "positions": [{"point": {"type": "Point", "coordinates": [2.3, 48.8]}, "type": "bâtiment"}],
            "parcelles": ["94067000AB0012"],
        }))
        .expect("valid house number");

        let number = wire.into_house_number();

        assert_eq!(number.label(), "12 bis");
        assert_eq!(number.positions.len(), 1);
        assert_eq!(
            number.positions.first().map(|p| p.kind),
            Some(PositionKind::Building)
        );
        assert_eq!(number.parcels, vec![ParcelId::from("94067000AB0012")]);
    }

    #[rstest]
    fn unsupported_features_are_skipped() {
        let wire: WireFeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"id": "v1", "type": "voie"},
                 "geometry": {"type": "LineString", "coordinates": [[2.3, 48.8], [2.4, 48.8]]}},
                {"type": "Feature", "properties": {"id": "z1"},
                 "geometry": {"type": "Polygon", "coordinates": []}},
                {"type": "Feature", "properties": {"type": "numero", "id": "n1"},
                 "geometry": {"type": "Point", "coordinates": [2.3, 48.8]}},
            ],
        }))
        .expect("valid collection");

        let features = wire.into_map_features();

        assert_eq!(features.len(), 2);
        assert_eq!(
            features.first().and_then(|f| f.entity.clone()),
            Some(EntityRef::street("v1"))
        );
        assert_eq!(
            features.get(1).and_then(|f| f.entity.clone()),
            Some(EntityRef::house_number("n1"))
        );
    }

    #[rstest]
    fn house_number_body_uses_api_names() {
        let draft = HouseNumberDraft::new(12, EntityId::from("v1"))
            .expect("valid number")
            .with_suffix(" BIS ");

        let body = serde_json::to_value(HouseNumberBody::from(&draft)).expect("serialisable");

        assert_eq!(
            body,
            json!({
                "numero": 12,
                "voie": "v1",
                "suffixe": "bis",
                "comment": null,
                "parcelles": [],
            })
        );
    }

    #[rstest]
    fn validation_body_keeps_field_messages() {
        let body: ErrorBody = serde_json::from_value(json!({
            "message": "Invalid payload",
            "validation": {"numero": ["must be positive"]},
        }))
        .expect("valid body");

        let error = body.into_validation_error();

        assert_eq!(error.field("numero"), ["must be positive"]);
    }

    #[rstest]
    fn bare_message_becomes_general_error() {
        let body: ErrorBody =
            serde_json::from_value(json!({"message": "Invalid payload"})).expect("valid body");

        assert_eq!(body.into_validation_error().field("_"), ["Invalid payload"]);
    }

    #[rstest]
    #[case(json!([{"_id": "other"}, {"_id": "bal-1"}]), true)]
    #[case(json!([{"_id": "other"}]), false)]
    #[case(json!([]), false)]
    fn publication_follows_the_published_list(
        #[case] listed: serde_json::Value,
        #[case] expected: bool,
    ) {
        let wire: WireBaseLocale =
            serde_json::from_value(json!({"_id": "bal-1", "nom": "Adresses de Vitry"}))
                .expect("valid base locale");
        let published: Vec<WirePublishedBase> =
            serde_json::from_value(listed).expect("valid published list");

        let base_locale = wire.into_base_locale(&published);

        assert_eq!(base_locale.name, "Adresses de Vitry");
        assert_eq!(base_locale.published, expected);
    }
}

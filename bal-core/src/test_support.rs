//! In-memory collaborators used by unit, doc and behaviour tests.
//!
//! [`StubDataAccess`] serves queued responses and can hold a response back
//! until the test releases it, which lets tests interleave reloads on a
//! single-threaded runtime. [`RecordingMapEngine`] logs every call the
//! selection bridge makes.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::access::{
    CollectionKind, CollectionPayload, DataAccess, EntityDraft, FetchError, MutationError,
    MutationTarget, SessionScope,
};
use crate::credential::{Credential, CredentialProvider};
use crate::entity::{BaseLocale, Entity, EntityId, EntityRef, ParcelId, Street};
use crate::selection::{
    COMMUNE_FILTER_LAYERS, FeatureId, FeatureState, FeatureTarget, FilterExpression,
    HIGHLIGHT_LAYER, MapEngine, RenderedFeature, StyleEvent,
};

/// Run `future` to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics when the runtime cannot be built.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime should build")
        .block_on(future)
}

/// Street fixture with an optional straight trace.
pub fn street(id: &str, trace: Option<Vec<(f64, f64)>>) -> Street {
    Street {
        id: EntityId::from(id),
        name: format!("Rue {id}"),
        trace: trace.map(geo::LineString::from),
        base_locale: EntityId::from("bal-1"),
        commune: "94067".to_owned(),
    }
}

/// Credential provider whose state tests can flip.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    credential: RefCell<Option<Credential>>,
}

impl StaticCredentials {
    /// Provider holding `token`.
    pub fn signed_in(token: &str) -> Self {
        Self {
            credential: RefCell::new(Some(Credential::new(token))),
        }
    }

    /// Provider without a credential.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Drop the credential.
    pub fn sign_out(&self) {
        self.credential.borrow_mut().take();
    }

    /// Replace the credential with `token`.
    pub fn sign_in(&self, token: &str) {
        *self.credential.borrow_mut() = Some(Credential::new(token));
    }
}

impl CredentialProvider for StaticCredentials {
    fn credential(&self) -> Option<Credential> {
        self.credential.borrow().clone()
    }
}

/// Call observed by [`StubDataAccess`].
#[derive(Debug, Clone, PartialEq)]
pub enum StubCall {
    /// A collection fetch.
    Fetch(CollectionKind, SessionScope),
    /// A create or update.
    Mutate(MutationTarget, EntityDraft),
    /// A deletion.
    Remove(EntityRef),
}

type FetchResult = Result<CollectionPayload, FetchError>;

#[derive(Debug)]
enum StubResponse {
    Ready(FetchResult),
    Deferred(oneshot::Receiver<FetchResult>),
}

/// Scripted [`DataAccess`] implementation.
///
/// Fetches without a queued response return an empty collection.
#[derive(Debug, Default)]
pub struct StubDataAccess {
    fetches: RefCell<HashMap<CollectionKind, VecDeque<StubResponse>>>,
    mutations: RefCell<VecDeque<Result<Entity, MutationError>>>,
    removals: RefCell<VecDeque<Result<(), MutationError>>>,
    base_locale: RefCell<Option<BaseLocale>>,
    calls: RefCell<Vec<StubCall>>,
}

impl StubDataAccess {
    /// Queue the next response for `kind`.
    pub fn respond(&self, kind: CollectionKind, result: FetchResult) {
        self.queue(kind, StubResponse::Ready(result));
    }

    /// Queue a response for `kind` that resolves when the returned sender
    /// fires.
    pub fn defer(&self, kind: CollectionKind) -> oneshot::Sender<FetchResult> {
        let (sender, receiver) = oneshot::channel();
        self.queue(kind, StubResponse::Deferred(receiver));
        sender
    }

    /// Queue the result of the next create or update.
    pub fn respond_to_mutation(&self, result: Result<Entity, MutationError>) {
        self.mutations.borrow_mut().push_back(result);
    }

    /// Queue the result of the next deletion.
    pub fn respond_to_removal(&self, result: Result<(), MutationError>) {
        self.removals.borrow_mut().push_back(result);
    }

    /// Metadata returned by base-locale fetches.
    pub fn set_base_locale(&self, base_locale: BaseLocale) {
        *self.base_locale.borrow_mut() = Some(base_locale);
    }

    /// Calls observed so far.
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.borrow().clone()
    }

    fn queue(&self, kind: CollectionKind, response: StubResponse) {
        self.fetches
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push_back(response);
    }

    fn record(&self, call: StubCall) {
        self.calls.borrow_mut().push(call);
    }
}

fn empty_payload(kind: CollectionKind) -> CollectionPayload {
    match kind {
        CollectionKind::Streets => CollectionPayload::Streets(Vec::new()),
        CollectionKind::NamedPlaces => CollectionPayload::NamedPlaces(Vec::new()),
        CollectionKind::HouseNumbers => CollectionPayload::HouseNumbers(Vec::new()),
        CollectionKind::MapFeatures => CollectionPayload::MapFeatures(Vec::new()),
    }
}

fn unscripted(what: &str) -> FetchError {
    FetchError::Network {
        url: "stub://".to_owned(),
        message: format!("no scripted response for {what}"),
    }
}

#[async_trait(?Send)]
impl DataAccess for StubDataAccess {
    async fn fetch(
        &self,
        kind: CollectionKind,
        scope: &SessionScope,
    ) -> Result<CollectionPayload, FetchError> {
        self.record(StubCall::Fetch(kind, scope.clone()));
        let next = self
            .fetches
            .borrow_mut()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        match next {
            None => Ok(empty_payload(kind)),
            Some(StubResponse::Ready(result)) => result,
            Some(StubResponse::Deferred(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(unscripted("a dropped deferred fetch"))),
        }
    }

    async fn fetch_base_locale(&self, scope: &SessionScope) -> Result<BaseLocale, FetchError> {
        Ok(self.base_locale.borrow().clone().unwrap_or_else(|| BaseLocale {
            id: scope.base_locale.clone(),
            name: scope.base_locale.clone(),
            published: false,
        }))
    }

    async fn mutate(
        &self,
        target: &MutationTarget,
        draft: &EntityDraft,
        _scope: &SessionScope,
        _credential: &Credential,
    ) -> Result<Entity, MutationError> {
        self.record(StubCall::Mutate(target.clone(), draft.clone()));
        let next = self.mutations.borrow_mut().pop_front();
        next.unwrap_or_else(|| Err(MutationError::Fetch(unscripted("a mutation"))))
    }

    async fn remove(
        &self,
        target: &EntityRef,
        _credential: &Credential,
    ) -> Result<(), MutationError> {
        self.record(StubCall::Remove(target.clone()));
        let next = self.removals.borrow_mut().pop_front();
        next.unwrap_or(Ok(()))
    }
}

/// Call observed by [`RecordingMapEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// Hover flag pushed for a feature.
    FeatureState {
        /// Target feature.
        feature: FeatureId,
        /// Pushed flag.
        hover: bool,
    },
    /// Filter applied to a layer, rendered to JSON.
    Filter {
        /// Layer name.
        layer: String,
        /// Rendered expression.
        filter: Value,
    },
    /// Event subscription.
    Subscribe(StyleEvent),
    /// Event unsubscription.
    Unsubscribe(StyleEvent),
}

/// [`MapEngine`] double recording every call.
#[derive(Debug, Default)]
pub struct RecordingMapEngine {
    layers: RefCell<BTreeSet<String>>,
    rendered: RefCell<Vec<RenderedFeature>>,
    calls: RefCell<Vec<EngineCall>>,
}

impl RecordingMapEngine {
    /// Engine whose style carries the cadastre layers.
    pub fn with_cadastre_style() -> Self {
        let engine = Self::default();
        engine.load_cadastre_style();
        engine
    }

    /// Add the cadastre layers to the style.
    pub fn load_cadastre_style(&self) {
        let mut layers = self.layers.borrow_mut();
        layers.insert(HIGHLIGHT_LAYER.to_owned());
        layers.extend(COMMUNE_FILTER_LAYERS.iter().map(|layer| (*layer).to_owned()));
    }

    /// Drop every layer, as during a style reload.
    pub fn unload_style(&self) {
        self.layers.borrow_mut().clear();
    }

    /// Drop `layer` from the style.
    pub fn remove_layer(&self, layer: &str) {
        self.layers.borrow_mut().remove(layer);
    }

    /// Render `parcel` as `feature`.
    pub fn render(&self, parcel: &str, feature: Option<u64>) {
        self.rendered.borrow_mut().push(RenderedFeature {
            parcel: ParcelId::from(parcel),
            feature_id: feature.map(FeatureId),
        });
    }

    /// Calls observed so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Filters applied to `layer`, oldest first.
    pub fn filters_for(&self, layer: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                EngineCall::Filter { layer: l, filter } if l == layer => Some(filter.clone()),
                _ => None,
            })
            .collect()
    }

    /// Hover flags pushed, oldest first.
    pub fn hover_pushes(&self) -> Vec<(FeatureId, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                EngineCall::FeatureState { feature, hover } => Some((*feature, *hover)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl MapEngine for RecordingMapEngine {
    fn set_feature_state(&self, target: &FeatureTarget, state: FeatureState) {
        self.record(EngineCall::FeatureState {
            feature: target.feature,
            hover: state.hover,
        });
    }

    fn set_filter(&self, layer: &str, filter: &FilterExpression) {
        self.record(EngineCall::Filter {
            layer: layer.to_owned(),
            filter: filter.to_json(),
        });
    }

    fn query_rendered_features(
        &self,
        _source: &str,
        _source_layer: &str,
        filter: &FilterExpression,
    ) -> Vec<RenderedFeature> {
        self.rendered
            .borrow()
            .iter()
            .filter(|rendered| match filter {
                FilterExpression::Parcel(parcel) => &rendered.parcel == parcel,
                _ => true,
            })
            .cloned()
            .collect()
    }

    fn has_layer(&self, layer: &str) -> bool {
        self.layers.borrow().contains(layer)
    }

    fn subscribe(&self, event: StyleEvent) {
        self.record(EngineCall::Subscribe(event));
    }

    fn unsubscribe(&self, event: StyleEvent) {
        self.record(EngineCall::Unsubscribe(event));
    }
}

//! Authoritative in-memory collections for one editing session.
//!
//! The [`EntityStore`] fetches whole collections through a [`DataAccess`]
//! implementation and swaps them in atomically. Reloads for the same
//! collection follow last-started-wins: a response that resolves after a
//! newer reload has begun is dropped, whatever order the responses arrive in.

mod collection;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};

use crate::access::{CollectionKind, CollectionPayload, DataAccess, FetchError, SessionScope};
use crate::entity::{
    BaseLocale, Entity, EntityId, EntityKind, EntityRef, HouseNumber, MapFeature, NamedPlace,
    Street,
};

pub use collection::Collection;

/// Result of a reload that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The response replaced the collection.
    Applied {
        /// Number of elements now held.
        count: usize,
    },
    /// A newer reload of the same collection started while this one was in
    /// flight; its response was dropped.
    Superseded,
    /// The store was torn down; nothing was applied.
    Discarded,
}

impl ReloadOutcome {
    /// Whether the collection was replaced.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Collections of one municipality within one local address base.
///
/// All state lives behind `Cell`/`RefCell` so reloads can run through a
/// shared reference on a single-threaded executor. No borrow is held across
/// an `.await`.
#[derive(Debug)]
pub struct EntityStore<D> {
    access: D,
    scope: RefCell<SessionScope>,
    streets: RefCell<Rc<Collection<Street>>>,
    named_places: RefCell<Rc<Collection<NamedPlace>>>,
    house_numbers: RefCell<Rc<Collection<HouseNumber>>>,
    map_features: RefCell<Rc<[MapFeature]>>,
    base_locale: RefCell<Option<BaseLocale>>,
    tickets: [Cell<u64>; 4],
    base_locale_ticket: Cell<u64>,
    epoch: Cell<u64>,
    torn_down: Cell<bool>,
}

const fn slot(kind: CollectionKind) -> usize {
    match kind {
        CollectionKind::Streets => 0,
        CollectionKind::NamedPlaces => 1,
        CollectionKind::HouseNumbers => 2,
        CollectionKind::MapFeatures => 3,
    }
}

impl<D: DataAccess> EntityStore<D> {
    /// Create an empty store for `scope`.
    pub fn new(access: D, scope: SessionScope) -> Self {
        Self {
            access,
            scope: RefCell::new(scope),
            streets: RefCell::default(),
            named_places: RefCell::default(),
            house_numbers: RefCell::default(),
            map_features: RefCell::default(),
            base_locale: RefCell::default(),
            tickets: Default::default(),
            base_locale_ticket: Cell::new(0),
            epoch: Cell::new(0),
            torn_down: Cell::new(false),
        }
    }

    /// Data access used for fetches and mutations.
    pub const fn access(&self) -> &D {
        &self.access
    }

    /// Snapshot of the session scope.
    #[must_use]
    pub fn scope(&self) -> SessionScope {
        self.scope.borrow().clone()
    }

    /// Change the street whose house numbers are loaded.
    ///
    /// Any house-number reload already in flight is superseded; callers
    /// reload [`CollectionKind::HouseNumbers`] afterwards.
    pub fn focus_street(&self, street: Option<EntityId>) {
        self.scope.borrow_mut().street = street;
        self.issue_ticket(CollectionKind::HouseNumbers);
    }

    /// Streets currently held.
    #[must_use]
    pub fn streets(&self) -> Rc<Collection<Street>> {
        Rc::clone(&self.streets.borrow())
    }

    /// Named places currently held.
    #[must_use]
    pub fn named_places(&self) -> Rc<Collection<NamedPlace>> {
        Rc::clone(&self.named_places.borrow())
    }

    /// House numbers of the focused street.
    #[must_use]
    pub fn house_numbers(&self) -> Rc<Collection<HouseNumber>> {
        Rc::clone(&self.house_numbers.borrow())
    }

    /// Derived map features.
    #[must_use]
    pub fn map_features(&self) -> Rc<[MapFeature]> {
        Rc::clone(&self.map_features.borrow())
    }

    /// Metadata of the local address base, once loaded.
    #[must_use]
    pub fn base_locale(&self) -> Option<BaseLocale> {
        self.base_locale.borrow().clone()
    }

    /// Counter advanced by every applied collection reload.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// End the session. Pending and future reloads apply nothing.
    pub fn teardown(&self) {
        debug!("entity store torn down");
        self.torn_down.set(true);
    }

    /// Look up an entity by tagged reference.
    #[must_use]
    pub fn get(&self, target: &EntityRef) -> Option<Entity> {
        let id = &target.id;
        match target.kind {
            EntityKind::Street => self.streets.borrow().get(id).cloned().map(Entity::Street),
            EntityKind::NamedPlace => self
                .named_places
                .borrow()
                .get(id)
                .cloned()
                .map(Entity::NamedPlace),
            EntityKind::HouseNumber => self
                .house_numbers
                .borrow()
                .get(id)
                .cloned()
                .map(Entity::HouseNumber),
        }
    }

    /// Tag an untyped identifier by probing streets, named places and house
    /// numbers in that order.
    ///
    /// The first hit wins; a warning is logged when the identifier exists in
    /// more than one collection.
    #[must_use]
    pub fn locate(&self, id: &EntityId) -> Option<EntityRef> {
        let mut hits = EntityKind::PROBE_ORDER
            .into_iter()
            .filter(|kind| self.contains(*kind, id));
        let first = hits.next()?;
        let others: Vec<EntityKind> = hits.collect();
        if !others.is_empty() {
            warn!("identifier {id} exists as {first} and {others:?}; using {first}");
        }
        Some(EntityRef::new(first, id.clone()))
    }

    fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        match kind {
            EntityKind::Street => self.streets.borrow().contains(id),
            EntityKind::NamedPlace => self.named_places.borrow().contains(id),
            EntityKind::HouseNumber => self.house_numbers.borrow().contains(id),
        }
    }

    /// Fetch the `kind` collection and replace the held one.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the current reload; the previous
    /// collection is left in place. Failures of superseded or discarded
    /// reloads are only logged.
    pub async fn reload(&self, kind: CollectionKind) -> Result<ReloadOutcome, FetchError> {
        if self.torn_down.get() {
            debug!("reload of {kind} ignored: store torn down");
            return Ok(ReloadOutcome::Discarded);
        }
        let ticket = self.issue_ticket(kind);
        let scope = self.scope();
        let result = if kind == CollectionKind::HouseNumbers && scope.street.is_none() {
            Ok(CollectionPayload::HouseNumbers(Vec::new()))
        } else {
            self.access.fetch(kind, &scope).await
        };

        if self.torn_down.get() {
            debug!("reload of {kind} discarded: store torn down");
            return Ok(ReloadOutcome::Discarded);
        }
        if self.tickets[slot(kind)].get() != ticket {
            debug!("reload of {kind} superseded by a newer one");
            return Ok(ReloadOutcome::Superseded);
        }

        let payload = result.inspect_err(|err| {
            warn!("reload of {kind} failed, keeping previous collection: {err}");
        })?;
        if payload.kind() != kind {
            return Err(FetchError::Decode {
                message: format!("expected {kind}, received {}", payload.kind()),
            });
        }
        let count = payload.len();
        self.apply(payload);
        self.epoch.set(self.epoch.get() + 1);
        debug!("reloaded {count} {kind}");
        Ok(ReloadOutcome::Applied { count })
    }

    /// Reload every collection in turn.
    ///
    /// A failure does not stop the remaining reloads.
    pub async fn reload_all(&self) -> Vec<(CollectionKind, Result<ReloadOutcome, FetchError>)> {
        let mut outcomes = Vec::with_capacity(CollectionKind::ALL.len());
        for kind in CollectionKind::ALL {
            outcomes.push((kind, self.reload(kind).await));
        }
        outcomes
    }

    /// Refresh the local address base metadata.
    ///
    /// Does not advance the epoch: metadata never invalidates an edit.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the current request.
    pub async fn reload_base_locale(&self) -> Result<ReloadOutcome, FetchError> {
        if self.torn_down.get() {
            return Ok(ReloadOutcome::Discarded);
        }
        let ticket = self.base_locale_ticket.get() + 1;
        self.base_locale_ticket.set(ticket);
        let scope = self.scope();
        let result = self.access.fetch_base_locale(&scope).await;
        if self.torn_down.get() {
            return Ok(ReloadOutcome::Discarded);
        }
        if self.base_locale_ticket.get() != ticket {
            return Ok(ReloadOutcome::Superseded);
        }
        let base_locale = result?;
        *self.base_locale.borrow_mut() = Some(base_locale);
        Ok(ReloadOutcome::Applied { count: 1 })
    }

    fn issue_ticket(&self, kind: CollectionKind) -> u64 {
        let cell = &self.tickets[slot(kind)];
        let ticket = cell.get() + 1;
        cell.set(ticket);
        ticket
    }

    fn apply(&self, payload: CollectionPayload) {
        match payload {
            CollectionPayload::Streets(items) => {
                *self.streets.borrow_mut() = Rc::new(Collection::from_items(items));
            }
            CollectionPayload::NamedPlaces(items) => {
                *self.named_places.borrow_mut() = Rc::new(Collection::from_items(items));
            }
            CollectionPayload::HouseNumbers(items) => {
                *self.house_numbers.borrow_mut() = Rc::new(Collection::from_items(items));
            }
            CollectionPayload::MapFeatures(items) => {
                *self.map_features.borrow_mut() = Rc::from(items);
            }
        }
    }
}

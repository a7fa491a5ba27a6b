//! Reload semantics of [`EntityStore`]: wholesale replacement, failure
//! retention, last-started-wins and teardown.

use std::rc::Rc;

use bal_core::test_support::{StubCall, StubDataAccess, block_on_for_tests, street};
use bal_core::{
    BaseLocale, CollectionKind, CollectionPayload, EntityId, EntityKind, EntityRef, EntityStore,
    FetchError, NamedPlace, ReloadOutcome, SessionScope,
};
use rstest::{fixture, rstest};

type Store = EntityStore<Rc<StubDataAccess>>;

#[fixture]
fn access() -> Rc<StubDataAccess> {
    Rc::new(StubDataAccess::default())
}

fn scope() -> SessionScope {
    SessionScope::new("bal-1", "94067")
}

fn streets(ids: &[&str]) -> CollectionPayload {
    CollectionPayload::Streets(ids.iter().map(|id| street(id, None)).collect())
}

fn network_error() -> FetchError {
    FetchError::Network {
        url: "https://api.example.test/voies".to_owned(),
        message: "connection reset".to_owned(),
    }
}

fn loaded_store(access: &Rc<StubDataAccess>, ids: &[&str]) -> Store {
    let store = EntityStore::new(Rc::clone(access), scope());
    access.respond(CollectionKind::Streets, Ok(streets(ids)));
    let outcome = block_on_for_tests(store.reload(CollectionKind::Streets));
    assert_eq!(outcome, Ok(ReloadOutcome::Applied { count: ids.len() }));
    store
}

#[rstest]
fn reload_replaces_collection_wholesale(access: Rc<StubDataAccess>) {
    let store = loaded_store(&access, &["v1", "v2"]);
    access.respond(CollectionKind::Streets, Ok(streets(&["v3"])));

    let outcome = block_on_for_tests(store.reload(CollectionKind::Streets));

    assert_eq!(outcome, Ok(ReloadOutcome::Applied { count: 1 }));
    let held = store.streets();
    assert_eq!(held.len(), 1);
    assert!(held.contains(&EntityId::from("v3")));
    assert!(!held.contains(&EntityId::from("v1")));
}

#[rstest]
fn failed_reload_keeps_previous_collection(access: Rc<StubDataAccess>) {
    let store = loaded_store(&access, &["v1", "v2", "v3", "v4", "v5"]);
    let epoch = store.epoch();
    access.respond(CollectionKind::Streets, Err(network_error()));

    let outcome = block_on_for_tests(store.reload(CollectionKind::Streets));

    assert_eq!(outcome, Err(network_error()));
    assert_eq!(store.streets().len(), 5);
    assert_eq!(store.epoch(), epoch, "a failed reload must not advance the epoch");
}

#[rstest]
fn later_reload_wins_when_earlier_resolves_last(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    let first = access.defer(CollectionKind::Streets);
    let second = access.defer(CollectionKind::Streets);

    let (earlier, later, ()) = block_on_for_tests(async {
        tokio::join!(
            store.reload(CollectionKind::Streets),
            store.reload(CollectionKind::Streets),
            async move {
                let _ = second.send(Ok(streets(&["new"])));
                tokio::task::yield_now().await;
                let _ = first.send(Ok(streets(&["old"])));
            }
        )
    });

    assert_eq!(earlier, Ok(ReloadOutcome::Superseded));
    assert_eq!(later, Ok(ReloadOutcome::Applied { count: 1 }));
    assert!(store.streets().contains(&EntityId::from("new")));
    assert!(!store.streets().contains(&EntityId::from("old")));
}

#[rstest]
fn superseded_failure_is_not_reported(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    let first = access.defer(CollectionKind::Streets);
    access.respond(CollectionKind::Streets, Ok(streets(&["v1"])));

    let (earlier, later, ()) = block_on_for_tests(async {
        tokio::join!(
            store.reload(CollectionKind::Streets),
            store.reload(CollectionKind::Streets),
            async move {
                tokio::task::yield_now().await;
                let _ = first.send(Err(network_error()));
            }
        )
    });

    assert_eq!(earlier, Ok(ReloadOutcome::Superseded));
    assert_eq!(later, Ok(ReloadOutcome::Applied { count: 1 }));
}

#[rstest]
fn teardown_discards_pending_reload(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    let pending = access.defer(CollectionKind::Streets);
    let store_ref = &store;

    let (outcome, ()) = block_on_for_tests(async {
        tokio::join!(store_ref.reload(CollectionKind::Streets), async move {
            store_ref.teardown();
            let _ = pending.send(Ok(streets(&["v1"])));
        })
    });

    assert_eq!(outcome, Ok(ReloadOutcome::Discarded));
    assert!(store.streets().is_empty());
}

#[rstest]
fn reload_after_teardown_does_not_fetch(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    store.teardown();

    let outcome = block_on_for_tests(store.reload(CollectionKind::NamedPlaces));

    assert_eq!(outcome, Ok(ReloadOutcome::Discarded));
    assert!(access.calls().is_empty());
}

#[rstest]
fn house_numbers_are_empty_without_focused_street(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());

    let outcome = block_on_for_tests(store.reload(CollectionKind::HouseNumbers));

    assert_eq!(outcome, Ok(ReloadOutcome::Applied { count: 0 }));
    assert!(access.calls().is_empty());
}

#[rstest]
fn house_numbers_follow_focused_street(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    store.focus_street(Some(EntityId::from("v1")));

    let outcome = block_on_for_tests(store.reload(CollectionKind::HouseNumbers));

    assert!(matches!(outcome, Ok(ReloadOutcome::Applied { .. })));
    assert_eq!(
        access.calls(),
        vec![StubCall::Fetch(
            CollectionKind::HouseNumbers,
            scope().with_street("v1")
        )]
    );
}

#[rstest]
fn mismatched_payload_is_a_decode_error(access: Rc<StubDataAccess>) {
    let store = loaded_store(&access, &["v1"]);
    access.respond(
        CollectionKind::Streets,
        Ok(CollectionPayload::NamedPlaces(Vec::new())),
    );

    let outcome = block_on_for_tests(store.reload(CollectionKind::Streets));

    assert!(matches!(outcome, Err(FetchError::Decode { .. })));
    assert_eq!(store.streets().len(), 1);
}

#[rstest]
fn get_uses_the_tagged_kind(access: Rc<StubDataAccess>) {
    let store = loaded_store(&access, &["v1"]);

    assert!(store.get(&EntityRef::street("v1")).is_some());
    assert!(store.get(&EntityRef::named_place("v1")).is_none());
    assert!(store.get(&EntityRef::street("missing")).is_none());
}

#[rstest]
fn locate_prefers_streets_on_collision(access: Rc<StubDataAccess>) {
    let store = loaded_store(&access, &["x1"]);
    access.respond(
        CollectionKind::NamedPlaces,
        Ok(CollectionPayload::NamedPlaces(vec![NamedPlace {
            id: EntityId::from("x1"),
            name: "Le Bourg".to_owned(),
            positions: Vec::new(),
            parcels: Vec::new(),
        }])),
    );
    let outcome = block_on_for_tests(store.reload(CollectionKind::NamedPlaces));
    assert!(matches!(outcome, Ok(ReloadOutcome::Applied { count: 1 })));

    let located = store.locate(&EntityId::from("x1"));

    assert_eq!(located.map(|found| found.kind), Some(EntityKind::Street));
    assert_eq!(store.locate(&EntityId::from("x2")), None);
}

#[rstest]
fn reload_all_reports_every_kind(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    access.respond(CollectionKind::NamedPlaces, Err(network_error()));

    let outcomes = block_on_for_tests(store.reload_all());

    let kinds: Vec<_> = outcomes.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, CollectionKind::ALL.to_vec());
    let failed: Vec<_> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_err())
        .map(|(kind, _)| *kind)
        .collect();
    assert_eq!(failed, vec![CollectionKind::NamedPlaces]);
}

#[rstest]
fn base_locale_reload_keeps_epoch(access: Rc<StubDataAccess>) {
    let store = EntityStore::new(Rc::clone(&access), scope());
    access.set_base_locale(BaseLocale {
        id: "bal-1".to_owned(),
        name: "Commune de Gentilly".to_owned(),
        published: true,
    });

    let outcome = block_on_for_tests(store.reload_base_locale());

    assert_eq!(outcome, Ok(ReloadOutcome::Applied { count: 1 }));
    assert_eq!(
        store.base_locale().map(|base| base.name),
        Some("Commune de Gentilly".to_owned())
    );
    assert_eq!(store.epoch(), 0);
}

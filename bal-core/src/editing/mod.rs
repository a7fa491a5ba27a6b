//! Single-writer editing state layered on the [`EntityStore`].
//!
//! The [`EditingCoordinator`] is the only component that writes the editing
//! pointer. Entering edit mode requires a write credential, and any applied
//! reload of the store returns the coordinator to [`EditingState::Idle`] so
//! a stale target is never exposed.

mod draw;

use std::cell::RefCell;

use log::debug;

use crate::access::{
    CollectionKind, DataAccess, EntityDraft, FetchError, MutationError, MutationTarget,
};
use crate::credential::{Credential, CredentialProvider};
use crate::entity::{Entity, EntityRef};
use crate::store::EntityStore;

pub use draw::DrawMode;

/// Observable editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingState {
    /// Nothing is being edited.
    Idle,
    /// The referenced entity is open in the editor.
    Editing(EntityRef),
}

impl EditingState {
    /// Target being edited, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&EntityRef> {
        match self {
            Self::Idle => None,
            Self::Editing(target) => Some(target),
        }
    }
}

/// Outcome of a successful create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport {
    /// Entity as returned by the address database.
    pub entity: Entity,
    /// Failures of the reloads issued after the mutation.
    ///
    /// The mutation itself succeeded; the store keeps its previous
    /// collections for the failed kinds.
    pub refresh_errors: Vec<FetchError>,
}

#[derive(Debug)]
struct LiveEdit {
    target: EntityRef,
    epoch: u64,
    credential: Credential,
}

/// Owns the editing pointer of one session.
///
/// # Examples
///
/// ```
/// use bal_core::test_support::{StaticCredentials, StubDataAccess, block_on_for_tests};
/// use bal_core::{EditingCoordinator, EditingState, EntityRef, EntityStore, SessionScope};
///
/// let store = EntityStore::new(StubDataAccess::default(), SessionScope::new("bal-1", "94067"));
/// let coordinator = EditingCoordinator::new(store, StaticCredentials::signed_in("token"));
///
/// assert!(coordinator.request_edit(EntityRef::street("v1")));
/// assert_eq!(coordinator.state(), EditingState::Editing(EntityRef::street("v1")));
///
/// let outcomes = block_on_for_tests(coordinator.store().reload_all());
/// assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()));
/// assert_eq!(coordinator.state(), EditingState::Idle);
/// ```
#[derive(Debug)]
pub struct EditingCoordinator<D, C> {
    store: EntityStore<D>,
    credentials: C,
    live: RefCell<Option<LiveEdit>>,
}

impl<D: DataAccess, C: CredentialProvider> EditingCoordinator<D, C> {
    /// Coordinate edits over `store`, authorised by `credentials`.
    pub const fn new(store: EntityStore<D>, credentials: C) -> Self {
        Self {
            store,
            credentials,
            live: RefCell::new(None),
        }
    }

    /// Underlying store.
    pub const fn store(&self) -> &EntityStore<D> {
        &self.store
    }

    /// Current state.
    ///
    /// Reads as idle once the store has applied a reload since the edit
    /// began, or once the credential that opened the edit is no longer
    /// held. A closed edit is dropped, so no later sign-in reopens it.
    #[must_use]
    pub fn state(&self) -> EditingState {
        let held = self.credentials.credential();
        let mut live = self.live.borrow_mut();
        if let Some(edit) = live.as_ref()
            && edit.epoch == self.store.epoch()
            && held.as_ref() == Some(&edit.credential)
        {
            return EditingState::Editing(edit.target.clone());
        }
        if let Some(stale) = live.take() {
            debug!("edit of {} closed", stale.target);
        }
        EditingState::Idle
    }

    /// Whether `target` is the entity being edited.
    #[must_use]
    pub fn is_editing(&self, target: &EntityRef) -> bool {
        self.state().target() == Some(target)
    }

    /// Open `target` in the editor.
    ///
    /// Returns `false` without changing state when no credential is held,
    /// when another edit is live, or once the store is torn down.
    pub fn request_edit(&self, target: EntityRef) -> bool {
        let Some(credential) = self.credentials.credential() else {
            self.cancel_edit();
            debug!("edit of {target} ignored: no write credential");
            return false;
        };
        if self.store.is_torn_down() {
            debug!("edit of {target} ignored: session ended");
            return false;
        }
        if let EditingState::Editing(current) = self.state() {
            debug!("edit of {target} ignored: {current} is being edited");
            return false;
        }
        *self.live.borrow_mut() = Some(LiveEdit {
            target,
            epoch: self.store.epoch(),
            credential,
        });
        true
    }

    /// Close the editor.
    pub fn cancel_edit(&self) {
        self.live.borrow_mut().take();
    }

    /// Entity currently being edited.
    ///
    /// `None` when idle or when the target no longer exists in the store.
    #[must_use]
    pub fn resolve_editing(&self) -> Option<Entity> {
        match self.state() {
            EditingState::Editing(target) => self.store.get(&target),
            EditingState::Idle => None,
        }
    }

    /// Create a new entity from `draft`.
    ///
    /// # Errors
    ///
    /// [`MutationError::MissingCredential`] without a credential; otherwise
    /// whatever the data access reports. Validation errors are returned
    /// untouched for inline display.
    pub async fn create(&self, draft: &EntityDraft) -> Result<MutationReport, MutationError> {
        let credential = self.require_credential()?;
        let scope = self.store.scope();
        let entity = self
            .store
            .access()
            .mutate(&MutationTarget::Create, draft, &scope, &credential)
            .await?;
        self.cancel_edit();
        let refresh_errors = self.refresh(CollectionKind::of(entity.kind())).await;
        Ok(MutationReport {
            entity,
            refresh_errors,
        })
    }

    /// Save `draft` over the entity being edited and close the editor.
    ///
    /// On error the editor stays open.
    ///
    /// # Errors
    ///
    /// [`MutationError::NotEditing`] when idle,
    /// [`MutationError::KindMismatch`] when the draft does not match the
    /// edited kind, and data-access failures otherwise.
    pub async fn submit(&self, draft: &EntityDraft) -> Result<MutationReport, MutationError> {
        let credential = self.require_credential()?;
        let EditingState::Editing(target) = self.state() else {
            return Err(MutationError::NotEditing);
        };
        if draft.kind() != target.kind {
            return Err(MutationError::KindMismatch {
                expected: target.kind,
                found: draft.kind(),
            });
        }
        let scope = self.store.scope();
        let entity = self
            .store
            .access()
            .mutate(
                &MutationTarget::Update(target.id.clone()),
                draft,
                &scope,
                &credential,
            )
            .await?;
        self.cancel_edit();
        let refresh_errors = self.refresh(CollectionKind::of(target.kind)).await;
        Ok(MutationReport {
            entity,
            refresh_errors,
        })
    }

    /// Delete `target`, closing the editor if it was open on it.
    ///
    /// Returns the failures of the follow-up reloads.
    ///
    /// # Errors
    ///
    /// [`MutationError::MissingCredential`] without a credential; otherwise
    /// whatever the data access reports.
    pub async fn remove(&self, target: &EntityRef) -> Result<Vec<FetchError>, MutationError> {
        let credential = self.require_credential()?;
        self.store.access().remove(target, &credential).await?;
        if self.is_editing(target) {
            self.cancel_edit();
        }
        Ok(self.refresh(CollectionKind::of(target.kind)).await)
    }

    fn require_credential(&self) -> Result<Credential, MutationError> {
        self.credentials
            .credential()
            .ok_or(MutationError::MissingCredential)
    }

    async fn refresh(&self, kind: CollectionKind) -> Vec<FetchError> {
        let mut errors = Vec::new();
        for kind in [kind, CollectionKind::MapFeatures] {
            if let Err(err) = self.store.reload(kind).await {
                errors.push(err);
            }
        }
        errors
    }
}

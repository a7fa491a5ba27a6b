use std::collections::BTreeMap;

use thiserror::Error;

use crate::entity::EntityKind;

/// Errors raised while fetching a collection from the address database.
///
/// Fetch failures are recoverable: the store keeps serving the previous
/// collection and the caller surfaces a non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not reach the service.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service answered with an error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },
}

/// A mutation rejected by the service, with messages keyed by field name.
///
/// Never retried automatically; callers display the messages inline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("mutation rejected by the address database ({} invalid field(s))", .messages.len())]
pub struct ValidationError {
    /// Messages keyed by the offending field, e.g. `"numero"`.
    pub messages: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Build an error from `(field, message)` pairs.
    pub fn from_pairs<I, F, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, M)>,
        F: Into<String>,
        M: Into<String>,
    {
        let mut messages: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, message) in pairs {
            messages.entry(field.into()).or_default().push(message.into());
        }
        Self { messages }
    }

    /// Messages reported for `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.messages.get(field).map_or(&[], Vec::as_slice)
    }
}

/// Errors raised when creating, updating or removing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The service rejected the payload.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request failed before the service could validate it.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// No write credential is held.
    #[error("a write credential is required to modify entities")]
    MissingCredential,
    /// An update was submitted while nothing is being edited.
    #[error("no entity is currently being edited")]
    NotEditing,
    /// The draft does not match the kind of the edited entity.
    #[error("cannot submit a {found} draft while editing a {expected}")]
    KindMismatch {
        /// Kind of the edited entity.
        expected: EntityKind,
        /// Kind of the submitted draft.
        found: EntityKind,
    },
}

/// Errors returned by draft constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// House numbers range from 0 to 9999.
    #[error("house number {number} exceeds {max}")]
    NumberOutOfRange {
        /// Rejected number.
        number: u32,
        /// Largest accepted number.
        max: u32,
    },
    /// House numbers carry at most two positions.
    #[error("at most {max} positions are allowed, got {found}")]
    TooManyPositions {
        /// Number of positions supplied.
        found: usize,
        /// Largest accepted count.
        max: usize,
    },
    /// Names must contain at least one non-blank character.
    #[error("name must not be blank")]
    BlankName,
}

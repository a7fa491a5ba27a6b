//! Helpers shared by the CLI unit and behaviour tests.

use std::rc::Rc;

use bal_core::test_support::{StubDataAccess, street};
use bal_core::{CollectionKind, CollectionPayload, FetchError};

use crate::CliError;
use crate::suggest::{SuggestAccessBuilder, SuggestArgs, SuggestConfig};

/// Builder handing out a shared stub with scripted street responses.
#[derive(Debug, Default)]
pub(super) struct StubAccessBuilder {
    pub(super) access: Rc<StubDataAccess>,
}

impl StubAccessBuilder {
    /// Stub serving street `v1` with an east-west trace and `v2` without one.
    pub(super) fn with_streets() -> Self {
        let builder = Self::default();
        builder.access.respond(
            CollectionKind::Streets,
            Ok(CollectionPayload::Streets(vec![
                street("v1", Some(vec![(2.30, 48.85), (2.31, 48.85)])),
                street("v2", None),
            ])),
        );
        builder
    }

    /// Stub whose street fetch fails.
    pub(super) fn failing() -> Self {
        let builder = Self::default();
        builder.access.respond(
            CollectionKind::Streets,
            Err(FetchError::Network {
                url: "http://bal.test/voies".to_owned(),
                message: "connection refused".to_owned(),
            }),
        );
        builder
    }
}

impl SuggestAccessBuilder for StubAccessBuilder {
    type Access = Rc<StubDataAccess>;

    fn build(&self, _config: &SuggestConfig) -> Result<Self::Access, CliError> {
        Ok(Rc::clone(&self.access))
    }
}

/// Fully populated arguments targeting street `street`.
pub(super) fn suggest_args(street: &str) -> SuggestArgs {
    SuggestArgs {
        base_url: Some("http://bal.test/v1".to_owned()),
        base_locale: Some("bal-1".to_owned()),
        commune: Some("94067".to_owned()),
        street: Some(street.to_owned()),
        lon: Some(2.3015),
        lat: Some(48.8501),
    }
}

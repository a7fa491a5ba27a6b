//! `DataAccess` implementation over the address-database REST API.

use async_trait::async_trait;
use bal_core::{
    BaseLocale, CollectionKind, CollectionPayload, Credential, DataAccess, Entity, EntityDraft,
    EntityId, EntityKind, EntityRef, FetchError, MutationError, MutationTarget, SessionScope,
};
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::config::HttpDataAccessConfig;
use super::wire::{
    ErrorBody, HouseNumberBody, NamedPlaceBody, StreetBody, WireBaseLocale,
    WireFeatureCollection, WireHouseNumber, WireNamedPlace, WirePublishedBase, WireStreet,
    resource,
};

/// Error raised when [`HttpDataAccess`] cannot be constructed.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// HTTP client for the address-database API.
///
/// Collections are fetched without authentication; mutations send the
/// credential as `Authorization: Token <credential>`.
#[derive(Debug, Clone)]
pub struct HttpDataAccess {
    client: Client,
    config: HttpDataAccessConfig,
}

impl HttpDataAccess {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpDataAccessConfig::new(base_url))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: HttpDataAccessConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpDataAccessConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn commune_url(&self, scope: &SessionScope, resource: &str) -> String {
        self.url(&format!(
            "bases-locales/{}/communes/{}/{resource}",
            scope.base_locale, scope.commune
        ))
    }

    fn house_numbers_url(&self, street: &EntityId) -> String {
        self.url(&format!("voies/{street}/numeros"))
    }

    fn entity_url(&self, kind: EntityKind, id: &EntityId) -> String {
        self.url(&format!("{}/{id}", resource(kind)))
    }

    fn creation_url(&self, draft: &EntityDraft, scope: &SessionScope) -> String {
        match draft {
            EntityDraft::Street(_) => self.commune_url(scope, resource(EntityKind::Street)),
            EntityDraft::NamedPlace(_) => self.commune_url(scope, resource(EntityKind::NamedPlace)),
            EntityDraft::HouseNumber(number) => self.house_numbers_url(number.street()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        decode_body(response).await
    }

    /// Send an authenticated request, mapping HTTP 400 to validation errors.
    async fn send_authorised(
        &self,
        request: RequestBuilder,
        url: &str,
        credential: &Credential,
    ) -> Result<Response, MutationError> {
        let response = request
            .header(AUTHORIZATION, format!("Token {}", credential.expose()))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        if response.status() == StatusCode::BAD_REQUEST {
            let body: ErrorBody = decode_body(response).await?;
            return Err(MutationError::Validation(body.into_validation_error()));
        }
        response
            .error_for_status()
            .map_err(|err| MutationError::Fetch(self.convert_reqwest_error(&err, url)))
    }

    /// Convert a reqwest error to a `FetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    response.json().await.map_err(|err| FetchError::Decode {
        message: err.to_string(),
    })
}

#[async_trait(?Send)]
impl DataAccess for HttpDataAccess {
    async fn fetch(
        &self,
        kind: CollectionKind,
        scope: &SessionScope,
    ) -> Result<CollectionPayload, FetchError> {
        let payload = match kind {
            CollectionKind::Streets => {
                let url = self.commune_url(scope, resource(EntityKind::Street));
                let wire: Vec<WireStreet> = self.get_json(&url).await?;
                CollectionPayload::Streets(wire.into_iter().map(|s| s.into_street(scope)).collect())
            }
            CollectionKind::NamedPlaces => {
                let url = self.commune_url(scope, resource(EntityKind::NamedPlace));
                let wire: Vec<WireNamedPlace> = self.get_json(&url).await?;
                CollectionPayload::NamedPlaces(
                    wire.into_iter()
                        .map(WireNamedPlace::into_named_place)
                        .collect(),
                )
            }
            CollectionKind::HouseNumbers => {
                let Some(street) = scope.street.as_ref() else {
                    return Ok(CollectionPayload::HouseNumbers(Vec::new()));
                };
                let url = self.house_numbers_url(street);
                let wire: Vec<WireHouseNumber> = self.get_json(&url).await?;
                CollectionPayload::HouseNumbers(
                    wire.into_iter()
                        .map(WireHouseNumber::into_house_number)
                        .collect(),
                )
            }
            CollectionKind::MapFeatures => {
                let url = self.commune_url(scope, "geojson");
                let wire: WireFeatureCollection = self.get_json(&url).await?;
                CollectionPayload::MapFeatures(wire.into_map_features())
            }
        };
        debug!("fetched {} {kind}", payload.len());
        Ok(payload)
    }

    async fn fetch_base_locale(&self, scope: &SessionScope) -> Result<BaseLocale, FetchError> {
        let url = self.url(&format!("bases-locales/{}", scope.base_locale));
        let wire: WireBaseLocale = self.get_json(&url).await?;
        let published: Vec<WirePublishedBase> = match self.config.published_bases_url.as_deref() {
            Some(list_url) => self.get_json(list_url).await?,
            None => {
                debug!("no published list configured; {} reads as unpublished", wire.id);
                Vec::new()
            }
        };
        Ok(wire.into_base_locale(&published))
    }

    async fn mutate(
        &self,
        target: &MutationTarget,
        draft: &EntityDraft,
        scope: &SessionScope,
        credential: &Credential,
    ) -> Result<Entity, MutationError> {
        let (method, url) = match target {
            MutationTarget::Create => (Method::POST, self.creation_url(draft, scope)),
            MutationTarget::Update(id) => (Method::PUT, self.entity_url(draft.kind(), id)),
        };
        let request = self.client.request(method, &url);
        let request = match draft {
            EntityDraft::Street(street) => request.json(&StreetBody::from(street)),
            EntityDraft::NamedPlace(place) => request.json(&NamedPlaceBody::from(place)),
            EntityDraft::HouseNumber(number) => request.json(&HouseNumberBody::from(number)),
        };
        let response = self.send_authorised(request, &url, credential).await?;
        let entity = match draft.kind() {
            EntityKind::Street => {
                let wire: WireStreet = decode_body(response).await?;
                Entity::Street(wire.into_street(scope))
            }
            EntityKind::NamedPlace => {
                let wire: WireNamedPlace = decode_body(response).await?;
                Entity::NamedPlace(wire.into_named_place())
            }
            EntityKind::HouseNumber => {
                let wire: WireHouseNumber = decode_body(response).await?;
                Entity::HouseNumber(wire.into_house_number())
            }
        };
        debug!("saved {}", entity.entity_ref());
        Ok(entity)
    }

    async fn remove(
        &self,
        target: &EntityRef,
        credential: &Credential,
    ) -> Result<(), MutationError> {
        let url = self.entity_url(target.kind, &target.id);
        let request = self.client.request(Method::DELETE, &url);
        self.send_authorised(request, &url, credential).await?;
        debug!("removed {target}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bal_core::{HouseNumberDraft, StreetDraft};
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> HttpDataAccess {
        HttpDataAccess::new("http://bal.example.com/v1/").expect("client should build")
    }

    #[fixture]
    fn scope() -> SessionScope {
        SessionScope::new("bal-1", "94067")
    }

    #[rstest]
    fn commune_url_strips_trailing_slash(client: HttpDataAccess, scope: SessionScope) {
        assert_eq!(
            client.commune_url(&scope, "voies"),
            "http://bal.example.com/v1/bases-locales/bal-1/communes/94067/voies"
        );
    }

    #[rstest]
    fn house_numbers_are_created_under_their_street(client: HttpDataAccess, scope: SessionScope) {
        let draft = EntityDraft::from(
            HouseNumberDraft::new(3, EntityId::from("v7")).expect("valid number"),
        );
        assert_eq!(
            client.creation_url(&draft, &scope),
            "http://bal.example.com/v1/voies/v7/numeros"
        );
    }

    #[rstest]
    fn streets_are_created_under_the_commune(client: HttpDataAccess, scope: SessionScope) {
        let draft = EntityDraft::from(StreetDraft::new("Grande Rue").expect("valid name"));
        assert_eq!(
            client.creation_url(&draft, &scope),
            "http://bal.example.com/v1/bases-locales/bal-1/communes/94067/voies"
        );
    }

    #[rstest]
    #[case(EntityKind::Street, "http://bal.example.com/v1/voies/x1")]
    #[case(EntityKind::NamedPlace, "http://bal.example.com/v1/toponymes/x1")]
    #[case(EntityKind::HouseNumber, "http://bal.example.com/v1/numeros/x1")]
    fn entity_urls_follow_kind(
        client: HttpDataAccess,
        #[case] kind: EntityKind,
        #[case] expected: &str,
    ) {
        assert_eq!(client.entity_url(kind, &EntityId::from("x1")), expected);
    }
}

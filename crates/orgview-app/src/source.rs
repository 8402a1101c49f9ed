//! Where hierarchies, search results and map data come from.

use crate::error::DataSourceError;
use crate::service::DirectoryService;
use async_trait::async_trait;
use orgview_api::{
    AddConnectionRequest, AddConnectionResponse, ApiError, AutocompleteRequest, SuggestionDto,
};
use orgview_core::{EmployeeRecord, LocationBucket, PersonNode, SearchFilter};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

#[async_trait]
pub trait OrgDataSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<EmployeeRecord>, DataSourceError>;

    async fn autocomplete(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SuggestionDto>, DataSourceError>;

    /// Full reporting tree rooted at `name`. Malformed payloads are rejected here.
    async fn hierarchy(&self, name: &str) -> Result<PersonNode, DataSourceError>;

    async fn map_data(&self, name: &str) -> Result<Vec<LocationBucket>, DataSourceError>;

    async fn add_connection(
        &self,
        req: AddConnectionRequest,
    ) -> Result<AddConnectionResponse, DataSourceError>;
}

/// In-process source backed by a [`DirectoryService`].
#[derive(Clone)]
pub struct LocalDataSource {
    service: DirectoryService,
}

impl LocalDataSource {
    pub fn new(service: DirectoryService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &DirectoryService {
        &self.service
    }
}

#[async_trait]
impl OrgDataSource for LocalDataSource {
    async fn search(&self, query: &str) -> Result<Vec<EmployeeRecord>, DataSourceError> {
        Ok(self.service.search_records(query, &SearchFilter::default()))
    }

    async fn autocomplete(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SuggestionDto>, DataSourceError> {
        Ok(self.service.autocomplete(AutocompleteRequest {
            q: query.to_string(),
            limit: Some(u32::try_from(limit).unwrap_or(u32::MAX)),
        }))
    }

    async fn hierarchy(&self, name: &str) -> Result<PersonNode, DataSourceError> {
        Ok(self.service.hierarchy(name)?)
    }

    async fn map_data(&self, name: &str) -> Result<Vec<LocationBucket>, DataSourceError> {
        Ok(self.service.map_data(name)?)
    }

    async fn add_connection(
        &self,
        req: AddConnectionRequest,
    ) -> Result<AddConnectionResponse, DataSourceError> {
        Ok(self.service.add_connection(req)?)
    }
}

/// Network source talking to a running `orgview-server`.
pub struct HttpDataSource {
    base_url: Url,
    http_client: Client,
}

impl HttpDataSource {
    pub fn new(base_url: &str) -> Result<Self, DataSourceError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| DataSourceError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            base_url,
            http_client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Endpoint URL with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DataSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DataSourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Value, DataSourceError> {
        tracing::debug!(%url, "GET");
        let response = self.http_client.get(url.clone()).query(query).send().await?;
        Self::read_json(url, response).await
    }

    async fn read_json(url: Url, response: Response) -> Result<Value, DataSourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // The server reports failures as `ApiError` bodies.
        match response.json::<ApiError>().await {
            Ok(err) => Err(err.into()),
            Err(_) if status == StatusCode::NOT_FOUND => {
                Err(DataSourceError::NotFound(url.to_string()))
            }
            Err(_) => Err(DataSourceError::Status {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            }),
        }
    }
}

#[async_trait]
impl OrgDataSource for HttpDataSource {
    async fn search(&self, query: &str) -> Result<Vec<EmployeeRecord>, DataSourceError> {
        let url = self.endpoint(&["api", "search"])?;
        let body = self.get_json(url, &[("q", query)]).await?;
        Ok(serde_json::from_value(body).map_err(orgview_core::CoreError::from)?)
    }

    async fn autocomplete(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SuggestionDto>, DataSourceError> {
        let url = self.endpoint(&["api", "autocomplete"])?;
        let limit = limit.to_string();
        let body = self
            .get_json(url, &[("q", query), ("limit", limit.as_str())])
            .await?;
        Ok(serde_json::from_value(body).map_err(orgview_core::CoreError::from)?)
    }

    async fn hierarchy(&self, name: &str) -> Result<PersonNode, DataSourceError> {
        let url = self.endpoint(&["api", "hierarchy", name])?;
        let body = self.get_json(url, &[]).await?;
        Ok(PersonNode::from_json_value(body)?)
    }

    async fn map_data(&self, name: &str) -> Result<Vec<LocationBucket>, DataSourceError> {
        let url = self.endpoint(&["api", "map-data", name])?;
        let body = self.get_json(url, &[]).await?;
        Ok(serde_json::from_value(body).map_err(orgview_core::CoreError::from)?)
    }

    async fn add_connection(
        &self,
        req: AddConnectionRequest,
    ) -> Result<AddConnectionResponse, DataSourceError> {
        let url = self.endpoint(&["api", "add-connection"])?;
        tracing::debug!(%url, "POST");
        let response = self.http_client.post(url.clone()).json(&req).send().await?;
        let body = Self::read_json(url, response).await?;
        Ok(serde_json::from_value(body).map_err(orgview_core::CoreError::from)?)
    }
}

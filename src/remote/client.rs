use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, Response};
use std::marker::PhantomData;
use std::time::Duration;

use crate::cache::Record;
use crate::config::{BackendConfig, Config};
use crate::error::RemoteError;
use crate::query::ListQuery;

use super::api_types::{classify_failure, failure_message, id_filter, list_params};
use super::table::RemoteTable;

/// PostgREST API client wrapper
#[derive(Clone)]
pub struct RestClient {
  http: reqwest::Client,
  /// Base URL with a trailing slash
  base: String,
  api_key: String,
  config: BackendConfig,
}

impl RestClient {
  pub fn new(config: &BackendConfig) -> Result<Self> {
    let api_key = Config::get_api_key()?;
    Self::with_key(config, api_key)
  }

  pub fn with_key(config: &BackendConfig, api_key: String) -> Result<Self> {
    let url = url::Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid backend url {}: {}", config.url, e))?;
    if url.cannot_be_a_base() {
      return Err(eyre!("Invalid backend url {}: not a base url", config.url));
    }

    let mut base = url.to_string();
    if !base.ends_with('/') {
      base.push('/');
    }

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      api_key,
      config: config.clone(),
    })
  }

  /// Handle to the table holding `T`
  pub fn table<T: Record>(&self) -> RestTable<T> {
    RestTable {
      client: self.clone(),
      endpoint: format!("{}rest/v1/{}", self.base, T::table()),
      qualified: self.config.qualified(T::table()),
      _marker: PhantomData,
    }
  }
}

/// One table behind the REST API.
#[derive(Clone)]
pub struct RestTable<T> {
  client: RestClient,
  endpoint: String,
  /// Schema-qualified name the backend uses in error messages
  qualified: String,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RestTable<T> {
  #[cfg(test)]
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  fn request(&self, method: Method) -> RequestBuilder {
    let schema = &self.client.config.schema;
    self
      .client
      .http
      .request(method, &self.endpoint)
      .header("apikey", &self.client.api_key)
      .bearer_auth(&self.client.api_key)
      .header("Accept-Profile", schema)
      .header("Content-Profile", schema)
  }

  /// Pass successful responses through; classify failed ones.
  async fn check(&self, response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(failure_message(status, &body), &self.qualified))
  }

  async fn rows(&self, response: Response) -> Result<Vec<T>, RemoteError> {
    let response = self.check(response).await?;
    response
      .json::<Vec<T>>()
      .await
      .map_err(|e| RemoteError::other(format!("Failed to parse {} rows: {}", self.qualified, e)))
  }
}

impl<T: Record> RemoteTable<T> for RestTable<T> {
  async fn list(&self, query: &ListQuery<T::Filter>) -> Result<Vec<T>, RemoteError> {
    tracing::debug!(table = %self.qualified, "list");
    let response = self
      .request(Method::GET)
      .query(&list_params::<T>(query))
      .send()
      .await?;
    self.rows(response).await
  }

  async fn get(&self, id: &str) -> Result<Option<T>, RemoteError> {
    tracing::debug!(table = %self.qualified, id, "get");
    let response = self
      .request(Method::GET)
      .query(&[("select".to_string(), "*".to_string()), id_filter(id)])
      .query(&[("limit", "1")])
      .send()
      .await?;
    Ok(self.rows(response).await?.into_iter().next())
  }

  async fn insert(&self, draft: &T::Draft) -> Result<T, RemoteError> {
    tracing::debug!(table = %self.qualified, "insert");
    let response = self
      .request(Method::POST)
      .header("Prefer", "return=representation")
      .json(draft)
      .send()
      .await?;
    self
      .rows(response)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| RemoteError::other(format!("Insert into {} returned no row", self.qualified)))
  }

  async fn update(&self, id: &str, patch: &T::Patch) -> Result<Option<T>, RemoteError> {
    tracing::debug!(table = %self.qualified, id, "update");
    let response = self
      .request(Method::PATCH)
      .query(&[id_filter(id)])
      .header("Prefer", "return=representation")
      .json(patch)
      .send()
      .await?;
    Ok(self.rows(response).await?.into_iter().next())
  }

  async fn delete(&self, id: &str) -> Result<(), RemoteError> {
    tracing::debug!(table = %self.qualified, id, "delete");
    let response = self
      .request(Method::DELETE)
      .query(&[id_filter(id)])
      .send()
      .await?;
    self.check(response).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shelter::types::{AdoptionRequest, Pet};

  fn backend(url: &str) -> BackendConfig {
    BackendConfig {
      url: url.to_string(),
      schema: "public".to_string(),
      timeout_secs: Some(1),
    }
  }

  #[test]
  fn test_table_endpoints() {
    let client = RestClient::with_key(&backend("https://demo.supabase.co"), "key".into()).unwrap();
    assert_eq!(
      client.table::<Pet>().endpoint(),
      "https://demo.supabase.co/rest/v1/pets"
    );

    let client = RestClient::with_key(&backend("http://localhost:8000/api"), "key".into()).unwrap();
    let requests = client.table::<AdoptionRequest>();
    assert_eq!(requests.endpoint(), "http://localhost:8000/api/rest/v1/adoption_requests");
    assert_eq!(requests.qualified, "public.adoption_requests");
  }

  #[test]
  fn test_rejects_invalid_url() {
    assert!(RestClient::with_key(&backend("not a url"), "key".into()).is_err());
    assert!(RestClient::with_key(&backend("mailto:ops@example.com"), "key".into()).is_err());
  }

  #[tokio::test]
  async fn test_unreachable_backend_is_not_classified() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let client = RestClient::with_key(&backend("http://127.0.0.1:9"), "key".into()).unwrap();
    let err = client
      .table::<Pet>()
      .list(&ListQuery::default())
      .await
      .unwrap_err();
    assert!(!err.is_table_missing());
  }
}

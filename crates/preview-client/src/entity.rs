//! Thin CRUD wrapper over the entity storage service
//!
//! The admin UI's list/detail pages are plain plumbing around these calls;
//! nothing here touches the preview pipeline. Errors reuse the same
//! interpretation as the evaluation client so banners render uniformly.

use crate::http::{header_content_type, interpret_failure, transport, ClientConfig};
use preview_core::error::PreviewError;
use serde_json::Value as JsonValue;

/// Client for saved entity documents.
pub struct EntityClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl EntityClient {
    /// Build a client from config.
    ///
    /// # Errors
    /// `PreviewError::Transport` when the underlying client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, PreviewError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;
        Ok(Self { http, config })
    }

    fn collection_url(&self, kind: &str) -> String {
        format!("{}/api/entity/{kind}", self.config.base_url)
    }

    fn item_url(&self, kind: &str, id: &str) -> String {
        format!("{}/api/entity/{kind}/{id}", self.config.base_url)
    }

    /// List saved documents of one kind.
    pub async fn list(&self, kind: &str) -> Result<JsonValue, PreviewError> {
        let response = self
            .http
            .get(self.collection_url(kind))
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    /// Fetch one saved document.
    pub async fn get(&self, kind: &str, id: &str) -> Result<JsonValue, PreviewError> {
        let response = self
            .http
            .get(self.item_url(kind, id))
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    /// Save a document, returning the stored representation.
    pub async fn save(&self, kind: &str, document: &JsonValue) -> Result<JsonValue, PreviewError> {
        let response = self
            .http
            .post(self.collection_url(kind))
            .json(document)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    /// Delete one saved document.
    pub async fn delete(&self, kind: &str, id: &str) -> Result<(), PreviewError> {
        let response = self
            .http
            .delete(self.item_url(kind, id))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let content_type = header_content_type(&response);
        let body = response.bytes().await.map_err(transport)?;
        Err(interpret_failure(status, content_type.as_deref(), &body))
    }
}

async fn read_json(response: reqwest::Response) -> Result<JsonValue, PreviewError> {
    let status = response.status();
    let content_type = header_content_type(&response);
    let body = response.bytes().await.map_err(transport)?;

    if status.is_success() {
        serde_json::from_slice(&body)
            .map_err(|e| PreviewError::Transport(format!("malformed response body: {e}")))
    } else {
        Err(interpret_failure(status, content_type.as_deref(), &body))
    }
}

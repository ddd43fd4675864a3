//! Firestore REST v1 client
//!
//! Talks to one collection of one database, either in Cloud Firestore or in
//! the local emulator.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use urlencoding::encode;

use super::document::{
    decode_query_response, Document, RunQueryRequest, RunQueryResponse, FIELD_LIKE_COUNT,
};
use crate::adapters::live_query::SnapshotSource;
use crate::config::FirestoreConfig;
use crate::domain::entities::{NewPost, Post, PostId};
use crate::error::{DomainError, FirestoreError};

const CLOUD_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreClient {
    http: Client,
    /// `.../v1/projects/{p}/databases/{d}/documents`
    documents_url: String,
    collection: String,
    bearer_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &FirestoreConfig) -> Self {
        let base_url = match &config.emulator_host {
            Some(host) => format!("http://{}/v1", host.trim_end_matches('/')),
            None => CLOUD_BASE_URL.to_string(),
        };

        Self {
            http: Client::new(),
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                base_url, config.project_id, config.database
            ),
            collection: config.collection.clone(),
            bearer_token: config.bearer_token.clone(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, encode(&self.collection))
    }

    fn document_url(&self, id: &PostId) -> String {
        format!("{}/{}", self.collection_url(), encode(id.as_str()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, FirestoreError> {
        let response = self.check_status(response, resource).await?;
        response
            .json()
            .await
            .map_err(|e| FirestoreError::Deserialization(e.to_string()))
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<reqwest::Response, FirestoreError> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::NOT_FOUND {
            Err(FirestoreError::NotFound(resource.to_string()))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(FirestoreError::Unauthorized)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(FirestoreError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Add a document with a server-assigned id
    pub async fn create_document(&self, post: &NewPost) -> Result<Post, FirestoreError> {
        let response = self
            .authorize(self.http.post(self.collection_url()))
            .json(&Document::from_new_post(post))
            .send()
            .await?;

        let created: Document = self.handle_response(response, &self.collection).await?;
        created.to_post()
    }

    /// Overwrite `likeCount` on an existing document
    pub async fn patch_like_count(
        &self,
        id: &PostId,
        like_count: i64,
    ) -> Result<(), FirestoreError> {
        let response = self
            .authorize(self.http.patch(self.document_url(id)))
            .query(&[
                ("updateMask.fieldPaths", FIELD_LIKE_COUNT),
                ("currentDocument.exists", "true"),
            ])
            .json(&Document::like_count_patch(like_count))
            .send()
            .await?;

        self.check_status(response, id.as_str()).await?;
        Ok(())
    }

    pub async fn delete_document(&self, id: &PostId) -> Result<(), FirestoreError> {
        let response = self
            .authorize(self.http.delete(self.document_url(id)))
            .send()
            .await?;

        match self.check_status(response, id.as_str()).await {
            Ok(_) | Err(FirestoreError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Read the whole collection in feed order
    pub async fn run_feed_query(&self) -> Result<Vec<Post>, FirestoreError> {
        let response = self
            .authorize(self.http.post(format!("{}:runQuery", self.documents_url)))
            .json(&RunQueryRequest::newest_first(&self.collection))
            .send()
            .await?;

        let rows: Vec<RunQueryResponse> = self.handle_response(response, &self.collection).await?;
        Ok(decode_query_response(rows))
    }
}

#[async_trait]
impl SnapshotSource for FirestoreClient {
    async fn fetch_ordered(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.run_feed_query().await?)
    }
}

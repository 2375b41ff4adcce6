use serde_json::{json, Map, Value};
use tracing::debug;

use crate::plan::{DocumentWrite, Target};
use crate::MigrateError;

pub const DEFAULT_API_BASE: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub access_token: String,
    pub api_base: Option<String>,
}

/// Minimal Firestore REST v1 writer: document upserts and auto-id creates.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_base: String,
    access_token: String,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self, MigrateError> {
        if config.project_id.trim().is_empty() {
            return Err(MigrateError::NotConfigured("missing project id"));
        }
        if config.access_token.trim().is_empty() {
            return Err(MigrateError::NotConfigured("missing access token"));
        }
        let base = config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        Ok(Self {
            http: reqwest::Client::new(),
            documents_base: format!(
                "{}/projects/{}/databases/{}/documents",
                base, config.project_id, config.database
            ),
            access_token: config.access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_base, path.trim_start_matches('/'))
    }

    /// Create or replace the document at `path`.
    pub async fn upsert(&self, path: &str, fields: &Map<String, Value>) -> Result<(), MigrateError> {
        debug!(path, "PATCH document");
        let res = self
            .http
            .patch(self.url(path))
            .bearer_auth(&self.access_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check(path, res).await.map(|_| ())
    }

    /// Add a document with a generated id; returns the new document name.
    pub async fn create(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<Option<String>, MigrateError> {
        debug!(collection, "POST document");
        let res = self
            .http
            .post(self.url(collection))
            .bearer_auth(&self.access_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let body = check(collection, res).await?;
        Ok(serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("name").and_then(Value::as_str).map(str::to_string)))
    }

    pub async fn apply(&self, write: &DocumentWrite) -> Result<(), MigrateError> {
        match &write.target {
            Target::Document(path) => self.upsert(path, &write.fields).await,
            Target::Collection(collection) => self.create(collection, &write.fields).await.map(|_| ()),
        }
    }
}

async fn check(path: &str, res: reqwest::Response) -> Result<String, MigrateError> {
    let status = res.status();
    let body = res.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(MigrateError::Rejected {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

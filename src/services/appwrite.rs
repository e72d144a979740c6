use crate::models::{EntityKind, MatchWarning, Property, PurchaseProfile};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Documents fetched per request when listing a collection
const PAGE_SIZE: usize = 100;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Records loaded from a collection plus the documents that failed to parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSet<T> {
    pub items: Vec<T>,
    pub warnings: Vec<MatchWarning>,
}

/// Appwrite API client
///
/// Read-only access to the CRM collections the matcher needs:
/// - Fetching a single property
/// - Listing active properties and active purchase profiles
/// - Listing a client's purchase profiles
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub properties: String,
    pub purchase_profiles: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout: Duration,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    /// Fetch a single property by document ID
    pub async fn get_property(&self, property_id: &str) -> Result<Property, AppwriteError> {
        let url = format!(
            "{}/{}",
            self.documents_url(&self.collections.properties),
            urlencoding::encode(property_id)
        );

        tracing::debug!("Fetching property from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppwriteError::NotFound(format!("Property {} not found", property_id)))
            }
            StatusCode::UNAUTHORIZED => return Err(AppwriteError::Unauthorized),
            status if !status.is_success() => {
                return Err(AppwriteError::ApiError(format!(
                    "Failed to fetch property: {}",
                    status
                )))
            }
            _ => {}
        }

        let doc: Value = response.json().await?;

        serde_json::from_value(doc)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse property: {}", e)))
    }

    /// All listings whose status is active
    pub async fn list_active_properties(&self) -> Result<DocumentSet<Property>, AppwriteError> {
        let filters = vec![query("equal", "status", json!(["active"]))];
        self.list_documents(&self.collections.properties, filters, EntityKind::Property)
            .await
    }

    /// All purchase profiles flagged active
    pub async fn list_active_profiles(&self) -> Result<DocumentSet<PurchaseProfile>, AppwriteError> {
        let filters = vec![query("equal", "isActive", json!([true]))];
        self.list_documents(&self.collections.purchase_profiles, filters, EntityKind::Profile)
            .await
    }

    /// Every purchase profile owned by a client, active or not
    pub async fn list_client_profiles(
        &self,
        client_id: &str,
    ) -> Result<DocumentSet<PurchaseProfile>, AppwriteError> {
        let filters = vec![query("equal", "clientId", json!([client_id]))];
        self.list_documents(&self.collections.purchase_profiles, filters, EntityKind::Profile)
            .await
    }

    /// Page through a collection with cursor pagination
    ///
    /// Documents that fail to deserialize are reported as warnings so one
    /// malformed record never fails the whole load.
    async fn list_documents<T>(
        &self,
        collection: &str,
        filters: Vec<String>,
        kind: EntityKind,
    ) -> Result<DocumentSet<T>, AppwriteError>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut warnings = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut queries = filters.clone();
            queries.push(query("limit", "", json!([PAGE_SIZE])));
            if let Some(after) = &cursor {
                queries.push(query("cursorAfter", "", json!([after])));
            }

            let documents = self.fetch_page(collection, &queries).await?;
            let page_len = documents.len();
            cursor = documents
                .last()
                .and_then(|doc| doc.get("$id"))
                .and_then(|id| id.as_str())
                .map(str::to_string);

            for doc in documents {
                let id = document_id(&doc);
                match serde_json::from_value::<T>(doc) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        tracing::warn!("Skipping malformed {:?} document {}: {}", kind, id, e);
                        warnings.push(MatchWarning {
                            entity: kind,
                            entity_id: id,
                            message: format!("Malformed document: {}", e),
                        });
                    }
                }
            }

            if page_len < PAGE_SIZE || cursor.is_none() {
                break;
            }
        }

        tracing::debug!(
            "Loaded {} documents from {} ({} skipped)",
            items.len(),
            collection,
            warnings.len()
        );

        Ok(DocumentSet { items, warnings })
    }

    async fn fetch_page(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, AppwriteError> {
        let params = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.documents_url(collection), params);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list {}: {} - {}", collection, status, body);
            return Err(AppwriteError::ApiError(format!(
                "Failed to list documents: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        match json.get("documents") {
            Some(Value::Array(documents)) => Ok(documents.clone()),
            _ => Err(AppwriteError::InvalidResponse("Missing documents array".into())),
        }
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }
}

/// Appwrite JSON query string
fn query(method: &str, attribute: &str, values: Value) -> String {
    let mut q = json!({ "method": method, "values": values });
    if !attribute.is_empty() {
        q["attribute"] = Value::String(attribute.to_string());
    }
    q.to_string()
}

fn document_id(doc: &Value) -> String {
    doc.get("$id")
        .and_then(|id| id.as_str())
        .unwrap_or("<unknown>")
        .to_string()
}

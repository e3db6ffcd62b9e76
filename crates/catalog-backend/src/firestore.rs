use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::traits::{Document, DocumentStore};
use crate::wire::{decode_fields, encode_fields};

const API_BASE: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;
// Firestore rejects ARRAY_CONTAINS_ANY disjunctions past ten values
const CONTAINS_ANY_LIMIT: usize = 10;

/// REST client for the remote document database.
pub struct FirestoreClient {
    client: Client,
    api_key: String,
    base_url: String,
    documents_root: String,
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl FirestoreClient {
    pub fn new(project_id: &str, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: API_BASE.to_string(),
            documents_root: format!("projects/{}/databases/(default)/documents", project_id),
            id_token: None,
        }
    }

    /// Attach the signed-in user's token to subsequent requests.
    pub fn set_id_token(&mut self, id_token: Option<String>) {
        self.id_token = id_token;
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.documents_root,
            collection,
            urlencoding::encode(id)
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.documents_root, collection)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", self.api_key.as_str())]);
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);
        Err(BackendError::Status { status, message })
    }

    fn decode_document(wire: WireDocument) -> Result<Document, BackendError> {
        Ok(Document {
            id: document_id(&wire.name).to_string(),
            fields: decode_fields(&wire.fields)?,
        })
    }
}

/// Document ids are the last segment of the fully qualified resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn contains_any_query(collection: &str, field: &str, values: &[String]) -> Value {
    let values = if values.len() > CONTAINS_ANY_LIMIT {
        warn!(
            "truncating contains-any filter on `{}` from {} to {} values",
            field,
            values.len(),
            CONTAINS_ANY_LIMIT
        );
        &values[..CONTAINS_ANY_LIMIT]
    } else {
        values
    };
    let wrapped: Vec<Value> = values
        .iter()
        .map(|value| json!({ "stringValue": value }))
        .collect();

    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "ARRAY_CONTAINS_ANY",
                    "value": { "arrayValue": { "values": wrapped } }
                }
            }
        }
    })
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .with_auth(self.client.get(&url))
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = self.check(request.send().await?).await?;
            let page: ListResponse = response
                .json()
                .await
                .map_err(|e| BackendError::Decode(e.to_string()))?;

            for wire in page.documents {
                documents.push(Self::decode_document(wire)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("listed {} documents from `{}`", documents.len(), collection);
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let url = self.document_url(collection, id);
        let response = self.with_auth(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.check(response).await?;
        let wire: WireDocument = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Some(Self::decode_document(wire)?))
    }

    async fn query_contains_any(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Document>, BackendError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/{}:runQuery", self.base_url, self.documents_root);
        let body = contains_any_query(collection, field, values);
        let response = self
            .check(self.with_auth(self.client.post(&url)).json(&body).send().await?)
            .await?;

        let rows: Vec<QueryRow> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            // The final row of a query response may carry only read metadata
            if let Some(wire) = row.document {
                documents.push(Self::decode_document(wire)?);
            }
        }
        Ok(documents)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), BackendError> {
        let url = self.document_url(collection, id);
        let body = json!({ "fields": encode_fields(fields) });
        self.check(self.with_auth(self.client.patch(&url)).json(&body).send().await?)
            .await?;
        debug!("wrote document `{}/{}`", collection, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_from_resource_name() {
        let name = "projects/p/databases/(default)/documents/movies/m42";
        assert_eq!(document_id(name), "m42");
        assert_eq!(document_id("m42"), "m42");
    }

    #[test]
    fn test_contains_any_query_shape() {
        let query = contains_any_query(
            "movies",
            "categories",
            &["Action".to_string(), "Sci-Fi".to_string()],
        );

        let sq = &query["structuredQuery"];
        assert_eq!(sq["from"][0]["collectionId"], json!("movies"));
        let filter = &sq["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], json!("categories"));
        assert_eq!(filter["op"], json!("ARRAY_CONTAINS_ANY"));
        assert_eq!(
            filter["value"]["arrayValue"]["values"],
            json!([{ "stringValue": "Action" }, { "stringValue": "Sci-Fi" }])
        );
    }

    #[test]
    fn test_contains_any_query_caps_values_at_backend_limit() {
        let values: Vec<String> = (0..15).map(|n| format!("tag{n}")).collect();
        let query = contains_any_query("movies", "categories", &values);

        let sent = query["structuredQuery"]["where"]["fieldFilter"]["value"]["arrayValue"]
            ["values"]
            .as_array()
            .unwrap();
        assert_eq!(sent.len(), CONTAINS_ANY_LIMIT);
        assert_eq!(sent[0], json!({ "stringValue": "tag0" }));
        assert_eq!(sent[9], json!({ "stringValue": "tag9" }));
    }

    #[test]
    fn test_decode_document_unwraps_fields() {
        let wire = WireDocument {
            name: "projects/p/databases/(default)/documents/movies/m1".to_string(),
            fields: match json!({ "title": { "stringValue": "Soul" } }) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
        };

        let doc = FirestoreClient::decode_document(wire).unwrap();
        assert_eq!(doc.id, "m1");
        assert_eq!(doc.fields["title"], json!("Soul"));
    }
}

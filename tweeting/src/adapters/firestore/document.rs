//! Firestore REST wire types
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Only the value
//! kinds a post uses are modelled; anything else is ignored on read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{NewPost, Post, PostId, DEFAULT_AUTHOR};
use crate::error::FirestoreError;

pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_BODY: &str = "body";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_LIKE_COUNT: &str = "likeCount";

/// One typed Firestore value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// int64 values travel as decimal strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
}

impl Value {
    pub fn string(s: &str) -> Self {
        Self {
            string_value: Some(s.to_string()),
            ..Default::default()
        }
    }

    pub fn integer(n: i64) -> Self {
        Self {
            integer_value: Some(n.to_string()),
            ..Default::default()
        }
    }

    pub fn timestamp(ts: &DateTime<Utc>) -> Self {
        Self {
            timestamp_value: Some(ts.to_rfc3339()),
            ..Default::default()
        }
    }

    fn as_i64(&self) -> Option<i64> {
        self.integer_value
            .as_deref()
            .and_then(|s| s.parse().ok())
            .or_else(|| self.double_value.map(|d| d as i64))
    }

    fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp_value.as_deref().and_then(parse_timestamp)
    }
}

/// A Firestore document resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    /// Server-assigned, read only
    #[serde(default, skip_serializing)]
    pub create_time: Option<String>,
}

impl Document {
    /// Fields of a freshly submitted post
    pub fn from_new_post(post: &NewPost) -> Self {
        let fields = HashMap::from([
            (FIELD_AUTHOR.to_string(), Value::string(&post.author)),
            (FIELD_BODY.to_string(), Value::string(&post.body)),
            (FIELD_CREATED_AT.to_string(), Value::timestamp(&post.created_at)),
            (FIELD_LIKE_COUNT.to_string(), Value::integer(0)),
        ]);

        Self {
            fields,
            ..Default::default()
        }
    }

    /// Body of a `likeCount`-only patch
    pub fn like_count_patch(like_count: i64) -> Self {
        Self {
            fields: HashMap::from([(FIELD_LIKE_COUNT.to_string(), Value::integer(like_count))]),
            ..Default::default()
        }
    }

    /// Last segment of the resource name
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    pub fn created_by_server_at(&self) -> Option<DateTime<Utc>> {
        self.create_time.as_deref().and_then(parse_timestamp)
    }

    /// Decode into a post, filling absent fields with defaults.
    ///
    /// A document without `createdAt` falls back to its server create time.
    /// That only matters for documents returned by a write: the feed query
    /// orders by `createdAt`, and Firestore leaves documents missing an
    /// order-by field out of the result.
    pub fn to_post(&self) -> Result<Post, FirestoreError> {
        let id = self.id().ok_or_else(|| {
            FirestoreError::Deserialization(format!("document name '{}' has no id", self.name))
        })?;

        let string_field = |name: &str| {
            self.fields
                .get(name)
                .and_then(|v| v.string_value.clone())
        };

        let created_at = self
            .fields
            .get(FIELD_CREATED_AT)
            .and_then(Value::as_timestamp)
            .or_else(|| self.created_by_server_at())
            .ok_or_else(|| {
                FirestoreError::Deserialization(format!("document '{}' has no timestamp", id))
            })?;

        Ok(Post {
            id: PostId::from(id),
            author: string_field(FIELD_AUTHOR).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            body: string_field(FIELD_BODY).unwrap_or_default(),
            created_at,
            like_count: self
                .fields
                .get(FIELD_LIKE_COUNT)
                .and_then(Value::as_i64)
                .unwrap_or(0),
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// runQuery
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    pub order_by: Vec<QueryOrder>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOrder {
    pub field: FieldReference,
    pub direction: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl RunQueryRequest {
    /// Whole collection, newest `createdAt` first
    pub fn newest_first(collection: &str) -> Self {
        Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection.to_string(),
                }],
                order_by: vec![QueryOrder {
                    field: FieldReference {
                        field_path: FIELD_CREATED_AT.to_string(),
                    },
                    direction: "DESCENDING",
                }],
            },
        }
    }
}

/// One element of the streamed `runQuery` response array.
///
/// Elements without a document only report progress (`readTime`).
#[derive(Debug, Deserialize)]
pub struct RunQueryResponse {
    pub document: Option<Document>,
}

/// Decode a `runQuery` response into feed order.
///
/// Firestore breaks `createdAt` ties by document name, which is random; the
/// feed wants insertion order, so ties are re-sorted by server create time.
/// Documents that cannot be decoded are skipped.
pub fn decode_query_response(rows: Vec<RunQueryResponse>) -> Vec<Post> {
    let mut decoded: Vec<(Post, Option<DateTime<Utc>>)> = rows
        .into_iter()
        .filter_map(|row| row.document)
        .filter_map(|doc| match doc.to_post() {
            Ok(post) => Some((post, doc.created_by_server_at())),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect();

    decoded.sort_by(|(a, a_created), (b, b_created)| {
        b.created_at
            .cmp(&a.created_at)
            .then(b_created.cmp(a_created))
    });

    decoded.into_iter().map(|(post, _)| post).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_json(id: &str, created_at: &str, create_time: &str, likes: &str) -> serde_json::Value {
        json!({
            "document": {
                "name": format!("projects/demo/databases/(default)/documents/tweets/{}", id),
                "fields": {
                    "author": { "stringValue": "alice" },
                    "body": { "stringValue": "hello" },
                    "createdAt": { "timestampValue": created_at },
                    "likeCount": { "integerValue": likes }
                },
                "createTime": create_time,
                "updateTime": create_time
            },
            "readTime": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn new_post_document_uses_typed_values() {
        let post = NewPost::compose("alice", "hello").unwrap();
        let json = serde_json::to_value(Document::from_new_post(&post)).unwrap();

        assert_eq!(json["fields"]["author"]["stringValue"], "alice");
        assert_eq!(json["fields"]["body"]["stringValue"], "hello");
        assert_eq!(json["fields"]["likeCount"]["integerValue"], "0");
        assert!(json["fields"]["createdAt"]["timestampValue"].is_string());
        assert!(json.get("name").is_none());
        assert!(json.get("createTime").is_none());
    }

    #[test]
    fn like_count_patch_carries_only_that_field() {
        let json = serde_json::to_value(Document::like_count_patch(3)).unwrap();

        let fields = json["fields"].as_object().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["likeCount"]["integerValue"], "3");
    }

    #[test]
    fn decodes_document_into_post() {
        let row: RunQueryResponse = serde_json::from_value(doc_json(
            "abc",
            "2024-05-01T09:00:00Z",
            "2024-05-01T09:00:01Z",
            "4",
        ))
        .unwrap();

        let post = row.document.unwrap().to_post().unwrap();

        assert_eq!(post.id.as_str(), "abc");
        assert_eq!(post.author, "alice");
        assert_eq!(post.body, "hello");
        assert_eq!(post.like_count, 4);
        assert_eq!(post.created_at.to_rfc3339(), "2024-05-01T09:00:00+00:00");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/demo/databases/(default)/documents/tweets/xyz",
            "fields": { "body": { "stringValue": "no author" } },
            "createTime": "2024-05-01T09:00:00Z"
        }))
        .unwrap();

        let post = doc.to_post().unwrap();

        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.like_count, 0);
        assert_eq!(post.created_at, doc.created_by_server_at().unwrap());
    }

    #[test]
    fn query_response_skips_progress_rows_and_orders_ties_by_create_time() {
        let rows: Vec<RunQueryResponse> = serde_json::from_value(json!([
            doc_json("older", "2024-05-01T09:00:00Z", "2024-05-01T09:00:01Z", "0"),
            doc_json("newer", "2024-05-01T09:00:00Z", "2024-05-01T09:00:05Z", "0"),
            doc_json("latest", "2024-05-01T11:00:00Z", "2024-05-01T11:00:00Z", "1"),
            { "readTime": "2024-05-01T12:00:00Z" }
        ]))
        .unwrap();

        let posts = decode_query_response(rows);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["latest", "newer", "older"]);
    }

    #[test]
    fn empty_collection_decodes_to_empty_list() {
        let rows: Vec<RunQueryResponse> =
            serde_json::from_value(json!([{ "readTime": "2024-05-01T12:00:00Z" }])).unwrap();

        assert!(decode_query_response(rows).is_empty());
    }

    #[test]
    fn run_query_request_orders_by_created_at_descending() {
        let json = serde_json::to_value(RunQueryRequest::newest_first("tweets")).unwrap();

        assert_eq!(json["structuredQuery"]["from"][0]["collectionId"], "tweets");
        assert_eq!(
            json["structuredQuery"]["orderBy"][0]["field"]["fieldPath"],
            "createdAt"
        );
        assert_eq!(json["structuredQuery"]["orderBy"][0]["direction"], "DESCENDING");
    }
}

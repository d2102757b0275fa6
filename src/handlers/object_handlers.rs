//! HTTP handlers for object operations: insert, get (metadata or media),
//! list, delete, ACL listing, and rewrite.

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    errors::ApiError,
    models::object::Object,
    responses::{self, ListObjectsResponse, ObjectResponse, RewriteResponse},
    services::backend::SharedBackend,
};

/// Query params for the media-upload endpoint.
#[derive(Debug, Deserialize)]
pub struct InsertObjectQuery {
    pub name: Option<String>,
    #[serde(rename = "contentEncoding")]
    pub content_encoding: Option<String>,
}

/// Query params for object get.
#[derive(Debug, Deserialize)]
pub struct GetObjectQuery {
    pub generation: Option<i64>,
    pub alt: Option<String>,
}

/// Query params for object listing.
#[derive(Debug, Deserialize)]
pub struct ListObjectsQuery {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
}

/// POST `/upload/storage/v1/b/{bucket}/o?name=` — media upload: the body
/// is the raw object content, metadata comes from headers and the query.
pub async fn insert_object(
    State(backend): State<SharedBackend>,
    Path(bucket): Path<String>,
    query: Result<Query<InsertObjectQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ObjectResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let name = query
        .name
        .ok_or_else(|| ApiError::bad_request("missing required query parameter `name`"))?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let content_encoding = query
        .content_encoding
        .or_else(|| {
            headers
                .get(header::CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let object = backend.create_object(Object::new(
        bucket,
        name,
        body,
        content_type,
        content_encoding,
    ))?;
    Ok(Json(responses::object_response(&object)))
}

/// GET `/storage/v1/b/{bucket}/o/{*object}` — object metadata by default;
/// `?alt=media` returns the raw content, `?generation=` selects an
/// explicit generation, and a trailing `/acl` segment serves the object's
/// ACL listing instead.
///
/// A catch-all segment cannot coexist with deeper sibling routes, so this
/// single route owns everything under `o/` and dispatches on the tail.
pub async fn get_object(
    State(backend): State<SharedBackend>,
    Path((bucket, object)): Path<(String, String)>,
    query: Result<Query<GetObjectQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    if let Some(name) = object.strip_suffix("/acl") {
        let object = backend.get_object(&bucket, name, None)?;
        return Ok(Json(responses::acl_list_response(&object)).into_response());
    }

    let object = backend.get_object(&bucket, &object, query.generation)?;
    if query.alt.as_deref() == Some("media") {
        return Ok(media_response(&object));
    }
    Ok(Json(responses::object_response(&object)).into_response())
}

/// GET `/storage/v1/b/{bucket}/o` — list objects with optional
/// `prefix`/`delimiter` folder emulation.
pub async fn list_objects(
    State(backend): State<SharedBackend>,
    Path(bucket): Path<String>,
    query: Result<Query<ListObjectsQuery>, QueryRejection>,
) -> Result<Json<ListObjectsResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let listing = backend.list_objects(
        &bucket,
        query.prefix.as_deref(),
        query.delimiter.as_deref(),
    )?;
    Ok(Json(responses::list_objects_response(
        &listing.objects,
        &listing.common_prefixes,
    )))
}

/// DELETE `/storage/v1/b/{bucket}/o/{*object}` — remove the live record,
/// or tombstone it when the bucket is versioned.
pub async fn delete_object(
    State(backend): State<SharedBackend>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    backend.delete_object(&bucket, &object)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/storage/v1/b/{bucket}/o/{*object}` — rewrite. The wildcard tail
/// encodes `{source}/rewriteTo/b/{destBucket}/o/{destObject}`; it is parsed
/// here because the catch-all object route owns everything under `o/`.
/// Bucket names never contain `/`, so the first `/o/` after the marker
/// splits the destination unambiguously.
pub async fn rewrite_object(
    State(backend): State<SharedBackend>,
    Path((source_bucket, tail)): Path<(String, String)>,
) -> Result<Json<RewriteResponse>, ApiError> {
    let (source_object, rest) = tail
        .split_once("/rewriteTo/b/")
        .ok_or_else(|| ApiError::bad_request("unsupported object operation"))?;
    let (dest_bucket, dest_object) = rest
        .split_once("/o/")
        .ok_or_else(|| ApiError::bad_request("malformed rewrite destination"))?;
    let object =
        backend.rewrite_object(&source_bucket, source_object, dest_bucket, dest_object)?;
    Ok(Json(responses::rewrite_response(&object)))
}

/// Raw content response for `alt=media` downloads.
fn media_response(object: &Object) -> Response {
    let mut response = Response::new(Body::from(object.content.clone()));
    let headers = response.headers_mut();
    let content_type = if object.content_type.is_empty() {
        "application/octet-stream"
    } else {
        object.content_type.as_str()
    };
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&object.size().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if !object.content_encoding.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&object.content_encoding) {
            headers.insert(header::CONTENT_ENCODING, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(&object.updated.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    response
}

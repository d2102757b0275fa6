//! HTTP handlers for bucket operations.
//!
//! Each handler decodes its input, makes one backend call, and hands the
//! result to the response builders; failures become the uniform envelope
//! via `ApiError`.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    errors::ApiError,
    responses::{self, BucketResponse, ListBucketsResponse},
    services::backend::SharedBackend,
};

/// Request body for `POST /storage/v1/b`.
#[derive(Debug, Deserialize)]
pub struct CreateBucketBody {
    pub name: Option<String>,
    pub versioning: Option<BucketVersioning>,
}

#[derive(Debug, Deserialize)]
pub struct BucketVersioning {
    pub enabled: bool,
}

/// POST `/storage/v1/b` — create a bucket.
pub async fn create_bucket(
    State(backend): State<SharedBackend>,
    body: Result<Json<CreateBucketBody>, JsonRejection>,
) -> Result<Json<BucketResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let name = body.name.unwrap_or_default();
    let versioning = body.versioning.map(|v| v.enabled).unwrap_or(false);

    let bucket = backend.create_bucket(&name, versioning)?;
    Ok(Json(responses::bucket_response(&bucket)))
}

/// GET `/storage/v1/b` — list buckets, names sorted ascending.
pub async fn list_buckets(
    State(backend): State<SharedBackend>,
) -> Result<Json<ListBucketsResponse>, ApiError> {
    let buckets = backend.list_buckets()?;
    Ok(Json(responses::list_buckets_response(&buckets)))
}

/// GET `/storage/v1/b/{bucket}` — get a single bucket.
pub async fn get_bucket(
    State(backend): State<SharedBackend>,
    Path(bucket): Path<String>,
) -> Result<Json<BucketResponse>, ApiError> {
    let bucket = backend.get_bucket(&bucket)?;
    Ok(Json(responses::bucket_response(&bucket)))
}

/// DELETE `/storage/v1/b/{bucket}` — delete a bucket and its objects.
pub async fn delete_bucket(
    State(backend): State<SharedBackend>,
    Path(bucket): Path<String>,
) -> Result<StatusCode, ApiError> {
    backend.delete_bucket(&bucket)?;
    Ok(StatusCode::NO_CONTENT)
}

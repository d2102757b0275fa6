//! The storage-backend contract: every operation the HTTP surface needs,
//! expressed as a capability trait so that in-memory and persistent
//! implementations are interchangeable without touching handlers or the
//! response builders.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{bucket::Bucket, object::Object};

/// Typed failures returned by every backend operation.
///
/// No operation may abort the process; all failure is a returned value that
/// handlers translate into the uniform error envelope.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("bucket `{name}` already exists with different properties")]
    BucketConflict { name: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal storage failure: {0}")]
    Internal(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Result of a `list_objects` call: live objects plus the synthetic
/// "folder" prefixes produced by delimiter grouping.
#[derive(Debug, Default)]
pub struct ObjectListing {
    pub objects: Vec<Object>,
    pub common_prefixes: Vec<String>,
}

/// The mutable store of buckets and objects.
///
/// All operations are synchronous and complete unconditionally; the backend
/// owns its internal synchronization, so handlers share one instance across
/// concurrent requests as [`SharedBackend`].
pub trait StorageBackend: Send + Sync {
    /// Create `name` if absent. Re-creation with an identical versioning
    /// flag is an idempotent no-op; a differing flag is a `BucketConflict`.
    fn create_bucket(&self, name: &str, versioning_enabled: bool) -> StorageResult<Bucket>;

    /// All buckets, sorted lexicographically by name.
    fn list_buckets(&self) -> StorageResult<Vec<Bucket>>;

    fn get_bucket(&self, name: &str) -> StorageResult<Bucket>;

    /// Remove a bucket and cascade-delete its objects.
    fn delete_bucket(&self, name: &str) -> StorageResult<()>;

    /// Insert `object` into its bucket, stamping timestamps, filling in
    /// missing checksums, and assigning a generation. Non-versioned buckets
    /// replace the live record in place; versioned buckets append a new
    /// generation.
    fn create_object(&self, object: Object) -> StorageResult<Object>;

    /// Resolve an object. `generation == None` resolves the live record;
    /// `Some(g)` resolves that exact generation, failing with not-found when
    /// it is tombstoned.
    fn get_object(
        &self,
        bucket: &str,
        name: &str,
        generation: Option<i64>,
    ) -> StorageResult<Object>;

    /// Live objects under `prefix`, sorted by name, with keys collapsed
    /// into common prefixes at `delimiter` (flat-keyspace folder emulation).
    fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
    ) -> StorageResult<ObjectListing>;

    /// Remove the live record (non-versioned) or tombstone the live
    /// generation (versioned). Returns the affected record.
    fn delete_object(&self, bucket: &str, name: &str) -> StorageResult<Object>;

    /// Same-process copy of content, metadata, and ACL into the destination
    /// key. Always completes in one step.
    fn rewrite_object(
        &self,
        source_bucket: &str,
        source_name: &str,
        dest_bucket: &str,
        dest_name: &str,
    ) -> StorageResult<Object>;
}

/// The shared handle handlers carry as axum state.
pub type SharedBackend = Arc<dyn StorageBackend>;

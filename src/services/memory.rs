//! In-memory storage backend.
//!
//! A single `RwLock` guards the whole store, so every check-then-act
//! sequence (bucket existence check + insert, live-generation lookup +
//! tombstone) runs in one critical section and reads share the lock.
//! Versioned buckets keep every generation of an object in append order;
//! deletion tombstones the live generation instead of removing data.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::models::{
    bucket::Bucket,
    object::{Object, crc32c_base64, md5_base64},
};
use crate::services::backend::{
    ObjectListing, StorageBackend, StorageError, StorageResult,
};

/// Per-bucket state: the bucket record plus its objects, keyed by object
/// name. Each entry holds the generation history in append order; the last
/// element is the newest record, live unless tombstoned.
struct BucketEntry {
    bucket: Bucket,
    objects: BTreeMap<String, Vec<Object>>,
}

/// Backend keeping all state in process memory.
pub struct InMemoryBackend {
    store: RwLock<BTreeMap<String, BucketEntry>>,
    next_generation: AtomicI64,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(BTreeMap::new()),
            next_generation: AtomicI64::new(1),
        }
    }

    /// Basic key validation: object names must be non-empty and free of
    /// control characters. Slashes are allowed — the keyspace is flat and
    /// "folders" are emulated at list time.
    fn ensure_key_safe(key: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidArgument(
                "object name is required".into(),
            ));
        }
        if key.bytes().any(|b| b.is_ascii_control()) {
            return Err(StorageError::InvalidArgument(format!(
                "object name `{}` contains control characters",
                key.escape_default()
            )));
        }
        Ok(())
    }

    fn ensure_bucket_name_safe(name: &str) -> StorageResult<()> {
        if name.is_empty() {
            return Err(StorageError::InvalidArgument(
                "bucket name is required".into(),
            ));
        }
        if name.contains('/') || name.bytes().any(|b| b.is_ascii_control()) {
            return Err(StorageError::InvalidArgument(format!(
                "invalid bucket name `{}`",
                name.escape_default()
            )));
        }
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn create_bucket(&self, name: &str, versioning_enabled: bool) -> StorageResult<Bucket> {
        Self::ensure_bucket_name_safe(name)?;
        let mut store = self.store.write();
        match store.get(name) {
            Some(entry) if entry.bucket.versioning_enabled == versioning_enabled => {
                debug!(bucket = %name, "bucket already exists with matching properties");
                Ok(entry.bucket.clone())
            }
            Some(_) => Err(StorageError::BucketConflict {
                name: name.to_string(),
            }),
            None => {
                let bucket = Bucket::new(name, versioning_enabled);
                store.insert(
                    name.to_string(),
                    BucketEntry {
                        bucket: bucket.clone(),
                        objects: BTreeMap::new(),
                    },
                );
                info!(bucket = %name, versioning = versioning_enabled, "bucket created");
                Ok(bucket)
            }
        }
    }

    fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        // BTreeMap iteration gives the lexicographic order the wire
        // format requires.
        let store = self.store.read();
        Ok(store.values().map(|entry| entry.bucket.clone()).collect())
    }

    fn get_bucket(&self, name: &str) -> StorageResult<Bucket> {
        let store = self.store.read();
        store
            .get(name)
            .map(|entry| entry.bucket.clone())
            .ok_or_else(|| StorageError::BucketNotFound(name.to_string()))
    }

    fn delete_bucket(&self, name: &str) -> StorageResult<()> {
        let mut store = self.store.write();
        match store.remove(name) {
            Some(entry) => {
                info!(bucket = %name, objects = entry.objects.len(), "bucket deleted");
                Ok(())
            }
            None => Err(StorageError::BucketNotFound(name.to_string())),
        }
    }

    fn create_object(&self, mut object: Object) -> StorageResult<Object> {
        Self::ensure_key_safe(&object.name)?;
        let mut store = self.store.write();
        let entry = store
            .get_mut(&object.bucket_name)
            .ok_or_else(|| StorageError::BucketNotFound(object.bucket_name.clone()))?;

        if object.crc32c.is_empty() {
            object.crc32c = crc32c_base64(&object.content);
        }
        if object.md5_hash.is_empty() {
            object.md5_hash = md5_base64(&object.content);
        }
        let now = Utc::now();
        object.created = now;
        object.updated = now;
        object.deleted = None;

        if entry.bucket.versioning_enabled {
            object.generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            entry
                .objects
                .entry(object.name.clone())
                .or_default()
                .push(object.clone());
        } else {
            object.generation = 0;
            entry.objects.insert(object.name.clone(), vec![object.clone()]);
        }
        debug!(
            bucket = %object.bucket_name,
            key = %object.name,
            generation = object.generation,
            size = object.size(),
            "object stored"
        );
        Ok(object)
    }

    fn get_object(
        &self,
        bucket: &str,
        name: &str,
        generation: Option<i64>,
    ) -> StorageResult<Object> {
        let store = self.store.read();
        let entry = store
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        let not_found = || StorageError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: name.to_string(),
        };
        let generations = entry.objects.get(name).ok_or_else(not_found)?;
        let record = match generation {
            None => generations.last().filter(|obj| !obj.is_deleted()),
            Some(g) => generations
                .iter()
                .find(|obj| obj.generation == g && !obj.is_deleted()),
        };
        record.cloned().ok_or_else(not_found)
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
    ) -> StorageResult<ObjectListing> {
        let store = self.store.read();
        let entry = store
            .get(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;

        let mut objects = Vec::new();
        let mut common_prefixes = BTreeSet::new();
        for generations in entry.objects.values() {
            let Some(obj) = generations.last().filter(|obj| !obj.is_deleted()) else {
                continue;
            };
            if let Some(prefix) = prefix {
                if !obj.name.starts_with(prefix) {
                    continue;
                }
            }
            if let Some(delim) = delimiter.filter(|d| !d.is_empty()) {
                if let Some(folder) = compute_common_prefix(&obj.name, prefix, delim) {
                    common_prefixes.insert(folder);
                    continue;
                }
            }
            objects.push(obj.clone());
        }

        Ok(ObjectListing {
            objects,
            common_prefixes: common_prefixes.into_iter().collect(),
        })
    }

    fn delete_object(&self, bucket: &str, name: &str) -> StorageResult<Object> {
        let mut store = self.store.write();
        let entry = store
            .get_mut(bucket)
            .ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        let not_found = || StorageError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: name.to_string(),
        };

        if entry.bucket.versioning_enabled {
            let live = entry
                .objects
                .get_mut(name)
                .and_then(|generations| generations.last_mut())
                .filter(|obj| !obj.is_deleted())
                .ok_or_else(not_found)?;
            let now = Utc::now();
            live.deleted = Some(now);
            live.updated = now;
            debug!(bucket = %bucket, key = %name, generation = live.generation, "object tombstoned");
            Ok(live.clone())
        } else {
            let mut generations = entry.objects.remove(name).ok_or_else(not_found)?;
            let removed = generations.pop().ok_or_else(not_found)?;
            debug!(bucket = %bucket, key = %name, "object removed");
            Ok(removed)
        }
    }

    fn rewrite_object(
        &self,
        source_bucket: &str,
        source_name: &str,
        dest_bucket: &str,
        dest_name: &str,
    ) -> StorageResult<Object> {
        // Two separate critical sections; the contract requires only
        // per-entity atomicity, not a cross-key transaction.
        let source = self.get_object(source_bucket, source_name, None)?;
        let mut copy = Object::new(
            dest_bucket,
            dest_name,
            source.content.clone(),
            source.content_type.clone(),
            source.content_encoding.clone(),
        );
        copy.crc32c = source.crc32c.clone();
        copy.md5_hash = source.md5_hash.clone();
        copy.acl = source.acl.clone();
        self.create_object(copy)
    }
}

/// Collapse a key into its synthetic "folder" prefix for delimiter-based
/// listing. Returns `Some(prefix)` when the part of `key` after the
/// requested prefix contains the delimiter, otherwise `None`.
fn compute_common_prefix(key: &str, requested_prefix: Option<&str>, delimiter: &str) -> Option<String> {
    let after_prefix = match requested_prefix {
        Some(prefix) => key.strip_prefix(prefix)?,
        None => key,
    };
    let pos = after_prefix.find(delimiter)?;
    let mut combined = String::new();
    if let Some(prefix) = requested_prefix {
        combined.push_str(prefix);
    }
    combined.push_str(&after_prefix[..pos + delimiter.len()]);
    Some(combined)
}

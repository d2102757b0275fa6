//! Wire-format response shapes for the JSON API.
//!
//! Every serialization decision lives here — field names, 64-bit sizes
//! encoded as decimal strings, RFC 3339 timestamps, and omit-vs-empty
//! rules — so that all endpoints render identically. Each builder is a
//! pure function from entities to a serde struct.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::models::{bucket::Bucket, object::Object};

/// The fixed RFC 3339 profile used for every timestamp field
/// (seconds precision, `Z` for UTC).
fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Serialize, Debug)]
pub struct BucketResponse {
    kind: &'static str,
    id: String,
    name: String,
}

pub fn bucket_response(bucket: &Bucket) -> BucketResponse {
    BucketResponse {
        kind: "storage#bucket",
        id: bucket.name.clone(),
        name: bucket.name.clone(),
    }
}

#[derive(Serialize, Debug)]
pub struct ListBucketsResponse {
    kind: &'static str,
    items: Vec<BucketResponse>,
}

/// Buckets render in the order given; the backend already sorts them.
pub fn list_buckets_response(buckets: &[Bucket]) -> ListBucketsResponse {
    ListBucketsResponse {
        kind: "storage#buckets",
        items: buckets.iter().map(bucket_response).collect(),
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResponse {
    kind: &'static str,
    id: String,
    bucket: String,
    name: String,
    /// Decimal string, never a bare number: JSON consumers backed by
    /// floating-point numbers would lose 64-bit precision.
    size: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    content_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    content_encoding: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    crc32c: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    md5_hash: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    acl: Vec<AclEntryResponse>,
    time_created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_deleted: Option<String>,
    updated: String,
}

pub fn object_response(object: &Object) -> ObjectResponse {
    ObjectResponse {
        kind: "storage#object",
        id: object.id(),
        bucket: object.bucket_name.clone(),
        name: object.name.clone(),
        size: object.size().to_string(),
        content_type: object.content_type.clone(),
        content_encoding: object.content_encoding.clone(),
        crc32c: object.crc32c.clone(),
        md5_hash: object.md5_hash.clone(),
        acl: acl_entries(object),
        time_created: rfc3339(object.created),
        time_deleted: object.deleted.map(rfc3339),
        updated: rfc3339(object.updated),
    }
}

#[derive(Serialize, Debug)]
pub struct ListObjectsResponse {
    kind: &'static str,
    items: Vec<ObjectResponse>,
    prefixes: Vec<String>,
}

pub fn list_objects_response(objects: &[Object], prefixes: &[String]) -> ListObjectsResponse {
    ListObjectsResponse {
        kind: "storage#objects",
        items: objects.iter().map(object_response).collect(),
        prefixes: prefixes.to_vec(),
    }
}

#[derive(Serialize, Debug)]
pub struct AclEntryResponse {
    bucket: String,
    entity: String,
    object: String,
    role: String,
}

#[derive(Serialize, Debug)]
pub struct AclListResponse {
    kind: &'static str,
    /// Omitted entirely when the object carries no ACL entries; an empty
    /// ACL must never render as a list holding a null-like placeholder.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<AclEntryResponse>,
}

pub fn acl_list_response(object: &Object) -> AclListResponse {
    AclListResponse {
        kind: "storage#objectAccessControls",
        items: acl_entries(object),
    }
}

fn acl_entries(object: &Object) -> Vec<AclEntryResponse> {
    object
        .acl
        .iter()
        .map(|rule| AclEntryResponse {
            bucket: object.bucket_name.clone(),
            entity: rule.entity.clone(),
            object: object.name.clone(),
            role: rule.role.clone(),
        })
        .collect()
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    kind: &'static str,
    total_bytes_rewritten: String,
    object_size: String,
    done: bool,
    rewrite_token: String,
    resource: ObjectResponse,
}

/// A rewrite is a same-process copy, so it always reports completion in a
/// single step with no continuation token.
pub fn rewrite_response(object: &Object) -> RewriteResponse {
    let size = object.size().to_string();
    RewriteResponse {
        kind: "storage#rewriteResponse",
        total_bytes_rewritten: size.clone(),
        object_size: size,
        done: true,
        rewrite_token: String::new(),
        resource: object_response(object),
    }
}

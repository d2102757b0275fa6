//! Represents an object (blob) stored in a bucket, plus the checksum
//! helpers used to fill in its integrity metadata.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A single access-control entry attached to an object.
///
/// Pure metadata: entries are echoed back verbatim and never enforced.
#[derive(Clone, Debug, PartialEq)]
pub struct AclRule {
    /// The grantee (e.g. "allUsers", "user-jane@example.com").
    pub entity: String,

    /// The granted role (e.g. "READER", "OWNER").
    pub role: String,
}

/// A named blob within a bucket, carrying its content and metadata.
///
/// Within a non-versioned bucket `(bucket_name, name)` identifies the object
/// and `generation` stays 0; within a versioning-enabled bucket each write
/// produces a new record with a fresh generation, so
/// `(bucket_name, name, generation)` is the identity.
#[derive(Clone, Debug)]
pub struct Object {
    /// Name of the bucket this object lives in.
    pub bucket_name: String,

    /// Object key (path-like identifier within the bucket).
    pub name: String,

    /// Raw content bytes.
    pub content: Bytes,

    /// Content type (MIME type); empty when unset.
    pub content_type: String,

    /// Content encoding (e.g. "gzip"); empty when unset.
    pub content_encoding: String,

    /// Base64-encoded CRC32C (Castagnoli) checksum of the content.
    pub crc32c: String,

    /// Base64-encoded MD5 digest of the content.
    pub md5_hash: String,

    /// Ordered access-control entries.
    pub acl: Vec<AclRule>,

    /// When this record was created.
    pub created: DateTime<Utc>,

    /// When this record was last updated.
    pub updated: DateTime<Utc>,

    /// Tombstone timestamp; `None` while the record is live.
    pub deleted: Option<DateTime<Utc>>,

    /// Version identifier; 0 in non-versioned buckets.
    pub generation: i64,
}

impl Object {
    /// Build a fresh object with checksums computed from `content` and an
    /// empty ACL. Timestamps and generation are finalized by the backend on
    /// insert.
    pub fn new(
        bucket_name: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<Bytes>,
        content_type: impl Into<String>,
        content_encoding: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            bucket_name: bucket_name.into(),
            name: name.into(),
            crc32c: crc32c_base64(&content),
            md5_hash: md5_base64(&content),
            content,
            content_type: content_type.into(),
            content_encoding: content_encoding.into(),
            acl: Vec::new(),
            created: now,
            updated: now,
            deleted: None,
            generation: 0,
        }
    }

    /// Stable wire identifier: `bucket/name`, with `#generation` appended
    /// for versioned records.
    pub fn id(&self) -> String {
        if self.generation == 0 {
            format!("{}/{}", self.bucket_name, self.name)
        } else {
            format!("{}/{}#{}", self.bucket_name, self.name, self.generation)
        }
    }

    /// Content length in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Whether this record has been tombstoned.
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

/// Base64-encoded CRC32C (Castagnoli) checksum over the big-endian u32,
/// the encoding the Cloud Storage API uses for the `crc32c` field.
pub fn crc32c_base64(data: &[u8]) -> String {
    BASE64_STANDARD.encode(crc32c::crc32c(data).to_be_bytes())
}

/// Base64-encoded MD5 digest, the encoding of the `md5Hash` field.
pub fn md5_base64(data: &[u8]) -> String {
    BASE64_STANDARD.encode(md5::compute(data).0)
}

//! Represents a logical bucket — a top-level container for objects.

use chrono::{DateTime, Utc};

/// A storage bucket in the fake Cloud Storage server.
///
/// Buckets act as namespaces for objects. Names are unique within a backend;
/// the versioning flag decides whether writes to an existing object key
/// replace it in place or append a new generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    /// Globally unique bucket name.
    pub name: String,

    /// Whether object versioning is enabled for this bucket.
    pub versioning_enabled: bool,

    /// When this bucket was created.
    pub time_created: DateTime<Utc>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, versioning_enabled: bool) -> Self {
        Self {
            name: name.into(),
            versioning_enabled,
            time_created: Utc::now(),
        }
    }
}

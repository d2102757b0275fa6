//! Core data models for the fake Cloud Storage server.
//!
//! These entities represent the logical structure of buckets and objects.
//! They are plain in-memory values; every wire-format decision lives in the
//! `responses` module so that all endpoints render identically.

pub mod bucket;
pub mod object;

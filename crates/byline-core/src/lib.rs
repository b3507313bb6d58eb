//! Core types and trait definitions for the byline blog backend.
//!
//! This crate is deliberately free of HTTP and database-driver dependencies.
//! All other crates depend on it; the heaviest thing it pulls in is `bson`,
//! for the store-native key type.

pub mod authz;
pub mod identity;
pub mod post;
pub mod profile;
pub mod reconcile;
pub mod store;

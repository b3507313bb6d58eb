//! User identity — the local record behind an external subject.
//!
//! Identities are created lazily on the first successful token verification
//! for a previously unseen subject, and are never deleted. The `username`
//! field stores the provider's subject id verbatim; it is the join key
//! between external claims and local records.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local user identity.
///
/// `id` is the store-assigned key. Records provisioned by earlier deployments
/// may lack one, so absence is a typed state rather than a lookup-time
/// surprise; the authorization gate falls back to the join key for such
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id:           Option<ObjectId>,
  /// External-subject identifier. Unique, immutable, opaque — never shown to
  /// end users as-is.
  pub username:     String,
  pub email:        String,
  /// May be empty; back-filled once if a later token carries a name.
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::BlogStore::insert_user`].
/// `id` and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:     String,
  pub email:        String,
  pub display_name: String,
}

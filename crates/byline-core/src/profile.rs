//! Profile types — an identity's public presence.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::User;

/// A user profile. At most one per identity; created lazily on the first
/// access to "my profile" and mutated only by its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub id:           ObjectId,
  /// Owner snapshot; `user.username` is the unique owner join key.
  pub user:         User,
  pub display_name: String,
  pub bio:          String,
  pub profession:   String,
  pub gender:       String,
  pub location:     String,
  pub website:      String,
  pub avatar_url:   Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`crate::store::BlogStore::insert_profile`]. Everything except
/// the seeded display name starts empty.
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub display_name: String,
}

/// Partial update for a profile. `None` leaves a field untouched; the avatar
/// field distinguishes "leave alone" from "clear", as with post images.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
  pub display_name: Option<String>,
  pub bio:          Option<String>,
  pub profession:   Option<String>,
  pub gender:       Option<String>,
  pub location:     Option<String>,
  pub website:      Option<String>,
  pub avatar_url:   Option<Option<String>>,
}

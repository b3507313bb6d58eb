//! Post types — the blog's primary resource.
//!
//! A post embeds a snapshot of the identity that created it. The snapshot is
//! immutable after creation, which is also why the owner filter and the
//! authorization gate tolerate partially-populated author records: snapshots
//! taken under older provisioning paths may differ in which fields they
//! carry.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::User;

/// A stored blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:         ObjectId,
  pub title:      String,
  pub content:    String,
  pub image_url:  Option<String>,
  pub author:     User,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Monotonically non-decreasing.
  pub views:      u64,
  /// Join keys of identities that liked this post. Set semantics: an
  /// identity appears at most once.
  pub likes:      Vec<String>,
}

impl Post {
  /// Whether the identity behind `username` is in the like set.
  pub fn liked_by(&self, username: &str) -> bool {
    self.likes.iter().any(|u| u == username)
  }

  pub fn like_count(&self) -> u64 {
    self.likes.len() as u64
  }
}

/// Input to [`crate::store::BlogStore::insert_post`]. The owner is passed
/// separately from the authenticated identity — there is no author field a
/// client could supply.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:     String,
  pub content:   String,
  pub image_url: Option<String>,
}

/// Partial update for a post. `None` leaves a field untouched; the image
/// field distinguishes "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
  pub title:     Option<String>,
  pub content:   Option<String>,
  pub image_url: Option<Option<String>>,
}

/// Result of a like toggle: the new membership state plus the new count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
  Liked { count: u64 },
  Unliked { count: u64 },
}

impl LikeOutcome {
  pub fn count(&self) -> u64 {
    match self {
      Self::Liked { count } | Self::Unliked { count } => *count,
    }
  }
}

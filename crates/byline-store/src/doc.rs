//! BSON document types for the MongoDB backend.
//!
//! Mirrors of the core records with store-native field names (`_id`) and
//! BSON datetime encoding, kept out of `byline-core` so the driver's wire
//! format stays a backend concern. Conversions are lossless in both
//! directions.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_dt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use byline_core::{identity::User, post::Post, profile::Profile};

/// Stored identity. Also embedded as the author/owner snapshot on posts and
/// profiles; snapshots from older provisioning paths may lack an `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
  pub id:           Option<ObjectId>,
  pub username:     String,
  pub email:        String,
  pub display_name: String,
  #[serde(with = "bson_dt")]
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDoc {
  #[serde(rename = "_id")]
  pub id:         ObjectId,
  pub title:      String,
  pub content:    String,
  #[serde(default)]
  pub image_url:  Option<String>,
  pub author:     UserDoc,
  #[serde(with = "bson_dt")]
  pub created_at: DateTime<Utc>,
  #[serde(with = "bson_dt")]
  pub updated_at: DateTime<Utc>,
  #[serde(default)]
  pub views:      u64,
  #[serde(default)]
  pub likes:      Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDoc {
  #[serde(rename = "_id")]
  pub id:           ObjectId,
  pub user:         UserDoc,
  pub display_name: String,
  #[serde(default)]
  pub bio:          String,
  #[serde(default)]
  pub profession:   String,
  #[serde(default)]
  pub gender:       String,
  #[serde(default)]
  pub location:     String,
  #[serde(default)]
  pub website:      String,
  #[serde(default)]
  pub avatar_url:   Option<String>,
  #[serde(with = "bson_dt")]
  pub created_at:   DateTime<Utc>,
  #[serde(with = "bson_dt")]
  pub updated_at:   DateTime<Utc>,
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<UserDoc> for User {
  fn from(doc: UserDoc) -> Self {
    Self {
      id:           doc.id,
      username:     doc.username,
      email:        doc.email,
      display_name: doc.display_name,
      created_at:   doc.created_at,
    }
  }
}

impl From<&User> for UserDoc {
  fn from(user: &User) -> Self {
    Self {
      id:           user.id,
      username:     user.username.clone(),
      email:        user.email.clone(),
      display_name: user.display_name.clone(),
      created_at:   user.created_at,
    }
  }
}

impl From<PostDoc> for Post {
  fn from(doc: PostDoc) -> Self {
    Self {
      id:         doc.id,
      title:      doc.title,
      content:    doc.content,
      image_url:  doc.image_url,
      author:     doc.author.into(),
      created_at: doc.created_at,
      updated_at: doc.updated_at,
      views:      doc.views,
      likes:      doc.likes,
    }
  }
}

impl From<ProfileDoc> for Profile {
  fn from(doc: ProfileDoc) -> Self {
    Self {
      id:           doc.id,
      user:         doc.user.into(),
      display_name: doc.display_name,
      bio:          doc.bio,
      profession:   doc.profession,
      gender:       doc.gender,
      location:     doc.location,
      website:      doc.website,
      avatar_url:   doc.avatar_url,
      created_at:   doc.created_at,
      updated_at:   doc.updated_at,
    }
  }
}

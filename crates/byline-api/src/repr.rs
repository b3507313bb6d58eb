//! Client-facing representations with derived fields.

use byline_core::{identity::User, post::Post, profile::Profile};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display string for an author. Raw provider subject ids are long opaque
/// strings; those render as `Anonymous` rather than leak into the UI.
pub fn author_name(user: &User) -> String {
  if !user.display_name.is_empty() {
    return user.display_name.clone();
  }
  if let Some((local, _)) = user.email.split_once('@') {
    return local.to_string();
  }
  if !user.email.is_empty() {
    return user.email.clone();
  }
  if user.username.len() <= 20 {
    return user.username.clone();
  }
  "Anonymous".to_string()
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PostRepr {
  #[serde(rename = "_id")]
  pub id:         String,
  pub title:      String,
  pub content:    String,
  pub image_url:  Option<String>,
  /// Author join key.
  pub author:     String,
  pub author_id:  Option<String>,
  pub author_name: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub views:      u64,
  pub like_count: u64,
  pub is_liked:   bool,
}

impl PostRepr {
  /// Shape a post for `viewer` (the requester's join key, if
  /// authenticated). `is_liked` is always false for anonymous requesters.
  pub fn new(post: &Post, viewer: Option<&str>) -> Self {
    Self {
      id:          post.id.to_hex(),
      title:       post.title.clone(),
      content:     post.content.clone(),
      image_url:   post.image_url.clone(),
      author:      post.author.username.clone(),
      author_id:   post.author.id.map(|id| id.to_hex()),
      author_name: author_name(&post.author),
      created_at:  post.created_at,
      updated_at:  post.updated_at,
      views:       post.views,
      like_count:  post.like_count(),
      is_liked:    viewer.is_some_and(|v| post.liked_by(v)),
    }
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileRepr {
  #[serde(rename = "_id")]
  pub id:           String,
  pub username:     String,
  /// Owner view only; the public view omits the field entirely.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
  pub display_name: String,
  pub bio:          String,
  pub profession:   String,
  pub gender:       String,
  pub location:     String,
  pub website:      String,
  pub avatar_url:   Option<String>,
  pub blog_count:   u64,
  /// Creation month and year, e.g. `May 2023`.
  pub member_since: String,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub auth_warning: Option<String>,
}

impl ProfileRepr {
  fn base(profile: &Profile, blog_count: u64) -> Self {
    Self {
      id:           profile.id.to_hex(),
      username:     profile.user.username.clone(),
      email:        None,
      display_name: profile.display_name.clone(),
      bio:          profile.bio.clone(),
      profession:   profile.profession.clone(),
      gender:       profile.gender.clone(),
      location:     profile.location.clone(),
      website:      profile.website.clone(),
      avatar_url:   profile.avatar_url.clone(),
      blog_count,
      member_since: profile.created_at.format("%B %Y").to_string(),
      created_at:   profile.created_at,
      updated_at:   profile.updated_at,
      auth_warning: None,
    }
  }

  /// Full view for the profile's owner.
  pub fn owner(
    profile: &Profile,
    blog_count: u64,
    auth_warning: Option<String>,
  ) -> Self {
    Self {
      email: Some(profile.user.email.clone()),
      auth_warning,
      ..Self::base(profile, blog_count)
    }
  }

  /// Public view: everything the owner sees minus the email.
  pub fn public(profile: &Profile, blog_count: u64) -> Self {
    Self::base(profile, blog_count)
  }
}

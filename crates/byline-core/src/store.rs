//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`byline-store` ships a
//! MongoDB backend and an in-memory backend). Higher layers depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use bson::oid::ObjectId;

use crate::{
  identity::{NewUser, User},
  post::{LikeOutcome, NewPost, Post, PostPatch},
  profile::{NewProfile, Profile, ProfilePatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`BlogStore::list_posts`].
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
  /// Owner filter. Matched against the author join key (exact), the stored
  /// author email (exact), and — when the string contains `@` — its local
  /// part as an email prefix. The three match sets are unioned and
  /// de-duplicated: author snapshots provisioned at different times may
  /// carry the owner identity in different fields.
  pub author: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a blog store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`). Mutating post
/// operations do not authorize; callers gate through
/// [`crate::authz::authorize`] first.
pub trait BlogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Look up an identity by join key (exact, case-sensitive).
  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Create and persist a new identity. The store assigns the id and the
  /// creation timestamp; the join key must be unused.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Set the display name on the identity behind `username`.
  ///
  /// Called at most once per identity, to back-fill an empty name; callers
  /// never overwrite a non-empty one.
  fn set_display_name<'a>(
    &'a self,
    username: &'a str,
    display_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post owned by `author`. Timestamps and counters are
  /// store-assigned.
  fn insert_post<'a>(
    &'a self,
    author: &'a User,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + 'a;

  /// Retrieve a post by native key. Returns `None` if not found.
  fn get_post(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// List posts, newest first, optionally filtered (see [`PostQuery`]).
  fn list_posts<'a>(
    &'a self,
    query: &'a PostQuery,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Apply a partial update and bump `updated_at`. Returns the updated
  /// post, or `None` if the id does not exist.
  fn update_post(
    &self,
    id: ObjectId,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post. Returns whether a post was removed.
  fn delete_post(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically increment the view counter. Returns the new count, or
  /// `None` if the id does not exist.
  fn increment_views(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send + '_;

  /// Flip like-set membership for `username`: add if absent, remove if
  /// present. Atomic at the store layer; `None` if the id does not exist.
  fn toggle_like<'a>(
    &'a self,
    id: ObjectId,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<LikeOutcome>, Self::Error>> + Send + 'a;

  /// Posts whose like set contains `username`, newest first.
  fn posts_liked_by<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Number of posts owned by the identity behind `username`.
  fn count_posts_by<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Retrieve a profile by native key. Returns `None` if not found.
  fn get_profile(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Exact owner join-key match.
  fn find_profile<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Case-insensitive owner join-key match.
  fn find_profile_ci<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// First profile whose display name contains `fragment`,
  /// case-insensitively.
  fn find_profile_by_display_name<'a>(
    &'a self,
    fragment: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Create the profile for `owner`. At most one per identity; the store
  /// assigns the id and timestamps.
  fn insert_profile<'a>(
    &'a self,
    owner: &'a User,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + 'a;

  /// Apply a partial update and bump `updated_at`. Returns the updated
  /// profile, or `None` if the id does not exist.
  fn update_profile(
    &self,
    id: ObjectId,
    patch: ProfilePatch,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;
}

//! Reference reconciliation — resolving a client-supplied string reference
//! to a store record.
//!
//! A reference arriving in a path segment may be a store-native key (24-char
//! hex `ObjectId`) or, for profiles, something human-readable. Resolution is
//! ordered so exact lookups are never shadowed by fuzzy ones:
//!
//! | rank | strategy                                 | applies to      |
//! |------|------------------------------------------|-----------------|
//! | 1    | native-key decode + direct lookup        | posts, profiles |
//! | 2    | exact join-key match                     | profiles        |
//! | 3    | case-insensitive join-key match          | profiles        |
//! | 4    | display-name substring, case-insensitive | profiles        |
//!
//! A miss at every rank is the caller's `NotFound`; intermediate misses are
//! not errors.

use bson::oid::ObjectId;

use crate::{post::Post, profile::Profile, store::BlogStore};

/// Resolve a post reference. Posts are only addressable by native key; a
/// reference that does not decode cannot match anything.
pub async fn resolve_post<S: BlogStore>(
  store: &S,
  reference: &str,
) -> Result<Option<Post>, S::Error> {
  match ObjectId::parse_str(reference) {
    Ok(id) => store.get_post(id).await,
    Err(_) => Ok(None),
  }
}

/// Resolve a profile reference through the full fallback chain.
pub async fn resolve_profile<S: BlogStore>(
  store: &S,
  reference: &str,
) -> Result<Option<Profile>, S::Error> {
  if let Ok(id) = ObjectId::parse_str(reference)
    && let Some(profile) = store.get_profile(id).await?
  {
    return Ok(Some(profile));
  }
  if let Some(profile) = store.find_profile(reference).await? {
    return Ok(Some(profile));
  }
  if let Some(profile) = store.find_profile_ci(reference).await? {
    return Ok(Some(profile));
  }
  store.find_profile_by_display_name(reference).await
}

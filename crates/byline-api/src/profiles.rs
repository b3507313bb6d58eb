//! Handlers for `/profiles` endpoints.
//!
//! "My profile" is created lazily on first access, seeded with the owner's
//! display name (falling back to the join key). Other identities' profiles
//! resolve through the full reconciliation chain and render as the public
//! view.

use axum::{
  Json,
  extract::{Path, State},
};
use byline_core::{
  authz::same_identity,
  profile::{NewProfile, Profile, ProfilePatch},
  reconcile,
  store::BlogStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{Identity, MaybeIdentity},
  error::ApiError,
  repr::ProfileRepr,
};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

async fn blog_count<S: BlogStore>(
  state: &AppState<S>,
  profile: &Profile,
) -> Result<u64, ApiError> {
  state
    .store
    .count_posts_by(&profile.user.username)
    .await
    .map_err(store_err)
}

/// Fetch the requester's own profile, creating it on first access. Never
/// creates a profile for another identity.
async fn get_or_create_own<S: BlogStore>(
  state: &AppState<S>,
  identity: &Identity,
) -> Result<Profile, ApiError> {
  let user = &identity.user;
  if let Some(profile) =
    state.store.find_profile(&user.username).await.map_err(store_err)?
  {
    return Ok(profile);
  }

  let display_name = if user.display_name.is_empty() {
    user.username.clone()
  } else {
    user.display_name.clone()
  };
  tracing::info!(username = %user.username, "auto-creating profile");
  state
    .store
    .insert_profile(user, NewProfile { display_name })
    .await
    .map_err(store_err)
}

// ─── Own profile ─────────────────────────────────────────────────────────────

/// `GET /profiles/me`
pub async fn me<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<ProfileRepr>, ApiError> {
  let profile = get_or_create_own(&state, &identity).await?;
  let count = blog_count(&state, &profile).await?;
  Ok(Json(ProfileRepr::owner(&profile, count, identity.auth_warning())))
}

/// A present field deserializes to `Some(value)` — including an explicit
/// `null`, which becomes `Some(None)`. An absent field stays `None`.
fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateBody {
  pub display_name: Option<String>,
  pub bio:          Option<String>,
  pub profession:   Option<String>,
  pub gender:       Option<String>,
  pub location:     Option<String>,
  pub website:      Option<String>,
  /// `null` clears the avatar; leaving the field out keeps it.
  #[serde(default, deserialize_with = "present")]
  pub avatar_url:   Option<Option<String>>,
}

/// `POST /profiles/me` and `PATCH /profiles/me` — update own profile
/// fields, creating the profile first if absent.
pub async fn me_update<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ProfileRepr>, ApiError> {
  let profile = get_or_create_own(&state, &identity).await?;
  let patch = ProfilePatch {
    display_name: body.display_name,
    bio:          body.bio,
    profession:   body.profession,
    gender:       body.gender,
    location:     body.location,
    website:      body.website,
    avatar_url:   body.avatar_url,
  };

  let updated = state
    .store
    .update_profile(profile.id, patch)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
  let count = blog_count(&state, &updated).await?;
  Ok(Json(ProfileRepr::owner(&updated, count, identity.auth_warning())))
}

// ─── Other profiles ──────────────────────────────────────────────────────────

async fn resolve<S: BlogStore>(
  state: &AppState<S>,
  reference: &str,
) -> Result<Profile, ApiError> {
  reconcile::resolve_profile(state.store.as_ref(), reference)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {reference} not found")))
}

/// `GET /profiles/{ref}` — owner view for the owner, public view for
/// everyone else.
pub async fn get_one<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  MaybeIdentity(identity): MaybeIdentity,
  Path(reference): Path<String>,
) -> Result<Json<ProfileRepr>, ApiError> {
  let profile = resolve(&state, &reference).await?;
  let count = blog_count(&state, &profile).await?;

  let is_owner = identity
    .as_ref()
    .is_some_and(|i| same_identity(&i.user, &profile.user).is_some());
  let repr = if is_owner {
    let warning = identity.as_ref().and_then(|i| i.auth_warning());
    ProfileRepr::owner(&profile, count, warning)
  } else {
    ProfileRepr::public(&profile, count)
  };
  Ok(Json(repr))
}

/// `GET /profiles/{ref}/public` — public view always, owner included.
pub async fn get_public<S: BlogStore + 'static>(
  State(state): State<AppState<S>>,
  Path(reference): Path<String>,
) -> Result<Json<ProfileRepr>, ApiError> {
  let profile = resolve(&state, &reference).await?;
  let count = blog_count(&state, &profile).await?;
  Ok(Json(ProfileRepr::public(&profile, count)))
}

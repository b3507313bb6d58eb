//! Identity resolution: verified claims to a local user record.

use byline_core::{
  identity::{NewUser, User},
  store::BlogStore,
};

use crate::verifier::VerifiedToken;

/// Look up the local identity behind `claims`, creating it on first sight.
///
/// The subject id is the join key, matched exactly and case-sensitively. A
/// stored identity with an empty display name is back-filled once when the
/// claims carry one; a non-empty stored name is never overwritten. Returns
/// the `created` flag so callers can branch on first-time-user behavior.
///
/// Cannot fail on valid claims; store errors propagate as upstream failures,
/// not authentication failures.
pub async fn resolve_identity<S: BlogStore>(
  store: &S,
  claims: &VerifiedToken,
) -> Result<(User, bool), S::Error> {
  if let Some(mut user) = store.find_user(&claims.subject).await? {
    if user.display_name.is_empty() && !claims.display_name.is_empty() {
      store
        .set_display_name(&claims.subject, &claims.display_name)
        .await?;
      user.display_name = claims.display_name.clone();
    }
    return Ok((user, false));
  }

  let user = store
    .insert_user(NewUser {
      username:     claims.subject.clone(),
      email:        claims.email.clone(),
      display_name: claims.display_name.clone(),
    })
    .await?;
  tracing::info!(subject = %claims.subject, "provisioned new identity");
  Ok((user, true))
}

//! Authentication extractors.
//!
//! [`MaybeIdentity`] runs on every route that allows anonymous access: a
//! missing or malformed Authorization header yields `None`, while a present
//! bearer token is verified and resolved to a local user. [`Identity`] is
//! the auth-required form; it rejects with 401 when no identity was
//! attempted.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use byline_auth::{Verification, VerifyError, parse_bearer, resolve_identity};
use byline_core::{identity::User, store::BlogStore};

use crate::{AppState, error::ApiError};

/// A verified, resolved requester identity.
pub struct Identity {
  pub user:         User,
  pub verification: Verification,
}

impl Identity {
  /// Warning surfaced on owner views when the clock-skew fallback fired.
  pub fn auth_warning(&self) -> Option<String> {
    match self.verification {
      Verification::Full => None,
      Verification::ClockSkewUnverified => {
        Some("using unverified token due to clock skew".to_string())
      }
    }
  }
}

/// `Some` when a bearer token was presented and verified, `None` when no
/// identity was attempted.
pub struct MaybeIdentity(pub Option<Identity>);

fn map_verify(e: VerifyError) -> ApiError {
  match e {
    VerifyError::Provider(_) | VerifyError::KeySet(_) => {
      ApiError::Upstream(e.to_string())
    }
    other => ApiError::InvalidCredential(other.to_string()),
  }
}

impl<S> FromRequestParts<AppState<S>> for MaybeIdentity
where
  S: BlogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok());
    let Some(token) = parse_bearer(header) else {
      return Ok(Self(None));
    };

    let verified = state.verifier.verify(token).await.map_err(map_verify)?;
    let (user, _created) = resolve_identity(state.store.as_ref(), &verified)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;

    Ok(Self(Some(Identity {
      user,
      verification: verified.verification,
    })))
  }
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
  S: BlogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let MaybeIdentity(identity) =
      MaybeIdentity::from_request_parts(parts, state).await?;
    identity.ok_or(ApiError::Unauthenticated)
  }
}

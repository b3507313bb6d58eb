//! Bearer-token authentication for the byline blog backend.
//!
//! Two pieces: the [`verifier`] validates an opaque bearer token against the
//! identity provider's published key set and produces claims; the
//! [`resolver`] maps those claims to a local [`byline_core::identity::User`],
//! creating one on first sight.

pub mod resolver;
pub mod verifier;

pub use resolver::resolve_identity;
pub use verifier::{
  KeySet, TokenVerifier, Verification, VerifiedToken, VerifierConfig,
  VerifyError, parse_bearer,
};

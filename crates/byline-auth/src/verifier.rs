//! Token verification against the identity provider's published key set.
//!
//! The provider publishes a JWKS document; keys are fetched once per process
//! through an idempotent check-then-init and selected by `kid`. A failed
//! fetch leaves the cell empty, so the next verification retries it.
//!
//! "Used too early" (a `nbf` in the future, or an `iat` beyond leeway) is a
//! typed failure reason. Under the development-mode flag — and only then —
//! that one reason falls back to an unverified payload decode, returned with
//! a [`Verification::ClockSkewUnverified`] marker. Every other failure is
//! fatal regardless of the flag.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VerifyError {
  /// The token is not decodable as a JWT at all.
  #[error("malformed token: {0}")]
  Malformed(String),

  /// Signature, audience, or issuer check failed.
  #[error("invalid token: {0}")]
  Invalid(String),

  #[error("token expired")]
  Expired,

  /// Token used too early: `nbf` in the future or `iat` beyond leeway.
  /// The only reason eligible for the development-mode fallback.
  #[error("token used too early")]
  Immature,

  /// The token verified but carries no subject claim.
  #[error("token has no subject")]
  MissingSubject,

  #[error("no key in the provider key set matches kid {0:?}")]
  UnknownKey(Option<String>),

  /// The provider's key-set endpoint could not be reached.
  #[error("identity provider unreachable: {0}")]
  Provider(#[from] reqwest::Error),

  #[error("invalid provider key set: {0}")]
  KeySet(String),
}

// ─── Claims ──────────────────────────────────────────────────────────────────

/// Raw token payload. Providers differ on the subject field name, so the
/// aliases accept the common spellings.
#[derive(Debug, Deserialize)]
struct Payload {
  #[serde(alias = "uid", alias = "user_id")]
  sub:          Option<String>,
  email:        Option<String>,
  name:         Option<String>,
  display_name: Option<String>,
  iat:          Option<i64>,
}

/// How the claims were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
  /// Signature and validity window checked against the provider key set.
  Full,
  /// Development-mode clock-skew fallback: payload decoded without
  /// signature verification.
  ClockSkewUnverified,
}

/// Verified claims, ready for the identity resolver.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
  pub subject:      String,
  pub email:        String,
  /// `name` claim, falling back to `display_name`, falling back to empty.
  pub display_name: String,
  pub verification: Verification,
}

impl VerifiedToken {
  fn from_payload(
    payload: Payload,
    verification: Verification,
  ) -> Result<Self, VerifyError> {
    let subject = payload.sub.unwrap_or_default();
    if subject.is_empty() {
      return Err(VerifyError::MissingSubject);
    }
    let display_name = payload
      .name
      .or(payload.display_name)
      .unwrap_or_default();
    Ok(Self {
      subject,
      email: payload.email.unwrap_or_default(),
      display_name,
      verification,
    })
  }
}

// ─── Key set ─────────────────────────────────────────────────────────────────

/// Decoding keys from the provider's JWKS document, indexed by `kid`.
pub struct KeySet {
  keys: HashMap<Option<String>, (DecodingKey, Algorithm)>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
  keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
  kty: String,
  kid: Option<String>,
  alg: Option<String>,
  n:   Option<String>,
  e:   Option<String>,
  k:   Option<String>,
}

impl KeySet {
  /// Parse a JWKS document. RSA (`kty: RSA`) and symmetric (`kty: oct`)
  /// keys are supported; anything else is skipped.
  pub fn from_jwks(body: &str) -> Result<Self, VerifyError> {
    let document: JwksDocument = serde_json::from_str(body)
      .map_err(|e| VerifyError::KeySet(e.to_string()))?;

    let mut keys = HashMap::new();
    for jwk in document.keys {
      let entry = match jwk.kty.as_str() {
        "RSA" => {
          let (n, e) = match (&jwk.n, &jwk.e) {
            (Some(n), Some(e)) => (n, e),
            _ => {
              return Err(VerifyError::KeySet(
                "RSA key missing modulus or exponent".into(),
              ));
            }
          };
          let key = DecodingKey::from_rsa_components(n, e)
            .map_err(|e| VerifyError::KeySet(e.to_string()))?;
          (key, parse_alg(jwk.alg.as_deref(), Algorithm::RS256)?)
        }
        "oct" => {
          let k = jwk.k.as_deref().ok_or_else(|| {
            VerifyError::KeySet("symmetric key missing material".into())
          })?;
          let secret = B64URL
            .decode(k)
            .map_err(|e| VerifyError::KeySet(e.to_string()))?;
          (
            DecodingKey::from_secret(&secret),
            parse_alg(jwk.alg.as_deref(), Algorithm::HS256)?,
          )
        }
        _ => continue,
      };
      keys.insert(jwk.kid, entry);
    }

    if keys.is_empty() {
      return Err(VerifyError::KeySet("no usable keys".into()));
    }
    Ok(Self { keys })
  }

  /// A single symmetric key with a fixed id — test and static deployments.
  pub fn symmetric(kid: &str, secret: &[u8]) -> Self {
    let mut keys = HashMap::new();
    keys.insert(
      Some(kid.to_string()),
      (DecodingKey::from_secret(secret), Algorithm::HS256),
    );
    Self { keys }
  }

  fn select(
    &self,
    kid: Option<&str>,
  ) -> Result<&(DecodingKey, Algorithm), VerifyError> {
    if let Some(entry) = self.keys.get(&kid.map(str::to_string)) {
      return Ok(entry);
    }
    // A single-key set serves tokens that carry no kid.
    if kid.is_none() && self.keys.len() == 1 {
      return Ok(self.keys.values().next().unwrap());
    }
    Err(VerifyError::UnknownKey(kid.map(str::to_string)))
  }
}

fn parse_alg(
  alg: Option<&str>,
  default: Algorithm,
) -> Result<Algorithm, VerifyError> {
  match alg {
    None => Ok(default),
    Some(s) => s
      .parse()
      .map_err(|_| VerifyError::KeySet(format!("unsupported algorithm {s}"))),
  }
}

// ─── Verifier ────────────────────────────────────────────────────────────────

/// Verifier configuration. Audience and issuer checks apply only when set.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
  pub jwks_url:         String,
  pub audience:         Option<String>,
  pub issuer:           Option<String>,
  /// Enables the clock-skew fallback. Never set in production.
  pub development_mode: bool,
  pub leeway_secs:      u64,
}

impl Default for VerifierConfig {
  fn default() -> Self {
    Self {
      jwks_url:         String::new(),
      audience:         None,
      issuer:           None,
      development_mode: false,
      leeway_secs:      60,
    }
  }
}

/// Stateless between calls except the one-time key-set initialization.
pub struct TokenVerifier {
  config: VerifierConfig,
  http:   reqwest::Client,
  keys:   OnceCell<KeySet>,
}

impl TokenVerifier {
  /// Verifier that fetches the key set from `config.jwks_url` on first use.
  pub fn new(config: VerifierConfig) -> Self {
    Self {
      config,
      http: reqwest::Client::new(),
      keys: OnceCell::new(),
    }
  }

  /// Verifier with a pre-seeded key set; never touches the network.
  pub fn with_key_set(config: VerifierConfig, keys: KeySet) -> Self {
    Self {
      config,
      http: reqwest::Client::new(),
      keys: OnceCell::new_with(Some(keys)),
    }
  }

  async fn key_set(&self) -> Result<&KeySet, VerifyError> {
    self
      .keys
      .get_or_try_init(|| async {
        tracing::info!(url = %self.config.jwks_url, "fetching provider key set");
        let body = self
          .http
          .get(&self.config.jwks_url)
          .send()
          .await?
          .error_for_status()?
          .text()
          .await?;
        KeySet::from_jwks(&body)
      })
      .await
  }

  /// Verify a bearer token and produce claims.
  pub async fn verify(
    &self,
    token: &str,
  ) -> Result<VerifiedToken, VerifyError> {
    let header =
      decode_header(token).map_err(|e| VerifyError::Malformed(e.to_string()))?;
    let (key, algorithm) = self.key_set().await?.select(header.kid.as_deref())?;

    let mut validation = Validation::new(*algorithm);
    validation.leeway = self.config.leeway_secs;
    validation.validate_nbf = true;
    match &self.config.audience {
      Some(aud) => validation.set_audience(&[aud]),
      None => validation.validate_aud = false,
    }
    if let Some(iss) = &self.config.issuer {
      validation.set_issuer(&[iss]);
    }

    let outcome = match decode::<Payload>(token, key, &validation) {
      Ok(data) => {
        // jsonwebtoken does not check iat; an issued-at beyond leeway is
        // the same clock-skew condition as a future nbf.
        let now = Utc::now().timestamp();
        match data.claims.iat {
          Some(iat) if iat > now + self.config.leeway_secs as i64 => {
            Err(VerifyError::Immature)
          }
          _ => Ok(data.claims),
        }
      }
      Err(e) => {
        use jsonwebtoken::errors::ErrorKind;
        Err(match e.kind() {
          ErrorKind::ImmatureSignature => VerifyError::Immature,
          ErrorKind::ExpiredSignature => VerifyError::Expired,
          _ => VerifyError::Invalid(e.to_string()),
        })
      }
    };

    match outcome {
      Ok(payload) => VerifiedToken::from_payload(payload, Verification::Full),
      Err(VerifyError::Immature) if self.config.development_mode => {
        tracing::warn!(
          "token used too early; development mode accepts it unverified"
        );
        self.decode_unverified(token)
      }
      Err(e) => Err(e),
    }
  }

  /// Clock-skew fallback: decode the payload without signature or window
  /// checks. Reached only from the `Immature` arm under development mode.
  fn decode_unverified(
    &self,
    token: &str,
  ) -> Result<VerifiedToken, VerifyError> {
    // Even with signature validation off, decode checks the header
    // algorithm against the allowed set; take it from the token itself.
    let alg = decode_header(token)
      .map(|h| h.alg)
      .map_err(|e| VerifyError::Malformed(e.to_string()))?;
    let mut validation = Validation::new(alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data =
      decode::<Payload>(token, &DecodingKey::from_secret(b""), &validation)
        // An undecodable payload means the fallback cannot apply; report
        // the condition that got us here.
        .map_err(|_| VerifyError::Immature)?;
    VerifiedToken::from_payload(data.claims, Verification::ClockSkewUnverified)
  }
}

// ─── Header parsing ──────────────────────────────────────────────────────────

/// Extract the token from an `Authorization` header value.
///
/// A missing or malformed header (wrong scheme, wrong field count) is "no
/// identity attempted" — `None`, not an error. Only a present, well-formed
/// bearer token can fail verification later.
pub fn parse_bearer(header: Option<&str>) -> Option<&str> {
  let mut parts = header?.split_whitespace();
  match (parts.next(), parts.next(), parts.next()) {
    (Some(scheme), Some(token), None)
      if scheme.eq_ignore_ascii_case("bearer") =>
    {
      Some(token)
    }
    _ => None,
  }
}

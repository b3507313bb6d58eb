//! Error type for `byline-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("bson encoding error: {0}")]
  BsonEncode(#[from] bson::ser::Error),

  #[error("bson decoding error: {0}")]
  BsonDecode(#[from] bson::de::Error),

  /// The join key is already taken; identities are unique by subject id.
  #[error("user already exists: {0}")]
  UserExists(String),

  /// At most one profile per identity.
  #[error("profile already exists for {0}")]
  ProfileExists(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

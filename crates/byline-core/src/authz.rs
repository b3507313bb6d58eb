//! Authorization gate — ranked identity equivalence.
//!
//! Writes to a resource are owner-only, decided by a single ranked
//! equivalence function shared by every mutating call site: local-id
//! equality first, join-key equality for records lacking a populated id,
//! then whole-record equivalence as a last resort. A failed strategy falls
//! through to the next; the first success wins. There is no admin bypass.

use crate::identity::User;

/// The operation class being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Read,
  Write,
}

/// Which equivalence strategy matched. Callers that only need a yes/no use
/// [`authorize`]; the variant is kept for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMatch {
  /// Both records carry a local id and the ids are equal.
  LocalId,
  /// Join keys (external subject ids) are equal.
  JoinKey,
  /// Full-record equivalence; last resort for legacy records with neither
  /// an id nor a join key.
  Record,
}

/// Ranked equivalence between two identity records.
pub fn same_identity(a: &User, b: &User) -> Option<IdentityMatch> {
  if let (Some(x), Some(y)) = (a.id, b.id)
    && x == y
  {
    return Some(IdentityMatch::LocalId);
  }
  if !a.username.is_empty() && a.username == b.username {
    return Some(IdentityMatch::JoinKey);
  }
  if a == b {
    return Some(IdentityMatch::Record);
  }
  None
}

/// Gate `op` by `actor` against the resource's `owner`. Reads are always
/// permitted; writes require a successful equivalence strategy.
pub fn authorize(actor: &User, owner: &User, op: Operation) -> bool {
  match op {
    Operation::Read => true,
    Operation::Write => same_identity(actor, owner).is_some(),
  }
}

//! User Id Value Object

use kernel::id::Id;

/// Phantom marker for user identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserMarker;

/// Typed user identifier (UUID v4)
pub type UserId = Id<UserMarker>;

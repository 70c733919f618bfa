use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix carried by every locally generated category id.
pub const PENDING_PREFIX: &str = "temp_";

/// Identifier issued by the category service for a persisted category.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a new `CategoryId` from a server-issued value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Temporary identifier for a category drafted locally but not yet saved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PendingId(Uuid);

impl PendingId {
    /// Generates a fresh random pending id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Reference to a category that may or may not exist remotely yet.
///
/// Only `Persisted` references are valid parents for a remote create call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CategoryRef {
    Pending(PendingId),
    Persisted(CategoryId),
}

impl CategoryRef {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Returns the server id when this reference is already persisted.
    #[must_use]
    pub fn persisted(&self) -> Option<&CategoryId> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Pending(_) => None,
        }
    }
}

impl From<PendingId> for CategoryRef {
    fn from(id: PendingId) -> Self {
        Self::Pending(id)
    }
}

impl From<CategoryId> for CategoryRef {
    fn from(id: CategoryId) -> Self {
        Self::Persisted(id)
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Debug for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PendingId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PENDING_PREFIX}{}", self.0)
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(id) => id.fmt(f),
            Self::Persisted(id) => id.fmt(f),
        }
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CategoryId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.starts_with(PENDING_PREFIX) {
            return Err(ParseIdError {
                kind: "CategoryId",
                raw: s.to_string(),
            });
        }
        Ok(Self::new(trimmed))
    }
}

impl FromStr for PendingId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(PENDING_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .map(PendingId)
            .ok_or_else(|| ParseIdError {
                kind: "PendingId",
                raw: s.to_string(),
            })
    }
}

impl FromStr for CategoryRef {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(PENDING_PREFIX) {
            s.parse().map(Self::Pending)
        } else {
            s.parse().map(Self::Persisted)
        }
    }
}

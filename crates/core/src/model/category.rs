use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CategoryId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,

    #[error("unknown category kind: {0}")]
    UnknownKind(String),
}

//
// ─── NAME ──────────────────────────────────────────────────────────────────────
//

/// Validated category label (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a validated category name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CategoryError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryName> for String {
    fn from(name: CategoryName) -> Self {
        name.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Classification the category service stores next to every category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    #[default]
    Subject,
    Topic,
    ExamBoard,
    Year,
}

impl CategoryKind {
    /// Kind assigned to a newly created category: top-level categories are
    /// subjects, nested ones are topics.
    #[must_use]
    pub fn for_parent(has_parent: bool) -> Self {
        if has_parent { Self::Topic } else { Self::Subject }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Topic => "topic",
            Self::ExamBoard => "exam_board",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "subject" => Ok(Self::Subject),
            "topic" => Ok(Self::Topic),
            "exam_board" => Ok(Self::ExamBoard),
            "year" => Ok(Self::Year),
            other => Err(CategoryError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── NODE ──────────────────────────────────────────────────────────────────────
//

/// A persisted category together with its nested children.
///
/// Children are kept in display order. A node has no back-reference to its
/// parent; ancestry is recovered by searching from the roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    id: CategoryId,
    name: CategoryName,
    #[serde(default)]
    kind: CategoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<CategoryNode>,
}

impl CategoryNode {
    #[must_use]
    pub fn new(id: CategoryId, name: CategoryName) -> Self {
        Self {
            id,
            name,
            kind: CategoryKind::default(),
            description: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CategoryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Blank descriptions are stored as `None`.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: CategoryNode) {
        self.children.push(child);
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use study_core::Clock;
use study_core::model::{CategoryId, CategoryKind, CategoryName, CategoryNode};
use study_core::tree::CategoryForest;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// HTTP 409 from the category service.
    #[error("conflict")]
    Conflict,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Payload of a create call.
///
/// `kind` is derived from the parent: subjects at the top, topics below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategoryRecord {
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub parent: Option<CategoryId>,
    pub description: Option<String>,
}

impl NewCategoryRecord {
    #[must_use]
    pub fn new(name: CategoryName, parent: Option<CategoryId>, description: Option<String>) -> Self {
        Self {
            name,
            kind: CategoryKind::for_parent(parent.is_some()),
            parent,
            description,
        }
    }
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: Option<CategoryName>,
    pub kind: Option<CategoryKind>,
    pub description: Option<String>,
}

/// Flat persisted shape of a category, parent linked by id.
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub parent: Option<CategoryId>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for the category service.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fetch the full hierarchy, children nested under their parents.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the categories cannot be loaded.
    async fn list_categories(&self) -> Result<CategoryForest, StorageError>;

    /// Categories of the given kind, each with its subtree.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the categories cannot be loaded.
    async fn list_by_kind(&self, kind: CategoryKind) -> Result<Vec<CategoryNode>, StorageError>;

    /// Fetch a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_category(&self, id: &CategoryId) -> Result<CategoryNode, StorageError>;

    /// Direct children of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the categories cannot be loaded.
    async fn list_subcategories(
        &self,
        parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, StorageError>;

    /// First category with an exactly matching name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the categories cannot be loaded.
    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryNode>, StorageError>;

    /// Create a category and return its server-issued id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the parent does not exist, or other
    /// storage errors.
    async fn create_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError>;

    /// Apply a partial update and return the updated category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn update_category(
        &self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<CategoryNode, StorageError>;

    /// Delete a category together with its subtree.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_category(&self, id: &CategoryId) -> Result<(), StorageError>;
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<CategoryRecord>,
    next_id: u64,
}

impl MemoryState {
    fn row(&self, id: &CategoryId) -> Option<&CategoryRecord> {
        self.rows.iter().find(|row| &row.id == id)
    }

    fn node(&self, row: &CategoryRecord) -> CategoryNode {
        let children = self
            .rows
            .iter()
            .filter(|child| child.parent.as_ref() == Some(&row.id))
            .map(|child| self.node(child))
            .collect();
        CategoryNode::new(row.id.clone(), row.name.clone())
            .with_kind(row.kind)
            .with_description(row.description.clone())
            .with_children(children)
    }

    fn forest(&self) -> CategoryForest {
        self.rows
            .iter()
            .filter(|row| row.parent.is_none())
            .map(|row| self.node(row))
            .collect::<Vec<_>>()
            .into()
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Ids are issued as `cat_<n>` in creation order.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    clock: Clock,
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            state: Arc::default(),
        }
    }

    /// Snapshot of the flat rows, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn records(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        Ok(self.lock()?.rows.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn list_categories(&self) -> Result<CategoryForest, StorageError> {
        Ok(self.lock()?.forest())
    }

    async fn list_by_kind(&self, kind: CategoryKind) -> Result<Vec<CategoryNode>, StorageError> {
        let guard = self.lock()?;
        let forest = guard.forest();
        Ok(forest
            .walk()
            .map(|(_, node)| node)
            .filter(|node| node.kind() == kind)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: &CategoryId) -> Result<CategoryNode, StorageError> {
        let guard = self.lock()?;
        let row = guard.row(id).ok_or(StorageError::NotFound)?;
        Ok(guard.node(row))
    }

    async fn list_subcategories(
        &self,
        parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .rows
            .iter()
            .filter(|row| row.parent.as_ref() == Some(parent))
            .map(|row| guard.node(row))
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryNode>, StorageError> {
        Ok(self.lock()?.forest().find_by_name(name).cloned())
    }

    async fn create_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        let mut guard = self.lock()?;
        if let Some(parent) = &record.parent {
            if guard.row(parent).is_none() {
                return Err(StorageError::NotFound);
            }
        }

        guard.next_id += 1;
        let id = CategoryId::new(format!("cat_{}", guard.next_id));
        let now = self.clock.now();
        guard.rows.push(CategoryRecord {
            id: id.clone(),
            name: record.name,
            kind: record.kind,
            parent: record.parent,
            description: record.description,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<CategoryNode, StorageError> {
        let mut guard = self.lock()?;
        let now = self.clock.now();
        let row = guard
            .rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(StorageError::NotFound)?;

        if let Some(name) = update.name {
            row.name = name;
        }
        if let Some(kind) = update.kind {
            row.kind = kind;
        }
        if let Some(description) = update.description {
            row.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        row.updated_at = now;

        let row = row.clone();
        Ok(guard.node(&row))
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let forest = guard.forest();
        if !forest.contains(id) {
            return Err(StorageError::NotFound);
        }
        let doomed = forest.descendant_ids(id);
        guard
            .rows
            .retain(|row| &row.id != id && !doomed.contains(&row.id));
        Ok(())
    }
}

/// Category repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub categories: Arc<dyn CategoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let categories: Arc<dyn CategoryRepository> = Arc::new(InMemoryRepository::new());
        Self { categories }
    }
}

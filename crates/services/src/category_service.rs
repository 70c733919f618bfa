use std::sync::Arc;

use storage::repository::{CategoryRepository, CategoryUpdate, NewCategoryRecord, StorageError};
use study_core::model::{CategoryId, CategoryKind, CategoryName, CategoryNode};
use study_core::pending::PendingTree;
use study_core::tree::CategoryForest;

use crate::commit::{CommitReport, commit_all};
use crate::error::CategoryServiceError;

/// Orchestrates category lookups and writes against the category service.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn CategoryRepository> {
        &self.categories
    }

    /// Fetch the whole hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn load_forest(&self) -> Result<CategoryForest, CategoryServiceError> {
        let forest = self.categories.list_categories().await?;
        tracing::debug!(
            roots = forest.roots().len(),
            categories = forest.len(),
            "category forest loaded"
        );
        Ok(forest)
    }

    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn list_by_kind(
        &self,
        kind: CategoryKind,
    ) -> Result<Vec<CategoryNode>, CategoryServiceError> {
        Ok(self.categories.list_by_kind(kind).await?)
    }

    /// Fetch a category by ID.
    ///
    /// Returns `Ok(None)` when the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn get(&self, id: &CategoryId) -> Result<Option<CategoryNode>, CategoryServiceError> {
        match self.categories.get_category(id).await {
            Ok(node) => Ok(Some(node)),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn subcategories(
        &self,
        parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, CategoryServiceError> {
        Ok(self.categories.list_subcategories(parent).await?)
    }

    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryNode>, CategoryServiceError> {
        Ok(self.categories.find_by_name(name.trim()).await?)
    }

    /// Create a single category. The kind follows from whether it has a parent.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Category` if the name is blank.
    /// Returns `CategoryServiceError::Storage` if the service rejects the request.
    pub async fn create(
        &self,
        name: String,
        parent: Option<CategoryId>,
        description: Option<String>,
    ) -> Result<CategoryId, CategoryServiceError> {
        let name = CategoryName::new(name)?;
        let description = description.filter(|d| !d.trim().is_empty());
        let id = self
            .categories
            .create_category(NewCategoryRecord::new(name, parent, description))
            .await?;
        Ok(id)
    }

    /// Rename, re-kind or re-describe a category. `None` leaves a field alone.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Category` if the new name is blank.
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn update(
        &self,
        id: &CategoryId,
        name: Option<String>,
        kind: Option<CategoryKind>,
        description: Option<String>,
    ) -> Result<CategoryNode, CategoryServiceError> {
        let update = CategoryUpdate {
            name: name.map(CategoryName::new).transpose()?,
            kind,
            description,
        };
        Ok(self.categories.update_category(id, update).await?)
    }

    /// Delete a category and everything below it.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn delete(&self, id: &CategoryId) -> Result<(), CategoryServiceError> {
        self.categories.delete_category(id).await?;
        tracing::debug!(%id, "category deleted");
        Ok(())
    }

    /// Send a drafted tree. Per-node failures are reported, not returned as errors.
    pub async fn commit_pending(&self, tree: &PendingTree) -> CommitReport {
        commit_all(tree, self.categories.as_ref()).await
    }
}

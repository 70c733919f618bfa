#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storage::repository::{
    CategoryRepository, CategoryUpdate, InMemoryRepository, NewCategoryRecord, StorageError,
};
use study_core::model::{CategoryId, CategoryKind, CategoryNode};
use study_core::tree::CategoryForest;

/// In-memory repository that records every create call and refuses the
/// names it was told to refuse.
#[derive(Clone, Default)]
pub struct ScriptedRepository {
    pub inner: InMemoryRepository,
    refuse: Vec<String>,
    calls: Arc<Mutex<Vec<NewCategoryRecord>>>,
}

impl ScriptedRepository {
    pub fn refusing(names: &[&str]) -> Self {
        Self {
            refuse: names.iter().map(|n| (*n).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<NewCategoryRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|record| record.name.to_string())
            .collect()
    }
}

#[async_trait]
impl CategoryRepository for ScriptedRepository {
    async fn list_categories(&self) -> Result<CategoryForest, StorageError> {
        self.inner.list_categories().await
    }

    async fn list_by_kind(&self, kind: CategoryKind) -> Result<Vec<CategoryNode>, StorageError> {
        self.inner.list_by_kind(kind).await
    }

    async fn get_category(&self, id: &CategoryId) -> Result<CategoryNode, StorageError> {
        self.inner.get_category(id).await
    }

    async fn list_subcategories(
        &self,
        parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, StorageError> {
        self.inner.list_subcategories(parent).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryNode>, StorageError> {
        self.inner.find_by_name(name).await
    }

    async fn create_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        self.calls.lock().unwrap().push(record.clone());
        if self.refuse.iter().any(|n| n == record.name.as_str()) {
            return Err(StorageError::Rejected(format!("{} refused", record.name)));
        }
        self.inner.create_category(record).await
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<CategoryNode, StorageError> {
        self.inner.update_category(id, update).await
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), StorageError> {
        self.inner.delete_category(id).await
    }
}

/// Repository whose every call fails as if the service were unreachable.
pub struct OfflineRepository;

fn offline() -> StorageError {
    StorageError::Connection("service unreachable".into())
}

#[async_trait]
impl CategoryRepository for OfflineRepository {
    async fn list_categories(&self) -> Result<CategoryForest, StorageError> {
        Err(offline())
    }

    async fn list_by_kind(&self, _kind: CategoryKind) -> Result<Vec<CategoryNode>, StorageError> {
        Err(offline())
    }

    async fn get_category(&self, _id: &CategoryId) -> Result<CategoryNode, StorageError> {
        Err(offline())
    }

    async fn list_subcategories(
        &self,
        _parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, StorageError> {
        Err(offline())
    }

    async fn find_by_name(&self, _name: &str) -> Result<Option<CategoryNode>, StorageError> {
        Err(offline())
    }

    async fn create_category(&self, _record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        Err(offline())
    }

    async fn update_category(
        &self,
        _id: &CategoryId,
        _update: CategoryUpdate,
    ) -> Result<CategoryNode, StorageError> {
        Err(offline())
    }

    async fn delete_category(&self, _id: &CategoryId) -> Result<(), StorageError> {
        Err(offline())
    }
}

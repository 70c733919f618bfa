use reqwest::Method;
use study_core::model::{CategoryId, CategoryKind, CategoryNode};
use study_core::tree::CategoryForest;

use super::HttpCategoryRepository;
use super::wire::{
    Ack, CategoryDto, CreateBody, CreatedDto, Envelope, UpdateBody, forest_from_listing, into_nodes,
};
use crate::repository::{CategoryRepository, CategoryUpdate, NewCategoryRecord, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for HttpCategoryRepository {
    async fn list_categories(&self) -> Result<CategoryForest, StorageError> {
        let url = self.endpoint(&[])?;
        let envelope: Envelope<Vec<CategoryDto>> =
            self.send(self.request(Method::GET, url)).await?;
        Ok(forest_from_listing(envelope.into_payload()?))
    }

    async fn list_by_kind(&self, kind: CategoryKind) -> Result<Vec<CategoryNode>, StorageError> {
        let url = self.endpoint(&["type", kind.as_str()])?;
        let envelope: Envelope<Vec<CategoryDto>> =
            self.send(self.request(Method::GET, url)).await?;
        Ok(into_nodes(envelope.into_payload()?))
    }

    async fn get_category(&self, id: &CategoryId) -> Result<CategoryNode, StorageError> {
        let url = self.endpoint(&[id.as_str()])?;
        let envelope: Envelope<CategoryDto> = self.send(self.request(Method::GET, url)).await?;
        envelope.into_payload()?.into_node()
    }

    async fn list_subcategories(
        &self,
        parent: &CategoryId,
    ) -> Result<Vec<CategoryNode>, StorageError> {
        let url = self.endpoint(&["parent", parent.as_str()])?;
        let envelope: Envelope<Vec<CategoryDto>> =
            self.send(self.request(Method::GET, url)).await?;
        Ok(into_nodes(envelope.into_payload()?))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryNode>, StorageError> {
        let url = self.endpoint(&["name", name])?;
        let result: Result<Envelope<CategoryDto>, StorageError> =
            self.send(self.request(Method::GET, url)).await;
        match result {
            Ok(envelope) => envelope.into_payload()?.into_node().map(Some),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        let url = self.endpoint(&[])?;
        let request = self
            .request(Method::POST, url)
            .json(&CreateBody::from(&record));
        let envelope: Envelope<CreatedDto> = self.send(request).await?;
        let created = envelope.into_payload()?;
        tracing::debug!(id = %created.id, name = %record.name, "category created");
        Ok(CategoryId::new(created.id))
    }

    async fn update_category(
        &self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<CategoryNode, StorageError> {
        let url = self.endpoint(&[id.as_str()])?;
        let request = self
            .request(Method::PUT, url)
            .json(&UpdateBody::from(&update));
        let envelope: Envelope<CategoryDto> = self.send(request).await?;
        envelope.into_payload()?.into_node()
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), StorageError> {
        let url = self.endpoint(&[id.as_str()])?;
        let ack: Ack = self.send(self.request(Method::DELETE, url)).await?;
        ack.into_result()
    }
}

use serde::{Deserialize, Serialize};
use study_core::model::{CategoryId, CategoryKind, CategoryName, CategoryNode};
use study_core::tree::CategoryForest;

use crate::repository::{CategoryUpdate, NewCategoryRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// `{ success, data?, categories?, message? }` wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    categories: Option<T>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    pub(crate) fn into_payload(self) -> Result<T, StorageError> {
        if !self.success {
            return Err(StorageError::Rejected(
                self.message.unwrap_or_else(|| "request failed".into()),
            ));
        }
        self.data
            .or(self.categories)
            .ok_or_else(|| StorageError::Serialization("response carried no payload".into()))
    }
}

/// Envelope for endpoints that return no payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    success: bool,
    message: Option<String>,
}

impl Ack {
    pub(crate) fn into_result(self) -> Result<(), StorageError> {
        if self.success {
            Ok(())
        } else {
            Err(StorageError::Rejected(
                self.message.unwrap_or_else(|| "request failed".into()),
            ))
        }
    }
}

/// Error for a non-2xx response, preferring the server's own message.
pub(crate) fn rejection(status: u16, body: &str) -> StorageError {
    if status == 409 {
        return StorageError::Conflict;
    }
    serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(|ack| ack.message)
        .map_or(StorageError::Status(status), StorageError::Rejected)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryDto {
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    children: Vec<CategoryDto>,
}

impl CategoryDto {
    fn has_parent(&self) -> bool {
        self.parent_id
            .as_deref()
            .or(self.parent.as_deref())
            .is_some_and(|p| !p.is_empty())
    }

    pub(crate) fn into_node(self) -> Result<CategoryNode, StorageError> {
        let name = CategoryName::new(self.name).map_err(ser)?;
        let kind = self
            .kind
            .as_deref()
            .and_then(|raw| raw.parse::<CategoryKind>().ok())
            .unwrap_or_default();
        let children = into_nodes(self.children);
        Ok(CategoryNode::new(CategoryId::new(self.id), name)
            .with_kind(kind)
            .with_description(self.description)
            .with_children(children))
    }
}

/// Convert a list of DTOs, dropping entries the domain model rejects.
pub(crate) fn into_nodes(dtos: Vec<CategoryDto>) -> Vec<CategoryNode> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id.clone();
            dto.into_node()
                .inspect_err(|e| tracing::warn!(%id, error = %e, "skipping malformed category"))
                .ok()
        })
        .collect()
}

/// The listing nests children under parents but may also repeat them at the
/// top level; only parentless entries become roots.
pub(crate) fn forest_from_listing(dtos: Vec<CategoryDto>) -> CategoryForest {
    let roots = dtos.into_iter().filter(|dto| !dto.has_parent()).collect();
    into_nodes(roots).into()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedDto {
    pub(crate) id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: CategoryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a NewCategoryRecord> for CreateBody<'a> {
    fn from(record: &'a NewCategoryRecord) -> Self {
        Self {
            name: record.name.as_str(),
            kind: record.kind,
            parent: record.parent.as_ref().map(CategoryId::as_str),
            description: record.description.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<CategoryKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a CategoryUpdate> for UpdateBody<'a> {
    fn from(update: &'a CategoryUpdate) -> Self {
        Self {
            name: update.name.as_ref().map(CategoryName::as_str),
            kind: update.kind,
            description: update.description.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "success": true,
        "data": [
            {
                "id": "d", "name": "Direito", "type": "subject",
                "children": [
                    { "id": "c", "name": "Constitucional", "type": "topic", "parent_id": "d" },
                    { "id": "x", "name": "  ", "type": "topic", "parent_id": "d" }
                ],
                "created_at": "2024-01-01T00:00:00Z"
            },
            { "id": "c", "name": "Constitucional", "type": "topic", "parent_id": "d" },
            { "id": "b", "name": "CESPE", "type": "exam_board" },
            { "id": "y", "name": "2024", "type": "semester" }
        ]
    }"#;

    #[test]
    fn listing_keeps_only_roots_and_skips_malformed_children() {
        let envelope: Envelope<Vec<CategoryDto>> = serde_json::from_str(LISTING).unwrap();
        let forest = forest_from_listing(envelope.into_payload().unwrap());

        let ids: Vec<_> = forest
            .walk()
            .map(|(depth, node)| (depth, node.id().as_str()))
            .collect();
        assert_eq!(ids, vec![(0, "d"), (1, "c"), (0, "b"), (0, "y")]);
        assert_eq!(forest.roots()[1].kind(), CategoryKind::ExamBoard);
        assert_eq!(forest.roots()[2].kind(), CategoryKind::Subject);
    }

    #[test]
    fn listing_payload_may_arrive_as_categories() {
        let json = r#"{ "success": true, "categories": [{ "id": "a", "name": "A" }] }"#;
        let envelope: Envelope<Vec<CategoryDto>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.into_payload().unwrap().len(), 1);
    }

    #[test]
    fn unsuccessful_envelope_is_rejected_with_message() {
        let json = r#"{ "success": false, "message": "Categoria pai não encontrada" }"#;
        let envelope: Envelope<CreatedDto> = serde_json::from_str(json).unwrap();
        match envelope.into_payload() {
            Err(StorageError::Rejected(message)) => {
                assert_eq!(message, "Categoria pai não encontrada");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_falls_back_to_status() {
        assert!(matches!(rejection(500, "<html>"), StorageError::Status(500)));
        assert!(matches!(
            rejection(403, r#"{ "success": false, "message": "Acesso negado" }"#),
            StorageError::Rejected(_)
        ));
    }

    #[test]
    fn conflict_status_maps_to_conflict() {
        let body = r#"{ "success": false, "message": "Categoria já existe" }"#;
        assert!(matches!(rejection(409, body), StorageError::Conflict));
    }

    #[test]
    fn create_body_omits_missing_parent() {
        let top = NewCategoryRecord::new(CategoryName::new("A").unwrap(), None, None);
        let json = serde_json::to_value(CreateBody::from(&top)).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "A", "type": "subject" }));

        let nested = NewCategoryRecord::new(
            CategoryName::new("B").unwrap(),
            Some(CategoryId::new("r1")),
            Some("desc".into()),
        );
        let json = serde_json::to_value(CreateBody::from(&nested)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "B", "type": "topic", "parent": "r1", "description": "desc" })
        );
    }

    #[test]
    fn update_body_sends_only_changed_fields() {
        let update = CategoryUpdate {
            kind: Some(CategoryKind::Year),
            ..CategoryUpdate::default()
        };
        let json = serde_json::to_value(UpdateBody::from(&update)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "year" }));
    }
}

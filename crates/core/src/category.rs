#![forbid(unsafe_code)]

use crate::ids::{CategoryId, deserialize_optional_category_id};
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    #[serde(rename = "category_name", alias = "name")]
    pub name: String,
    #[serde(
        rename = "parent_id",
        alias = "parentId",
        default,
        deserialize_with = "deserialize_optional_category_id"
    )]
    pub parent_id: Option<CategoryId>,
}

impl CategoryNode {
    pub fn new(id: CategoryId, name: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Create/update payload sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    #[serde(rename = "category_name")]
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl CategoryDraft {
    /// Trims the name and rejects blank or oversized labels.
    pub fn try_new(
        name: impl AsRef<str>,
        parent_id: Option<CategoryId>,
    ) -> Result<Self, DraftError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(DraftError::NameTooLong);
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(DraftError::NameContainsControl);
        }
        Ok(Self {
            name: name.to_string(),
            parent_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("category name is required")]
    EmptyName,
    #[error("category name is too long")]
    NameTooLong,
    #[error("category name contains control characters")]
    NameContainsControl,
}

impl DraftError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "NAME_REQUIRED",
            Self::NameTooLong => "NAME_TOO_LONG",
            Self::NameContainsControl => "NAME_CONTROL_CHARS",
        }
    }
}

/// Case-insensitive substring match on the display name. A blank term keeps
/// everything.
pub fn filter_by_name(nodes: &[CategoryNode], term: &str) -> Vec<CategoryNode> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|node| node.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> CategoryId {
        CategoryId::try_new(value).unwrap()
    }

    #[test]
    fn decodes_backend_shape_with_mixed_id_types() {
        let raw = r#"[
            {"id": 1, "category_name": "Root", "parent_id": null},
            {"id": "2", "category_name": "Child", "parent_id": 1},
            {"id": "3", "name": "Loose", "parentId": ""},
            {"id": "4", "category_name": "NoParentField"}
        ]"#;
        let nodes: Vec<CategoryNode> = serde_json::from_str(raw).unwrap();
        assert_eq!(nodes[0].id, id("1"));
        assert!(nodes[0].is_root());
        assert_eq!(nodes[1].parent_id, Some(id("1")));
        assert_eq!(nodes[2].name, "Loose");
        assert!(nodes[2].is_root());
        assert!(nodes[3].is_root());
    }

    #[test]
    fn rejects_blank_ids_on_decode() {
        let raw = r#"{"id": "  ", "category_name": "x", "parent_id": null}"#;
        assert!(serde_json::from_str::<CategoryNode>(raw).is_err());
    }

    #[test]
    fn draft_trims_and_serializes_wire_names() {
        let draft = CategoryDraft::try_new("  Shoes ", Some(id("7"))).unwrap();
        assert_eq!(draft.name, "Shoes");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"category_name": "Shoes", "parent_id": "7"})
        );

        let root = CategoryDraft::try_new("Top", None).unwrap();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["parent_id"], serde_json::Value::Null);
    }

    #[test]
    fn draft_rejects_blank_name() {
        assert_eq!(
            CategoryDraft::try_new("   ", None).unwrap_err(),
            DraftError::EmptyName
        );
    }

    #[test]
    fn filter_is_case_insensitive() {
        let nodes = vec![
            CategoryNode::new(id("1"), "Men Shoes", None),
            CategoryNode::new(id("2"), "Women", None),
            CategoryNode::new(id("3"), "SHOE care", Some(id("2"))),
        ];
        let hits = filter_by_name(&nodes, "shoe");
        let ids: Vec<_> = hits.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(filter_by_name(&nodes, "  ").len(), 3);
    }
}

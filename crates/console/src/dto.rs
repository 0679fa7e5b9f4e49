#![forbid(unsafe_code)]

use catadmin_core::product::Product;
use catadmin_core::{CategoryNode, EntryKind, IntegrityIssue, TreeEntry};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeRowDto {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub depth: usize,
    pub has_children: bool,
    pub is_circular_reference_marker: bool,
    pub is_depth_truncated_marker: bool,
}

impl From<TreeEntry<'_>> for TreeRowDto {
    fn from(entry: TreeEntry<'_>) -> Self {
        Self {
            id: entry.id.as_str().to_string(),
            name: entry.name.to_string(),
            parent_id: entry.parent_id.map(|id| id.as_str().to_string()),
            depth: entry.depth,
            has_children: entry.has_children,
            is_circular_reference_marker: entry.kind == EntryKind::CircularReference,
            is_depth_truncated_marker: entry.kind == EntryKind::DepthTruncated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

impl From<&CategoryNode> for CategoryDto {
    fn from(node: &CategoryNode) -> Self {
        Self {
            id: node.id.as_str().to_string(),
            name: node.name.clone(),
            parent_id: node.parent_id.as_ref().map(|id| id.as_str().to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueDto {
    pub code: String,
    pub severity: String,
    pub category: String,
    pub message: String,
    pub hint: String,
}

impl From<&IntegrityIssue> for IssueDto {
    fn from(issue: &IntegrityIssue) -> Self {
        Self {
            code: issue.code.to_string(),
            severity: issue.severity.as_str().to_string(),
            category: issue.category.as_str().to_string(),
            message: issue.message.clone(),
            hint: issue.hint.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductRowDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub total_stock: u64,
    pub stock_status: String,
}

impl ProductRowDto {
    /// `categories` resolves the category label; unknown or missing
    /// categories show as "N/A", as does a product without sizes.
    pub fn build(product: &Product, categories: &[CategoryNode]) -> Self {
        let category = product
            .category_id
            .as_ref()
            .and_then(|id| categories.iter().find(|node| &node.id == id))
            .map(|node| node.name.clone())
            .unwrap_or_else(|| "N/A".to_string());
        let price = product
            .price_range()
            .map(|range| range.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category,
            price,
            total_stock: product.total_stock(),
            stock_status: product.stock_status().label().to_string(),
        }
    }
}

#![forbid(unsafe_code)]

//! UI-state controllers. Each owns the last snapshot loaded from the backend
//! and hands it to the core explicitly; a successful mutation is always
//! followed by a full reload.

use crate::api::CatalogClient;
use crate::dto::{ProductRowDto, TreeRowDto};
use crate::error::ConsoleError;
use crate::http::Transport;
use crate::session::TokenStore;
use catadmin_core::product::{Product, filter_products};
use catadmin_core::{
    CategoryDraft, CategoryId, CategoryNode, HierarchyGuard, IntegrityIssue, ProductId,
    filter_by_name,
};

/// How an edit treats the parent reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParentChange {
    Keep,
    Root,
    Set(CategoryId),
}

pub struct CategoryController<T, S> {
    client: CatalogClient<T, S>,
    categories: Vec<CategoryNode>,
    max_depth: usize,
}

impl<T: Transport, S: TokenStore> CategoryController<T, S> {
    pub fn new(client: CatalogClient<T, S>, max_depth: usize) -> Self {
        Self {
            client,
            categories: Vec::new(),
            max_depth,
        }
    }

    pub fn client(&self) -> &CatalogClient<T, S> {
        &self.client
    }

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories
    }

    pub fn guard(&self) -> HierarchyGuard<'_> {
        HierarchyGuard::new(&self.categories)
    }

    /// Replaces the snapshot wholesale.
    pub fn reload(&mut self) -> Result<usize, ConsoleError> {
        self.categories = self.client.list_categories()?;
        tracing::debug!(count = self.categories.len(), "categories loaded");
        Ok(self.categories.len())
    }

    fn require(&self, id: &CategoryId) -> Result<&CategoryNode, ConsoleError> {
        self.categories
            .iter()
            .find(|node| &node.id == id)
            .ok_or_else(|| ConsoleError::UnknownCategory(id.clone()))
    }

    /// The mutation already landed; a failed reload leaves the old snapshot
    /// in place instead of failing the call.
    fn refresh_after_mutation(&mut self) {
        if let Err(err) = self.reload() {
            tracing::warn!(code = err.code(), error = %err, "reload after mutation failed");
        }
    }

    /// Rows of the rendered tree, optionally restricted to names matching
    /// `search`.
    pub fn tree_rows(&self, search: Option<&str>) -> Vec<TreeRowDto> {
        let filtered;
        let nodes = match search {
            Some(term) if !term.trim().is_empty() => {
                filtered = filter_by_name(&self.categories, term);
                filtered.as_slice()
            }
            _ => self.categories.as_slice(),
        };
        let guard = HierarchyGuard::new(nodes);
        guard
            .build_tree(self.max_depth)
            .iter()
            .map(TreeRowDto::from)
            .collect()
    }

    pub fn parent_candidates(
        &self,
        editing: Option<&CategoryId>,
    ) -> Result<Vec<CategoryNode>, ConsoleError> {
        if let Some(id) = editing {
            self.require(id)?;
        }
        Ok(self
            .guard()
            .parent_candidates(editing)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn lint(&self) -> Vec<IntegrityIssue> {
        self.guard().lint(self.max_depth)
    }

    pub fn create(&mut self, name: &str, parent: Option<CategoryId>) -> Result<(), ConsoleError> {
        let draft = CategoryDraft::try_new(name, parent)?;
        self.check(None, &draft)?;
        self.client.create_category(&draft)?;
        tracing::info!(name = %draft.name, "category created");
        self.refresh_after_mutation();
        Ok(())
    }

    pub fn update(
        &mut self,
        id: &CategoryId,
        name: Option<&str>,
        parent: ParentChange,
    ) -> Result<(), ConsoleError> {
        let current = self.require(id)?;
        let name = name.unwrap_or(current.name.as_str());
        let parent_id = match parent {
            ParentChange::Keep => current.parent_id.clone(),
            ParentChange::Root => None,
            ParentChange::Set(parent) => Some(parent),
        };
        // An unchanged parent is not re-validated, so a category left under a
        // deleted parent can still be renamed.
        let reparenting = parent_id != current.parent_id;
        let draft = CategoryDraft::try_new(name, parent_id)?;
        if reparenting {
            self.check(Some(id), &draft)?;
        }
        self.client.update_category(id, &draft)?;
        tracing::info!(category = %id, "category updated");
        self.refresh_after_mutation();
        Ok(())
    }

    pub fn delete(&mut self, id: &CategoryId) -> Result<(), ConsoleError> {
        let children = self
            .categories
            .iter()
            .filter(|node| node.parent_id.as_ref() == Some(id))
            .count();
        self.require(id)?;
        self.client.delete_category(id)?;
        if children > 0 {
            tracing::warn!(category = %id, children, "deleted category still had children");
        }
        tracing::info!(category = %id, "category deleted");
        self.refresh_after_mutation();
        Ok(())
    }

    fn check(&self, editing: Option<&CategoryId>, draft: &CategoryDraft) -> Result<(), ConsoleError> {
        self.guard()
            .check_parent(editing, draft.parent_id.as_ref())
            .map_err(|err| {
                tracing::warn!(code = err.code(), error = %err, "parent assignment rejected");
                ConsoleError::from(err)
            })
    }
}

pub struct ProductController<T, S> {
    client: CatalogClient<T, S>,
    products: Vec<Product>,
    categories: Vec<CategoryNode>,
}

impl<T: Transport, S: TokenStore> ProductController<T, S> {
    pub fn new(client: CatalogClient<T, S>) -> Self {
        Self {
            client,
            products: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn client(&self) -> &CatalogClient<T, S> {
        &self.client
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories
    }

    /// Loads categories first so product rows can resolve their labels.
    pub fn reload(&mut self) -> Result<usize, ConsoleError> {
        self.categories = self.client.list_categories()?;
        self.products = self.client.list_products()?;
        tracing::debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            "products loaded"
        );
        Ok(self.products.len())
    }

    pub fn rows(&self, search: &str, category: Option<&CategoryId>) -> Vec<ProductRowDto> {
        filter_products(&self.products, search, category)
            .into_iter()
            .map(|product| ProductRowDto::build(product, &self.categories))
            .collect()
    }

    pub fn delete(&mut self, id: &ProductId) -> Result<(), ConsoleError> {
        if !self.products.iter().any(|product| &product.id == id) {
            return Err(ConsoleError::UnknownProduct(id.clone()));
        }
        self.client.delete_product(id)?;
        tracing::info!(product = %id, "product deleted");
        if let Err(err) = self.reload() {
            tracing::warn!(code = err.code(), error = %err, "reload after delete failed");
        }
        Ok(())
    }
}

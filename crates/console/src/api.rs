#![forbid(unsafe_code)]

use crate::error::ConsoleError;
use crate::http::{ApiRequest, Transport};
use crate::session::{AuthSession, TokenStore};
use catadmin_core::product::Product;
use catadmin_core::{CategoryDraft, CategoryId, CategoryNode, ProductId};
use serde::de::DeserializeOwned;

pub const CATEGORY_PATH: &str = "/api/v1/category";
pub const PRODUCT_PATH: &str = "/api/v1/product";

fn category_path(id: &CategoryId) -> String {
    format!("{CATEGORY_PATH}/{}", id.as_str())
}

fn product_path(id: &ProductId) -> String {
    format!("{PRODUCT_PATH}/{}", id.as_str())
}

/// Typed endpoints of the catalog backend.
pub struct CatalogClient<T, S> {
    session: AuthSession<T, S>,
}

impl<T: Transport, S: TokenStore> CatalogClient<T, S> {
    pub fn new(session: AuthSession<T, S>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &AuthSession<T, S> {
        &self.session
    }

    fn fetch_list<D: DeserializeOwned>(&self, path: &str) -> Result<Vec<D>, ConsoleError> {
        let request = ApiRequest::get(path);
        let response = self.session.send(request.clone())?.expect_success(&request)?;
        Ok(response.envelope::<Vec<D>>(path)?.unwrap_or_default())
    }

    fn execute(&self, request: ApiRequest) -> Result<(), ConsoleError> {
        self.session.send(request.clone())?.expect_success(&request)?;
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<CategoryNode>, ConsoleError> {
        self.fetch_list(CATEGORY_PATH)
    }

    pub fn create_category(&self, draft: &CategoryDraft) -> Result<(), ConsoleError> {
        self.execute(ApiRequest::post(CATEGORY_PATH, draft_body(draft)?))
    }

    pub fn update_category(
        &self,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> Result<(), ConsoleError> {
        self.execute(ApiRequest::put(category_path(id), draft_body(draft)?))
    }

    pub fn delete_category(&self, id: &CategoryId) -> Result<(), ConsoleError> {
        self.execute(ApiRequest::delete(category_path(id)))
    }

    pub fn list_products(&self) -> Result<Vec<Product>, ConsoleError> {
        self.fetch_list(PRODUCT_PATH)
    }

    pub fn delete_product(&self, id: &ProductId) -> Result<(), ConsoleError> {
        self.execute(ApiRequest::delete(product_path(id)))
    }
}

fn draft_body(draft: &CategoryDraft) -> Result<serde_json::Value, ConsoleError> {
    serde_json::to_value(draft)
        .map_err(|_| ConsoleError::InvalidInput("category draft could not be encoded"))
}

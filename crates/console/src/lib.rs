#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod controller;
pub mod dto;
pub mod error;
pub mod http;
pub mod render;
pub mod session;

pub use api::{CATEGORY_PATH, CatalogClient, PRODUCT_PATH};
pub use config::{ConfigOverrides, ConsoleConfig};
pub use controller::{CategoryController, ParentChange, ProductController};
pub use dto::{CategoryDto, IssueDto, ProductRowDto, TreeRowDto};
pub use error::{ConsoleError, TransportError};
pub use http::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
pub use session::{
    AuthSession, FileTokenStore, LOGIN_PATH, LoginOutcome, MemoryTokenStore, REFRESH_PATH,
    REGISTER_PATH, Registration, SessionTokens, TokenStore,
};

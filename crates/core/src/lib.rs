#![forbid(unsafe_code)]

pub mod category;
pub mod hierarchy;
pub mod ids;
pub mod product;

pub use category::{CategoryDraft, CategoryNode, DraftError, filter_by_name};
pub use hierarchy::{
    Ancestry, DEFAULT_MAX_DEPTH, EntryKind, HierarchyError, HierarchyGuard, IntegrityIssue,
    RenderTree, Severity, TreeEntry,
};
pub use ids::{CategoryId, IdError, ProductId};

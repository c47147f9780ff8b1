//! Menu pages: the immutable catalog and the active-page snapshot.

pub mod page;
pub mod store;

pub use page::{
    MenuError, MenuPage, PageCatalog, MAX_ITEMS, MAX_LABEL_LEN, MAX_PAGES, PLACEHOLDER_MARKER,
};
pub use store::{ActivePage, MenuStore};

pub mod bookmarks;
pub mod document;
pub mod export;
pub mod navigation;
pub mod viewport;

//! Sticker templates and the catalog that resolves labels to them.

pub mod catalog;
pub mod model;

pub use catalog::StickerCatalog;
pub use model::Sticker;

mod category;

pub use category::{Category, CategoryPatch, Metafield};

mod postgres;

pub use postgres::PgCategoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::features::categories::models::{Category, CategoryPatch};

/// Closed error taxonomy for category persistence.
///
/// Unique-index violations are reported structurally with the logical field
/// name so callers never have to sniff driver message strings.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key on {field}")]
    DuplicateKey { field: &'static str },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for crate::core::error::AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey { field } => {
                Self::Conflict(format!("Duplicate value for {}", field))
            }
            StoreError::Database(e) => Self::Database(e),
        }
    }
}

/// Key-based read/update access to persisted categories.
///
/// Every access is scoped by the `(category_id, shop_id)` composite key;
/// there is no way to read or write a category without naming its shop.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Apply `patch` to the row matching the composite key, stamping
    /// `updated_at` with server time. Returns the number of matched rows;
    /// zero means no such category exists and nothing was written.
    async fn update_one(
        &self,
        category_id: &str,
        shop_id: &str,
        patch: &CategoryPatch,
    ) -> Result<u64, StoreError>;

    async fn find_one(
        &self,
        category_id: &str,
        shop_id: &str,
    ) -> Result<Option<Category>, StoreError>;

    async fn find_all(&self, shop_id: &str) -> Result<Vec<Category>, StoreError>;
}

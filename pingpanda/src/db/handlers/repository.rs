//! The CRUD surface shared by the table repositories.

use crate::db::errors::Result;

/// Create, read, update and delete by primary key for one table.
///
/// Queries that don't fit this shape (lookup by API key, by category name, the quota upsert)
/// live as inherent methods on each repository.
#[async_trait::async_trait]
pub trait Repository {
    type CreateRequest;
    type UpdateRequest;
    type Response;
    type Id: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Returns false if no row had this id
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Apply the `Some` fields of `request`. Fails with [`DbError::NotFound`] for an unknown id.
    ///
    /// [`DbError::NotFound`]: crate::db::errors::DbError::NotFound
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}

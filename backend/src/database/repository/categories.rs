use super::RepoTx;
use crate::database::models::Category;
use crate::error::Result;
use crate::paging::{Page, PageRequest, SortField};
use chrono::Utc;

/// Sort keys accepted by category listings
pub const CATEGORY_SORT_FIELDS: &[SortField] =
    &[SortField::Id, SortField::Name, SortField::CreatedAt];

impl RepoTx {
    pub async fn insert_category(
        &mut self,
        owner_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category> {
        let now = Utc::now();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created category: {} for user: {}", category.id, owner_id);
        Ok(category)
    }

    pub async fn find_category(&mut self, id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(category)
    }

    /// Overwrite name and description. The owner column is never touched.
    pub async fn update_category(
        &mut self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = ?, description = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Updated category: {}", id);
        Ok(category)
    }

    /// Hard delete. Notes in the category keep existing with no category.
    pub async fn delete_category(&mut self, id: i64) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        tracing::debug!("Deleted category: {}", id);
        Ok(rows > 0)
    }

    pub async fn categories_by_owner(&mut self, owner_id: i64) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE user_id = ? ORDER BY id")
                .bind(owner_id)
                .fetch_all(&mut *self.tx)
                .await?;

        Ok(categories)
    }

    pub async fn category_page(
        &mut self,
        owner_id: i64,
        request: &PageRequest,
    ) -> Result<Page<Category>> {
        self.fetch_page(
            "FROM categories c WHERE c.user_id = ?",
            "c",
            owner_id,
            request,
            CATEGORY_SORT_FIELDS,
        )
        .await
    }
}

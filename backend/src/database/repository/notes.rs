use super::RepoTx;
use crate::database::models::Note;
use crate::error::Result;
use crate::paging::{Page, PageRequest, SortField};
use chrono::Utc;

/// Sort keys accepted by note listings
pub const NOTE_SORT_FIELDS: &[SortField] = &[
    SortField::Id,
    SortField::Title,
    SortField::CreatedAt,
    SortField::UpdatedAt,
];

impl RepoTx {
    pub async fn insert_note(
        &mut self,
        owner_id: i64,
        title: &str,
        content: &str,
        category_id: Option<i64>,
    ) -> Result<Note> {
        let now = Utc::now();

        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, content, category_id, user_id, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(category_id)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created note: {} for user: {}", note.id, owner_id);
        Ok(note)
    }

    pub async fn find_note(&mut self, id: i64) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(note)
    }

    /// Replace title, content and category. Owner and deletion flag stay.
    pub async fn update_note(
        &mut self,
        id: i64,
        title: &str,
        content: &str,
        category_id: Option<i64>,
    ) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes SET title = ?, content = ?, category_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(category_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Updated note: {}", id);
        Ok(note)
    }

    /// Make `tag_ids` the complete tag set of a note.
    pub async fn replace_note_tags(&mut self, note_id: i64, tag_ids: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM note_tags WHERE note_id = ?")
            .bind(note_id)
            .execute(&mut *self.tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?, ?)")
                .bind(note_id)
                .bind(tag_id)
                .execute(&mut *self.tx)
                .await?;
        }

        Ok(())
    }

    /// Soft delete: the row and its children stay in place.
    pub async fn mark_note_deleted(&mut self, id: i64) -> Result<()> {
        sqlx::query("UPDATE notes SET is_deleted = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        tracing::debug!("Soft deleted note: {}", id);
        Ok(())
    }

    /// Notes of an owner that are not soft-deleted
    pub async fn active_note_page(
        &mut self,
        owner_id: i64,
        request: &PageRequest,
    ) -> Result<Page<Note>> {
        self.fetch_page(
            "FROM notes n WHERE n.user_id = ? AND n.is_deleted = 0",
            "n",
            owner_id,
            request,
            NOTE_SORT_FIELDS,
        )
        .await
    }

    /// Every note referencing a category, soft-deleted ones included
    pub async fn note_page_by_category(
        &mut self,
        category_id: i64,
        request: &PageRequest,
    ) -> Result<Page<Note>> {
        self.fetch_page(
            "FROM notes n WHERE n.category_id = ?",
            "n",
            category_id,
            request,
            NOTE_SORT_FIELDS,
        )
        .await
    }

    /// Every note associated with a tag, soft-deleted ones included
    pub async fn note_page_by_tag(
        &mut self,
        tag_id: i64,
        request: &PageRequest,
    ) -> Result<Page<Note>> {
        self.fetch_page(
            "FROM notes n JOIN note_tags nt ON nt.note_id = n.id WHERE nt.tag_id = ?",
            "n",
            tag_id,
            request,
            NOTE_SORT_FIELDS,
        )
        .await
    }

    pub async fn count_deleted_notes(&mut self, owner_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE user_id = ? AND is_deleted = 1")
                .bind(owner_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(count)
    }

    /// Physically remove an owner's soft-deleted notes. Child rows cascade.
    pub async fn purge_deleted_notes(&mut self, owner_id: i64) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM notes WHERE user_id = ? AND is_deleted = 1")
            .bind(owner_id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        tracing::debug!("Purged {} deleted notes for user: {}", rows, owner_id);
        Ok(rows)
    }
}

use super::RepoTx;
use crate::database::models::Tag;
use crate::error::Result;
use crate::paging::{Page, PageRequest, SortField};
use chrono::Utc;
use std::collections::BTreeSet;

/// Sort keys accepted by tag listings
pub const TAG_SORT_FIELDS: &[SortField] = &[SortField::Id, SortField::Name, SortField::CreatedAt];

const IDS_PER_QUERY: usize = 500;

impl RepoTx {
    pub async fn insert_tag(&mut self, owner_id: i64, name: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, user_id, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created tag: {} for user: {}", tag.id, owner_id);
        Ok(tag)
    }

    pub async fn find_tag(&mut self, id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(tag)
    }

    pub async fn update_tag(&mut self, id: i64, name: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>("UPDATE tags SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;

        tracing::debug!("Updated tag: {}", id);
        Ok(tag)
    }

    /// Hard delete. The tag's note associations go with it.
    pub async fn delete_tag(&mut self, id: i64) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        tracing::debug!("Deleted tag: {}", id);
        Ok(rows > 0)
    }

    pub async fn tags_by_owner(&mut self, owner_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE user_id = ? ORDER BY id")
            .bind(owner_id)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(tags)
    }

    pub async fn tag_page(&mut self, owner_id: i64, request: &PageRequest) -> Result<Page<Tag>> {
        self.fetch_page(
            "FROM tags t WHERE t.user_id = ?",
            "t",
            owner_id,
            request,
            TAG_SORT_FIELDS,
        )
        .await
    }

    /// Tags with any of the given ids, regardless of owner, ordered by id.
    /// Unknown and repeated ids simply produce no extra row.
    pub async fn tags_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Tag>> {
        let ids: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut tags = Vec::new();

        // SQLite caps bound parameters per statement
        for chunk in ids.chunks(IDS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT * FROM tags WHERE id IN ({}) ORDER BY id",
                placeholders
            );

            let mut query = sqlx::query_as::<_, Tag>(&sql);
            for id in chunk {
                query = query.bind(*id);
            }

            tags.extend(query.fetch_all(&mut *self.tx).await?);
        }

        Ok(tags)
    }

    /// Live number of notes associated with a tag
    pub async fn count_notes_for_tag(&mut self, tag_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM note_tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(count)
    }

    pub async fn tags_for_note(&mut self, note_id: i64) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.* FROM tags t
            JOIN note_tags nt ON nt.tag_id = t.id
            WHERE nt.note_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(note_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(tags)
    }
}

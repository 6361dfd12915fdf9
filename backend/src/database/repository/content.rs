use super::RepoTx;
use crate::database::models::{
    Attachment, AttachmentRequest, Block, BlockType, Drawing, NoteShare, PermissionType,
};
use crate::error::Result;
use chrono::Utc;

impl RepoTx {
    pub async fn insert_block(
        &mut self,
        note_id: i64,
        content: &str,
        order_num: i64,
        block_type: BlockType,
    ) -> Result<Block> {
        let now = Utc::now();

        let block = sqlx::query_as::<_, Block>(
            r#"
            INSERT INTO blocks (note_id, content, order_num, block_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(note_id)
        .bind(content)
        .bind(order_num)
        .bind(block_type)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created block: {} for note: {}", block.id, note_id);
        Ok(block)
    }

    /// Order number that places a new block after every existing one
    pub async fn next_block_order(&mut self, note_id: i64) -> Result<i64> {
        let next: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(order_num) + 1, 0) FROM blocks WHERE note_id = ?")
                .bind(note_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(next)
    }

    pub async fn blocks_for_note(&mut self, note_id: i64) -> Result<Vec<Block>> {
        let blocks = sqlx::query_as::<_, Block>(
            "SELECT * FROM blocks WHERE note_id = ? ORDER BY order_num ASC, id ASC",
        )
        .bind(note_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(blocks)
    }

    pub async fn insert_drawing(&mut self, note_id: i64, svg_data: &str) -> Result<Drawing> {
        let drawing = sqlx::query_as::<_, Drawing>(
            r#"
            INSERT INTO drawings (note_id, svg_data, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(note_id)
        .bind(svg_data)
        .bind(Utc::now())
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created drawing: {} for note: {}", drawing.id, note_id);
        Ok(drawing)
    }

    pub async fn drawings_for_note(&mut self, note_id: i64) -> Result<Vec<Drawing>> {
        let drawings =
            sqlx::query_as::<_, Drawing>("SELECT * FROM drawings WHERE note_id = ? ORDER BY id")
                .bind(note_id)
                .fetch_all(&mut *self.tx)
                .await?;

        Ok(drawings)
    }

    pub async fn insert_attachment(
        &mut self,
        note_id: i64,
        req: &AttachmentRequest,
    ) -> Result<Attachment> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (note_id, file_name, file_path, file_type, file_size, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(note_id)
        .bind(&req.file_name)
        .bind(&req.file_path)
        .bind(&req.file_type)
        .bind(req.file_size)
        .bind(Utc::now())
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created attachment: {} for note: {}", attachment.id, note_id);
        Ok(attachment)
    }

    pub async fn attachments_for_note(&mut self, note_id: i64) -> Result<Vec<Attachment>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE note_id = ? ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(note_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(attachments)
    }

    /// Grant or replace a user's permission on a note
    pub async fn upsert_share(
        &mut self,
        note_id: i64,
        user_id: i64,
        permission: PermissionType,
        granted_by: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_note_permissions (user_id, note_id, permission_type, granted_by, granted_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, note_id) DO UPDATE SET
                permission_type = excluded.permission_type,
                granted_by = excluded.granted_by,
                granted_at = excluded.granted_at
            "#,
        )
        .bind(user_id)
        .bind(note_id)
        .bind(permission)
        .bind(granted_by)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;

        tracing::debug!("Shared note: {} with user: {} ({:?})", note_id, user_id, permission);
        Ok(())
    }

    pub async fn shares_for_note(&mut self, note_id: i64) -> Result<Vec<NoteShare>> {
        let shares = sqlx::query_as::<_, NoteShare>(
            r#"
            SELECT p.note_id, u.username, p.permission_type, g.username AS granted_by, p.granted_at
            FROM user_note_permissions p
            JOIN users u ON u.id = p.user_id
            JOIN users g ON g.id = p.granted_by
            WHERE p.note_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(note_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::models::{AttachmentRequest, BlockType, PermissionType};
    use crate::testing::{insert_user, memory_repository};

    #[tokio::test]
    async fn test_blocks_ordered_and_appended() {
        let repo = memory_repository().await;
        let alice = insert_user(&repo, "alice").await;
        let mut tx = repo.begin().await.unwrap();
        let note = tx.insert_note(alice.id, "doc", "", None).await.unwrap();

        assert_eq!(tx.next_block_order(note.id).await.unwrap(), 0);
        tx.insert_block(note.id, "second", 5, BlockType::Text)
            .await
            .unwrap();
        tx.insert_block(note.id, "first", 1, BlockType::Heading)
            .await
            .unwrap();
        assert_eq!(tx.next_block_order(note.id).await.unwrap(), 6);

        let blocks = tx.blocks_for_note(note.id).await.unwrap();
        let contents: Vec<_> = blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(blocks[0].block_type, BlockType::Heading);
    }

    #[tokio::test]
    async fn test_attachment_metadata() {
        let repo = memory_repository().await;
        let alice = insert_user(&repo, "alice").await;
        let mut tx = repo.begin().await.unwrap();
        let note = tx.insert_note(alice.id, "doc", "", None).await.unwrap();

        let req = AttachmentRequest {
            file_name: "plan.pdf".to_string(),
            file_path: "uploads/plan.pdf".to_string(),
            file_type: Some("application/pdf".to_string()),
            file_size: Some(2048),
        };
        let attachment = tx.insert_attachment(note.id, &req).await.unwrap();
        assert_eq!(attachment.file_size, Some(2048));

        let listed = tx.attachments_for_note(note.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name, "plan.pdf");
    }

    #[tokio::test]
    async fn test_upsert_share_replaces_permission() {
        let repo = memory_repository().await;
        let alice = insert_user(&repo, "alice").await;
        let bob = insert_user(&repo, "bob").await;
        let mut tx = repo.begin().await.unwrap();
        let note = tx.insert_note(alice.id, "doc", "", None).await.unwrap();

        tx.upsert_share(note.id, bob.id, PermissionType::Read, alice.id)
            .await
            .unwrap();
        tx.upsert_share(note.id, bob.id, PermissionType::Edit, alice.id)
            .await
            .unwrap();

        let shares = tx.shares_for_note(note.id).await.unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].username, "bob");
        assert_eq!(shares[0].granted_by, "alice");
        assert_eq!(shares[0].permission_type, PermissionType::Edit);
    }
}

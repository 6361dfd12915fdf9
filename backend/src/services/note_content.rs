//! Note content service
//!
//! Blocks, drawings and attachment metadata hanging off a note. Access
//! follows the parent note: only its owner may add or list children.
//! Trashed notes stay editable by their owner.

use crate::access::{current_user, require_owned};
use crate::auth::AuthContext;
use crate::config::{ATTACHMENT_NAME_MAX, ATTACHMENT_PATH_MAX, ATTACHMENT_TYPE_MAX};
use crate::database::{
    Attachment, AttachmentRequest, Block, BlockRequest, Drawing, RepoTx, Repository, User,
};
use crate::error::{AppError, Result};
use crate::validation;

#[derive(Clone)]
pub struct NoteContentService {
    repo: Repository,
}

impl NoteContentService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Add a content block. Without an explicit position it goes last.
    pub async fn add_block(
        &self,
        ctx: &AuthContext,
        note_id: i64,
        req: BlockRequest,
    ) -> Result<Block> {
        let mut tx = self.repo.begin().await?;
        owned_note(&mut tx, ctx, note_id).await?;

        let order_num = match req.order_num {
            Some(n) => n,
            None => tx.next_block_order(note_id).await?,
        };

        let block = tx
            .insert_block(note_id, &req.content, order_num, req.block_type)
            .await?;
        tx.commit().await?;

        Ok(block)
    }

    /// Blocks of a note in display order
    pub async fn list_blocks(&self, ctx: &AuthContext, note_id: i64) -> Result<Vec<Block>> {
        let mut tx = self.repo.begin().await?;
        owned_note(&mut tx, ctx, note_id).await?;
        let blocks = tx.blocks_for_note(note_id).await?;
        tx.commit().await?;

        Ok(blocks)
    }

    /// Store a drawing. The SVG markup is kept as-is.
    pub async fn add_drawing(
        &self,
        ctx: &AuthContext,
        note_id: i64,
        svg_data: &str,
    ) -> Result<Drawing> {
        if svg_data.trim().is_empty() {
            return Err(AppError::Validation("Drawing must not be empty".to_string()));
        }

        let mut tx = self.repo.begin().await?;
        owned_note(&mut tx, ctx, note_id).await?;
        let drawing = tx.insert_drawing(note_id, svg_data).await?;
        tx.commit().await?;

        Ok(drawing)
    }

    pub async fn list_drawings(&self, ctx: &AuthContext, note_id: i64) -> Result<Vec<Drawing>> {
        let mut tx = self.repo.begin().await?;
        owned_note(&mut tx, ctx, note_id).await?;
        let drawings = tx.drawings_for_note(note_id).await?;
        tx.commit().await?;

        Ok(drawings)
    }

    /// Record attachment metadata; the file itself lives elsewhere.
    pub async fn add_attachment(
        &self,
        ctx: &AuthContext,
        note_id: i64,
        req: AttachmentRequest,
    ) -> Result<Attachment> {
        let req = AttachmentRequest {
            file_name: sanitize_filename(&req.file_name),
            ..req
        };
        validate_attachment(&req)?;

        let mut tx = self.repo.begin().await?;
        let user = owned_note(&mut tx, ctx, note_id).await?;

        tracing::info!(
            "Adding attachment {} to note {} for {}",
            req.file_name,
            note_id,
            user.username
        );

        let attachment = tx.insert_attachment(note_id, &req).await?;
        tx.commit().await?;

        Ok(attachment)
    }

    /// Attachments of a note, newest first
    pub async fn list_attachments(
        &self,
        ctx: &AuthContext,
        note_id: i64,
    ) -> Result<Vec<Attachment>> {
        let mut tx = self.repo.begin().await?;
        owned_note(&mut tx, ctx, note_id).await?;
        let attachments = tx.attachments_for_note(note_id).await?;
        tx.commit().await?;

        Ok(attachments)
    }
}

async fn owned_note(tx: &mut RepoTx, ctx: &AuthContext, note_id: i64) -> Result<User> {
    let user = current_user(tx, ctx).await?;
    require_owned(tx.find_note(note_id).await?, note_id, &user)?;
    Ok(user)
}

fn validate_attachment(req: &AttachmentRequest) -> Result<()> {
    validation::required("File name", &req.file_name, ATTACHMENT_NAME_MAX)?;
    validation::required("File path", &req.file_path, ATTACHMENT_PATH_MAX)?;
    if let Some(file_type) = &req.file_type {
        validation::at_most("File type", file_type, ATTACHMENT_TYPE_MAX)?;
    }
    if req.file_size.is_some_and(|size| size < 0) {
        return Err(AppError::Validation(
            "File size must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Strip path separators and NUL bytes from a client-supplied file name.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && *c != '\0')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::BlockType;
    use crate::error::ResourceKind;
    use crate::testing::{memory_repository, signed_in};

    async fn setup() -> (NoteContentService, Repository, AuthContext, i64) {
        let repo = memory_repository().await;
        let (alice, ctx) = signed_in(&repo, "alice").await;

        let mut tx = repo.begin().await.unwrap();
        let note = tx.insert_note(alice.id, "Doc", "", None).await.unwrap();
        tx.commit().await.unwrap();

        (NoteContentService::new(repo.clone()), repo, ctx, note.id)
    }

    fn block(content: &str, order_num: Option<i64>) -> BlockRequest {
        BlockRequest {
            content: content.to_string(),
            order_num,
            block_type: BlockType::Text,
        }
    }

    fn attachment(name: &str) -> AttachmentRequest {
        AttachmentRequest {
            file_name: name.to_string(),
            file_path: format!("uploads/{}", name),
            file_type: Some("text/plain".to_string()),
            file_size: Some(12),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("normal.txt"), "normal.txt");
        assert_eq!(sanitize_filename("../../../etc/passwd"), "..etcpasswd");
        assert_eq!(sanitize_filename("file\\name.txt"), "filename.txt");
    }

    #[tokio::test]
    async fn test_blocks_in_order() {
        let (service, _repo, ctx, note_id) = setup().await;

        service
            .add_block(&ctx, note_id, block("second", Some(5)))
            .await
            .unwrap();
        service
            .add_block(&ctx, note_id, block("first", Some(1)))
            .await
            .unwrap();
        let appended = service
            .add_block(&ctx, note_id, block("third", None))
            .await
            .unwrap();
        assert_eq!(appended.order_num, 6);

        let blocks = service.list_blocks(&ctx, note_id).await.unwrap();
        let contents: Vec<_> = blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_drawings() {
        let (service, _repo, ctx, note_id) = setup().await;

        let err = service.add_drawing(&ctx, note_id, " ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        service
            .add_drawing(&ctx, note_id, "<svg></svg>")
            .await
            .unwrap();
        let drawings = service.list_drawings(&ctx, note_id).await.unwrap();
        assert_eq!(drawings.len(), 1);
        assert_eq!(drawings[0].svg_data, "<svg></svg>");
    }

    #[tokio::test]
    async fn test_attachments() {
        let (service, _repo, ctx, note_id) = setup().await;

        let stored = service
            .add_attachment(&ctx, note_id, attachment("../report.txt"))
            .await
            .unwrap();
        assert_eq!(stored.file_name, "..report.txt");

        let err = service
            .add_attachment(
                &ctx,
                note_id,
                AttachmentRequest {
                    file_type: Some("x".repeat(51)),
                    ..attachment("big.bin")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let listed = service.list_attachments(&ctx, note_id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_children_follow_note_ownership() {
        let (service, repo, _ctx, note_id) = setup().await;
        let (_, bob) = signed_in(&repo, "bob").await;

        let err = service
            .add_block(&bob, note_id, block("intrusion", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ResourceKind::Note)));

        let err = service.list_attachments(&bob, note_id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = service.list_drawings(&bob, 9999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}

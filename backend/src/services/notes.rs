//! Notes service
//!
//! High-level business logic for notes operations.
//! Handles ownership checks on the note and on every category and tag a
//! note links to, soft deletion, trash management and sharing grants.

use crate::access::{current_user, require_owned};
use crate::auth::AuthContext;
use crate::database::{
    Category, Note, NoteRequest, NoteShare, RepoTx, Repository, ShareRequest, Tag, User,
};
use crate::error::{AppError, ResourceKind, Result};
use crate::paging::{Page, PageRequest};
use crate::responses::NoteResponse;
use crate::validation;

/// Service for managing notes
#[derive(Clone)]
pub struct NoteService {
    repo: Repository,
}

impl NoteService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a note owned by the caller.
    ///
    /// The category and every tag must exist and belong to the caller.
    pub async fn create_note(&self, ctx: &AuthContext, req: NoteRequest) -> Result<NoteResponse> {
        validation::note_title(&req.title)?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;

        tracing::info!("Creating new note: {}", req.title);

        let links = resolve_links(&mut tx, &user, &req).await?;
        let tags = links.tags.unwrap_or_default();

        let note = tx
            .insert_note(user.id, &req.title, &req.content, req.category_id)
            .await?;
        tx.replace_note_tags(note.id, &tag_ids(&tags)).await?;
        tx.commit().await?;

        tracing::info!("Note created successfully: {}", note.id);

        Ok(NoteResponse::assemble(
            note,
            links.category.as_ref(),
            &tags,
            &user.username,
        ))
    }

    /// Replace title and content of an owned note.
    ///
    /// A supplied category or non-empty tag set replaces the stored one;
    /// links left out of the request stay as they are.
    pub async fn update_note(
        &self,
        ctx: &AuthContext,
        id: i64,
        req: NoteRequest,
    ) -> Result<NoteResponse> {
        validation::note_title(&req.title)?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let current = require_owned(tx.find_note(id).await?, id, &user)?;

        tracing::debug!("Updating note: {}", id);

        let links = resolve_links(&mut tx, &user, &req).await?;
        let category_id = req.category_id.or(current.category_id);

        let note = tx
            .update_note(id, &req.title, &req.content, category_id)
            .await?;
        if let Some(tags) = &links.tags {
            tx.replace_note_tags(id, &tag_ids(tags)).await?;
        }
        let response = assemble(&mut tx, note, &user.username).await?;
        tx.commit().await?;

        tracing::debug!("Note updated successfully: {}", id);

        Ok(response)
    }

    /// Delete a note (soft delete)
    pub async fn delete_note(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_note(id).await?, id, &user)?;

        tracing::info!("Deleting note: {}", id);

        tx.mark_note_deleted(id).await?;
        tx.commit().await?;

        tracing::info!("Note deleted successfully: {}", id);

        Ok(())
    }

    /// Get an owned note by ID, including one in the trash
    pub async fn get_note(&self, ctx: &AuthContext, id: i64) -> Result<NoteResponse> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let note = require_owned(tx.find_note(id).await?, id, &user)?;
        let response = assemble(&mut tx, note, &user.username).await?;
        tx.commit().await?;

        Ok(response)
    }

    /// The caller's notes that are not in the trash
    pub async fn list_my_notes(
        &self,
        ctx: &AuthContext,
        request: &PageRequest,
    ) -> Result<Page<NoteResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let page = tx.active_note_page(user.id, request).await?;
        let page = assemble_page(&mut tx, page, &user.username).await?;
        tx.commit().await?;

        Ok(page)
    }

    /// Notes filed under an owned category, trashed ones included
    pub async fn list_notes_by_category(
        &self,
        ctx: &AuthContext,
        category_id: i64,
        request: &PageRequest,
    ) -> Result<Page<NoteResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_category(category_id).await?, category_id, &user)?;

        let page = tx.note_page_by_category(category_id, request).await?;
        let page = assemble_page(&mut tx, page, &user.username).await?;
        tx.commit().await?;

        Ok(page)
    }

    /// Notes carrying an owned tag, trashed ones included
    pub async fn list_notes_by_tag(
        &self,
        ctx: &AuthContext,
        tag_id: i64,
        request: &PageRequest,
    ) -> Result<Page<NoteResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_tag(tag_id).await?, tag_id, &user)?;

        let page = tx.note_page_by_tag(tag_id, request).await?;
        let page = assemble_page(&mut tx, page, &user.username).await?;
        tx.commit().await?;

        Ok(page)
    }

    /// Number of the caller's notes in the trash
    pub async fn count_deleted(&self, ctx: &AuthContext) -> Result<i64> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let count = tx.count_deleted_notes(user.id).await?;
        tx.commit().await?;

        Ok(count)
    }

    /// Permanently remove the caller's trashed notes with their
    /// attachments, blocks, drawings and tag links.
    pub async fn purge_deleted(&self, ctx: &AuthContext) -> Result<u64> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let purged = tx.purge_deleted_notes(user.id).await?;
        tx.commit().await?;

        tracing::info!("Purged {} deleted notes for {}", purged, user.username);

        Ok(purged)
    }

    /// Grant (or change) another user's permission on an owned note.
    ///
    /// Returns the note's grants after the change.
    pub async fn share_note(
        &self,
        ctx: &AuthContext,
        note_id: i64,
        req: ShareRequest,
    ) -> Result<Vec<NoteShare>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_note(note_id).await?, note_id, &user)?;

        let grantee = tx
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::User, &req.username))?;

        if grantee.id == user.id {
            return Err(AppError::Validation(
                "Cannot share a note with yourself".to_string(),
            ));
        }

        tx.upsert_share(note_id, grantee.id, req.permission_type, user.id)
            .await?;
        let shares = tx.shares_for_note(note_id).await?;
        tx.commit().await?;

        tracing::info!(
            "Note {} shared with {} ({:?})",
            note_id,
            grantee.username,
            req.permission_type
        );

        Ok(shares)
    }

    pub async fn list_shares(&self, ctx: &AuthContext, note_id: i64) -> Result<Vec<NoteShare>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_note(note_id).await?, note_id, &user)?;

        let shares = tx.shares_for_note(note_id).await?;
        tx.commit().await?;

        Ok(shares)
    }
}

/// Links named by a note request, each already guarded.
/// `None` marks a link the request left out.
struct Links {
    category: Option<Category>,
    tags: Option<Vec<Tag>>,
}

/// Load and guard the category and tags a note request points at.
async fn resolve_links(tx: &mut RepoTx, user: &User, req: &NoteRequest) -> Result<Links> {
    let category = match req.category_id {
        Some(id) => Some(require_owned(tx.find_category(id).await?, id, user)?),
        None => None,
    };

    let tags = match req.tag_ids.as_ref().filter(|ids| !ids.is_empty()) {
        Some(ids) => {
            let mut tags = Vec::with_capacity(ids.len());
            for &id in ids {
                tags.push(require_owned(tx.find_tag(id).await?, id, user)?);
            }
            Some(tags)
        }
        None => None,
    };

    Ok(Links { category, tags })
}

fn tag_ids(tags: &[Tag]) -> Vec<i64> {
    tags.iter().map(|t| t.id).collect()
}

async fn assemble(tx: &mut RepoTx, note: Note, owner: &str) -> Result<NoteResponse> {
    let category = match note.category_id {
        Some(id) => tx.find_category(id).await?,
        None => None,
    };
    let tags = tx.tags_for_note(note.id).await?;

    Ok(NoteResponse::assemble(note, category.as_ref(), &tags, owner))
}

async fn assemble_page(
    tx: &mut RepoTx,
    mut page: Page<Note>,
    owner: &str,
) -> Result<Page<NoteResponse>> {
    let notes = std::mem::take(&mut page.items);
    let mut items = Vec::with_capacity(notes.len());
    for note in notes {
        items.push(assemble(tx, note, owner).await?);
    }
    Ok(page.with_items(items))
}

//! Tag service
//!
//! Owner-scoped CRUD for tags. Responses carry the live number of notes
//! using each tag.

use crate::access::{current_user, require_owned};
use crate::auth::AuthContext;
use crate::database::{RepoTx, Repository, Tag, TagRequest};
use crate::error::{AppError, ResourceKind, Result};
use crate::paging::{Page, PageRequest};
use crate::responses::TagResponse;
use crate::validation;

#[derive(Clone)]
pub struct TagService {
    repo: Repository,
}

impl TagService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create_tag(&self, ctx: &AuthContext, req: TagRequest) -> Result<TagResponse> {
        validation::tag(&req.name)?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;

        tracing::info!("Creating tag '{}' for {}", req.name, user.username);

        let tag = tx.insert_tag(user.id, &req.name).await?;
        tx.commit().await?;

        Ok(TagResponse::assemble(tag, 0))
    }

    pub async fn update_tag(
        &self,
        ctx: &AuthContext,
        id: i64,
        req: TagRequest,
    ) -> Result<TagResponse> {
        validation::tag(&req.name)?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_tag(id).await?, id, &user)?;

        let tag = tx.update_tag(id, &req.name).await?;
        let response = with_count(&mut tx, tag).await?;
        tx.commit().await?;

        tracing::debug!("Tag updated: {}", id);

        Ok(response)
    }

    /// Hard delete. The tag disappears from every note carrying it.
    pub async fn delete_tag(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_tag(id).await?, id, &user)?;

        if !tx.delete_tag(id).await? {
            return Err(AppError::not_found(ResourceKind::Tag, id));
        }
        tx.commit().await?;

        tracing::info!("Tag deleted: {}", id);

        Ok(())
    }

    pub async fn get_tag(&self, ctx: &AuthContext, id: i64) -> Result<TagResponse> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let tag = require_owned(tx.find_tag(id).await?, id, &user)?;
        let response = with_count(&mut tx, tag).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn list_tags(&self, ctx: &AuthContext) -> Result<Vec<TagResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let tags = tx.tags_by_owner(user.id).await?;
        let responses = with_counts(&mut tx, tags).await?;
        tx.commit().await?;

        Ok(responses)
    }

    /// Owned tags only, as a page
    pub async fn list_tag_page(
        &self,
        ctx: &AuthContext,
        request: &PageRequest,
    ) -> Result<Page<TagResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let mut page = tx.tag_page(user.id, request).await?;
        let tags = std::mem::take(&mut page.items);
        let responses = with_counts(&mut tx, tags).await?;
        tx.commit().await?;

        Ok(page.with_items(responses))
    }

    /// The caller's tags among `ids`. Missing and foreign ids are dropped
    /// without error.
    pub async fn get_tags_by_ids(
        &self,
        ctx: &AuthContext,
        ids: &[i64],
    ) -> Result<Vec<TagResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;

        let owned: Vec<Tag> = tx
            .tags_by_ids(ids)
            .await?
            .into_iter()
            .filter(|tag| tag.user_id == user.id)
            .collect();

        if owned.len() < ids.len() {
            tracing::debug!(
                "Dropped {} of {} requested tag ids for {}",
                ids.len() - owned.len(),
                ids.len(),
                user.username
            );
        }

        let responses = with_counts(&mut tx, owned).await?;
        tx.commit().await?;

        Ok(responses)
    }
}

async fn with_count(tx: &mut RepoTx, tag: Tag) -> Result<TagResponse> {
    let count = tx.count_notes_for_tag(tag.id).await?;
    Ok(TagResponse::assemble(tag, count))
}

async fn with_counts(tx: &mut RepoTx, tags: Vec<Tag>) -> Result<Vec<TagResponse>> {
    let mut responses = Vec::with_capacity(tags.len());
    for tag in tags {
        responses.push(with_count(tx, tag).await?);
    }
    Ok(responses)
}

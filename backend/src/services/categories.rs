//! Category service
//!
//! Owner-scoped CRUD for categories. Every operation on an existing
//! category fetches it by id and then runs the ownership guard.

use crate::access::{current_user, require_owned};
use crate::auth::AuthContext;
use crate::database::{CategoryRequest, Repository};
use crate::error::{AppError, ResourceKind, Result};
use crate::paging::{Page, PageRequest};
use crate::responses::CategoryResponse;
use crate::validation;

#[derive(Clone)]
pub struct CategoryService {
    repo: Repository,
}

impl CategoryService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a category owned by the caller
    pub async fn create_category(
        &self,
        ctx: &AuthContext,
        req: CategoryRequest,
    ) -> Result<CategoryResponse> {
        validation::category(&req.name, req.description.as_deref())?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;

        tracing::info!("Creating category '{}' for {}", req.name, user.username);

        let category = tx
            .insert_category(user.id, &req.name, req.description.as_deref())
            .await?;
        tx.commit().await?;

        Ok(CategoryResponse::assemble(category, &user.username))
    }

    /// Replace name and description of an owned category
    pub async fn update_category(
        &self,
        ctx: &AuthContext,
        id: i64,
        req: CategoryRequest,
    ) -> Result<CategoryResponse> {
        validation::category(&req.name, req.description.as_deref())?;

        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_category(id).await?, id, &user)?;

        let category = tx
            .update_category(id, &req.name, req.description.as_deref())
            .await?;
        tx.commit().await?;

        tracing::debug!("Category updated: {}", id);

        Ok(CategoryResponse::assemble(category, &user.username))
    }

    /// Hard delete. Notes filed under the category lose their category.
    pub async fn delete_category(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        require_owned(tx.find_category(id).await?, id, &user)?;

        if !tx.delete_category(id).await? {
            return Err(AppError::not_found(ResourceKind::Category, id));
        }
        tx.commit().await?;

        tracing::info!("Category deleted: {}", id);

        Ok(())
    }

    pub async fn get_category(&self, ctx: &AuthContext, id: i64) -> Result<CategoryResponse> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let category = require_owned(tx.find_category(id).await?, id, &user)?;
        tx.commit().await?;

        Ok(CategoryResponse::assemble(category, &user.username))
    }

    /// All categories of the caller in id order
    pub async fn list_categories(&self, ctx: &AuthContext) -> Result<Vec<CategoryResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let categories = tx.categories_by_owner(user.id).await?;
        tx.commit().await?;

        Ok(categories
            .into_iter()
            .map(|c| CategoryResponse::assemble(c, &user.username))
            .collect())
    }

    pub async fn list_category_page(
        &self,
        ctx: &AuthContext,
        request: &PageRequest,
    ) -> Result<Page<CategoryResponse>> {
        let mut tx = self.repo.begin().await?;
        let user = current_user(&mut tx, ctx).await?;
        let page = tx.category_page(user.id, request).await?;
        tx.commit().await?;

        Ok(page.map(|c| CategoryResponse::assemble(c, &user.username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{Sort, SortField};
    use crate::testing::{memory_repository, signed_in};

    fn request(name: &str, description: Option<&str>) -> CategoryRequest {
        CategoryRequest {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    async fn create_test_service() -> (CategoryService, Repository) {
        let repo = memory_repository().await;
        (CategoryService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let (service, repo) = create_test_service().await;
        let (alice, ctx) = signed_in(&repo, "alice").await;

        let created = service
            .create_category(&ctx, request("Work", Some("")))
            .await
            .unwrap();

        let fetched = service.get_category(&ctx, created.id).await.unwrap();
        assert_eq!(fetched.name, "Work");
        assert_eq!(fetched.description.as_deref(), Some(""));
        assert_eq!(fetched.created_by, alice.username);
    }

    #[tokio::test]
    async fn test_anonymous_rejected() {
        let (service, _repo) = create_test_service().await;

        let err = service
            .create_category(&AuthContext::anonymous(), request("Work", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_validation() {
        let (service, repo) = create_test_service().await;
        let (_, ctx) = signed_in(&repo, "alice").await;

        let err = service
            .create_category(&ctx, request("  ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let long = "d".repeat(256);
        let err = service
            .create_category(&ctx, request("Work", Some(&long)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_other_user_denied() {
        let (service, repo) = create_test_service().await;
        let (_, alice) = signed_in(&repo, "alice").await;
        let (_, bob) = signed_in(&repo, "bob").await;

        let created = service
            .create_category(&alice, request("Work", None))
            .await
            .unwrap();

        let err = service.get_category(&bob, created.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ResourceKind::Category)));

        let err = service
            .update_category(&bob, created.id, request("Mine", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = service.delete_category(&bob, created.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let still_there = service.get_category(&alice, created.id).await.unwrap();
        assert_eq!(still_there.name, "Work");
    }

    #[tokio::test]
    async fn test_update_replaces_both_fields() {
        let (service, repo) = create_test_service().await;
        let (_, ctx) = signed_in(&repo, "alice").await;

        let created = service
            .create_category(&ctx, request("Work", Some("day job")))
            .await
            .unwrap();

        let updated = service
            .update_category(&ctx, created.id, request("Office", None))
            .await
            .unwrap();
        assert_eq!(updated.name, "Office");
        assert!(updated.description.is_none());
        assert_eq!(updated.created_by, "alice");
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (service, repo) = create_test_service().await;
        let (_, ctx) = signed_in(&repo, "alice").await;

        let created = service
            .create_category(&ctx, request("Work", None))
            .await
            .unwrap();

        service.delete_category(&ctx, created.id).await.unwrap();

        let err = service.delete_category(&ctx, created.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound {
                kind: ResourceKind::Category,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_listing_is_owner_scoped() {
        let (service, repo) = create_test_service().await;
        let (_, alice) = signed_in(&repo, "alice").await;
        let (_, bob) = signed_in(&repo, "bob").await;

        for name in ["Work", "Home", "Travel"] {
            service
                .create_category(&alice, request(name, None))
                .await
                .unwrap();
        }
        service
            .create_category(&bob, request("Bob's", None))
            .await
            .unwrap();

        let all = service.list_categories(&alice).await.unwrap();
        assert_eq!(all.len(), 3);

        let page = service
            .list_category_page(
                &alice,
                &PageRequest::new(0, 2).sorted_by(Sort::asc(SortField::Name)),
            )
            .await
            .unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Travel"]);
    }

    #[tokio::test]
    async fn test_page_rejects_unknown_sort_key() {
        let (service, repo) = create_test_service().await;
        let (_, ctx) = signed_in(&repo, "alice").await;

        let request = PageRequest::default().sorted_by(Sort::asc(SortField::Title));
        let err = service
            .list_category_page(&ctx, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

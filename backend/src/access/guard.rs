//! Ownership checks
//!
//! Resources are always fetched by id first and then checked here, so a
//! missing resource (`NotFound`) and someone else's resource
//! (`PermissionDenied`) stay distinguishable.

use crate::database::{Category, Note, Tag, User};
use crate::error::{AppError, ResourceKind, Result};

/// A resource with a single owning user
pub trait Owned {
    const KIND: ResourceKind;

    fn owner_id(&self) -> i64;
}

impl Owned for Category {
    const KIND: ResourceKind = ResourceKind::Category;

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Tag {
    const KIND: ResourceKind = ResourceKind::Tag;

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Note {
    const KIND: ResourceKind = ResourceKind::Note;

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Deny unless `user` owns `resource`.
pub fn assert_owned<R: Owned>(resource: &R, user: &User) -> Result<()> {
    if resource.owner_id() == user.id {
        Ok(())
    } else {
        tracing::warn!(
            "User {} denied access to {} owned by user {}",
            user.username,
            R::KIND,
            resource.owner_id()
        );
        Err(AppError::PermissionDenied(R::KIND))
    }
}

/// Lookup-then-guard: `NotFound` for `None`, then the ownership check.
pub fn require_owned<R: Owned>(found: Option<R>, id: i64, user: &User) -> Result<R> {
    let resource = found.ok_or_else(|| AppError::not_found(R::KIND, id))?;
    assert_owned(&resource, user)?;
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{UserRole, UserStatus};
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            password_hash: String::new(),
            role: UserRole::User,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        }
    }

    fn tag(id: i64, owner: i64) -> Tag {
        Tag {
            id,
            name: "t".to_string(),
            user_id: owner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_allowed() {
        assert!(assert_owned(&tag(1, 7), &user(7)).is_ok());
    }

    #[test]
    fn test_other_user_denied() {
        let err = assert_owned(&tag(1, 7), &user(8)).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ResourceKind::Tag)));
    }

    #[test]
    fn test_require_owned_distinguishes_missing() {
        let err = require_owned::<Tag>(None, 3, &user(7)).unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound { kind: ResourceKind::Tag, ref id } if id == "3"
        ));

        let err = require_owned(Some(tag(3, 1)), 3, &user(7)).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let found = require_owned(Some(tag(3, 7)), 3, &user(7)).unwrap();
        assert_eq!(found.id, 3);
    }
}

//! Client-facing response shapes
//!
//! Assemblers are pure: services load everything a response needs
//! (owner usernames, tag counts, note category and tags) and hand it in.

use crate::database::{Category, Note, Tag, User, UserRole, UserStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl CategoryResponse {
    pub fn assemble(category: Category, owner: &str) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
            created_by: owner.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Number of notes carrying the tag when it was read
    pub note_count: i64,
}

impl TagResponse {
    pub fn assemble(tag: Tag, note_count: i64) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            created_at: tag.created_at,
            note_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// Ordered by id, then name
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
}

impl From<&Tag> for TagSummary {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Option<CategorySummary>,
    pub tags: BTreeSet<TagSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl NoteResponse {
    pub fn assemble(note: Note, category: Option<&Category>, tags: &[Tag], owner: &str) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            category: category.map(CategorySummary::from),
            tags: tags.iter().map(TagSummary::from).collect(),
            created_at: note.created_at,
            updated_at: note.updated_at,
            created_by: owner.to_string(),
        }
    }

    /// Tag names in id order
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
}

impl AuthResponse {
    pub fn new(token: String, expires_at: DateTime<Utc>, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer",
            expires_at,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        Note {
            id: 9,
            title: "Plan".to_string(),
            content: String::new(),
            category_id: Some(2),
            user_id: 1,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn tag(id: i64, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            user_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_note_response_collects_summaries() {
        let category = Category {
            id: 2,
            name: "Work".to_string(),
            description: None,
            user_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let tags = vec![tag(5, "urgent"), tag(3, "home"), tag(5, "urgent")];

        let response = NoteResponse::assemble(note(), Some(&category), &tags, "alice");

        assert_eq!(
            response.category,
            Some(CategorySummary {
                id: 2,
                name: "Work".to_string()
            })
        );
        assert_eq!(response.tags.len(), 2);
        assert_eq!(response.tag_names(), vec!["home", "urgent"]);
        assert_eq!(response.created_by, "alice");
    }

    #[test]
    fn test_note_response_json_shape() {
        let response = NoteResponse::assemble(note(), None, &[], "alice");
        let json = serde_json::to_value(&response).unwrap();

        assert!(json["category"].is_null());
        assert_eq!(json["createdBy"], "alice");
        assert!(json["tags"].as_array().unwrap().is_empty());
        assert!(json.get("created_by").is_none());
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: UserRole::User,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        };

        let json = serde_json::to_string(&UserProfile::from(user)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"USER\""));
    }
}

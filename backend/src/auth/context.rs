//! Request-scoped authentication context
//!
//! The transport layer builds one [`AuthContext`] per request (normally
//! through `AuthService::authenticate`) and passes it into every service
//! call. Nothing in the crate reads identity from ambient state.

/// Who is acting on this request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    username: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { username: None }
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// Principal name, if the request carried a valid token
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

//! Revoked-token store
//!
//! Tokens invalidated by logout stay listed until their natural expiry.
//! Entries are keyed by the SHA-256 digest of the token and evicted
//! lazily when a lookup finds them expired; there is no sweeper.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, thread-safe blacklist. Clones share the same entries.
#[derive(Clone, Default)]
pub struct TokenBlacklist {
    entries: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `token` until `expires_at`.
    pub fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        self.lock().insert(digest(token), expires_at);
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.is_revoked_at(token, Utc::now())
    }

    fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let key = digest(token);
        let mut entries = self.lock();

        let Some(&expires_at) = entries.get(&key) else {
            return false;
        };

        if now > expires_at {
            entries.remove(&key);
            return false;
        }

        true
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

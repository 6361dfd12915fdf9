//! Access control
//!
//! Identity resolution and the ownership guard applied before every
//! read, update or delete of a category, tag or note.

pub mod guard;
pub mod identity;

pub use guard::{assert_owned, require_owned, Owned};
pub use identity::current_user;

//! Services module
//!
//! Business logic services that sit between the transport and the
//! repository. Each call resolves the acting user, checks ownership and
//! runs in its own transaction.

pub mod auth;
pub mod categories;
pub mod note_content;
pub mod notes;
pub mod tags;

pub use auth::AuthService;
pub use categories::CategoryService;
pub use note_content::NoteContentService;
pub use notes::NoteService;
pub use tags::TagService;

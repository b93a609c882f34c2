//! Bookmarks Module
//!
//! Saved URLs with a title, an optional description and an optional 1-5
//! rating, stored in a single `bookmarks` table.
//!
//! # Layout
//!
//! - `model`: the stored record and the typed insert/update payloads
//! - `repository`: the [`BookmarkRepository`] trait and its libsql implementation
//! - `memory`: a process-local implementation of the same trait
//! - `validate`: request checks and HTML sanitization
//! - `handler` / `routes`: the HTTP surface mounted under `/bookmarks`
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks::bookmarks;
//!
//! let repo = Arc::new(bookmarks::LibsqlBookmarks::new(db));
//! let app = Router::new()
//!     .nest("/bookmarks", bookmarks::routes())
//!     .with_state(AppState::new(repo, settings));
//! ```

mod handler;
mod memory;
mod model;
mod repository;
mod routes;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

pub use memory::InMemoryBookmarks;
pub use model::*;
pub use repository::{BookmarkRepository, LibsqlBookmarks};
pub use routes::routes;

/// Schema migrations for the `bookmarks` table, applied at startup.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("bookmarks_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}

//! Shopping List Module
//!
//! A self-contained module for the single shopping-list entity: validated
//! construction, persistence, and the `/api` HTTP surface.
//!
//! # Features
//!
//! - Validated `ShoppingListItem` entries with server-generated ids
//! - A `ShoppingList` store with insert and list-all operations
//! - Ready-to-use HTTP handler and routes
//! - Database migrations included
//!
//! # Usage
//!
//! ```rust,ignore
//! use handleliste::list;
//!
//! // Get the migrations to run
//! for (name, sql) in list::migrations() {
//!     // Run migration...
//! }
//!
//! // Mount the routes
//! let app = Router::new()
//!     .merge(list::routes())
//!     .with_state(app_state);
//!
//! // Use the store directly
//! let store = list::ShoppingList::new(connection);
//! let entries = store.list_all().await?;
//! ```

mod handler;
mod lib;
mod routes;

// Re-export the core entity and store types
pub use lib::*;

// Re-export the routes function
pub use routes::routes;

// ============================================================================
// Migrations
// ============================================================================

/// Returns the migrations for the shopping list module.
///
/// These should be run during application startup to ensure the database
/// schema is up to date.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "list_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}

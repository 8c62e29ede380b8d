//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod alerts;
pub mod budgets;
pub mod chat;
pub mod import;
pub mod sessions;
pub mod status;
pub mod summary;

// Re-export all handlers for use in router
pub use alerts::*;
pub use budgets::*;
pub use chat::*;
pub use import::*;
pub use sessions::*;
pub use status::*;
pub use summary::*;

//! Data models
//!
//! Shared between the front-desk engine and the HTTP client. Field names
//! follow the collaborator's JSON (camelCase, Spanish where the API uses
//! Spanish) through serde renames.

pub mod attendance;
pub mod member;
pub mod payment;

// Re-exports
pub use attendance::*;
pub use member::*;
pub use payment::*;

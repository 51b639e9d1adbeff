//! Data models for the railway concession admin workflow.
//!
//! Wire shapes match the original Firestore document layouts (camelCase fields).

mod concession;
mod history;
mod notification;
mod schema;
mod stats;

pub use concession::*;
pub use history::*;
pub use notification::*;
pub use schema::*;
pub use stats::*;

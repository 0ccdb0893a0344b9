//! dueping-notion: task source backed by a Notion database query.

pub mod client;
pub mod types;

pub use client::{NotionClient, NotionConfig};
pub use types::{Page, QueryResponse};

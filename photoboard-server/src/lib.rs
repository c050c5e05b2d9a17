//! # Photoboard Server
//!
//! A small photo log: upload a photo with a comment, see every upload on one
//! page, delete what you no longer want.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - a JSON snapshot file for photo metadata ([`photoboard_core::MetadataStore`])
//! - a local directory for the uploaded files ([`photoboard_core::BlobStore`])
//! - Askama templates for the HTML pages ([`render`])

pub mod handlers;
pub mod infra;
pub mod render;
pub mod routes;

pub use infra::app_state::AppState;

//! # Photoboard Core
//!
//! Storage and orchestration for the Photoboard photo log.
//!
//! ## Overview
//!
//! - **Blob Store** ([`blob_store`]): uploaded files on local disk, one file
//!   per photo, named by a generated time-ordered token.
//! - **Metadata Store** ([`metadata_store`]): the ordered list of
//!   [`PhotoRecord`]s, persisted as a JSON snapshot on every mutation.
//! - **Photo Service** ([`service`]): the upload and delete sequences the
//!   HTTP handlers run across both stores.
//! - **Sweep** ([`reconcile`]): finds orphaned blobs and dangling records
//!   left behind by partial failures.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use photoboard_core::{BlobStore, MetadataStore, PhotoService};
//!
//! async fn upload_one() -> photoboard_core::Result<()> {
//!     let metadata = Arc::new(MetadataStore::open("data.json").await?);
//!     let service = PhotoService::new(BlobStore::new("uploads".into()), metadata);
//!
//!     let record = service.upload(b"\x89PNG...", Some("cat.png"), "cute").await?;
//!     assert_eq!(service.list().await.len(), 1);
//!     service.delete(&record.filename).await?;
//!     Ok(())
//! }
//! ```

pub mod blob_store;
pub mod error;
pub mod metadata_store;
pub mod photo;
pub mod reconcile;
pub mod service;

pub use blob_store::BlobStore;
pub use error::{PhotoError, Result};
pub use metadata_store::MetadataStore;
pub use photo::{PhotoCollection, PhotoRecord};
pub use reconcile::{SweepMode, SweepReport};
pub use service::PhotoService;

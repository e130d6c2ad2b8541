//! Publish a new version of an existing Zenodo deposition.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::time::Duration;
//! use zenodo_publish::services::{publisher::publish, transport::ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(Duration::from_secs(300))?;
//! let record = publish(transport, 1234567u64, "dist/data.zip", "1.2.3", "token", true).await?;
//! println!("{} {}", record.html, record.doi);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use errors::{PublishError, PublishResult, Step};
pub use models::{DepositionId, DraftDeposition, PublishedRecord, UploadedFile};
pub use services::publisher::{AuthToken, DepositionPublisher, PublishRequest, publish};
pub use services::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

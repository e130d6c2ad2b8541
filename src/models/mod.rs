//! Data models for the Zenodo deposit API.
//!
//! Wire types mirror the JSON the API returns and are decoded with `serde`;
//! the domain types (`DraftDeposition`, `UploadedFile`, `PublishedRecord`)
//! are what the publisher threads from one step to the next.

pub mod deposition;
pub mod file;
pub mod record;

pub use deposition::{DepositionId, DraftDeposition};
pub use file::UploadedFile;
pub use record::PublishedRecord;

//! The published record handed back to the caller.

use serde::{Deserialize, Serialize};

/// A published version of a deposition.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublishedRecord {
    /// Identifier of the published record.
    pub id: u64,

    /// Public landing page.
    pub html: String,

    /// DOI resolver URL.
    pub doi: String,

    /// Version recorded on the record; always the version the caller asked for.
    pub version: String,
}

/// Body of `POST {draft}/actions/publish`.
#[derive(Debug, Deserialize)]
pub(crate) struct PublishResponse {
    pub id: u64,
    pub links: PublishLinks,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishLinks {
    pub latest_html: String,
    pub doi: String,
}

impl PublishedRecord {
    pub(crate) fn from_response(response: PublishResponse, version: &str) -> Self {
        Self {
            id: response.id,
            html: response.links.latest_html,
            doi: response.links.doi,
            version: version.to_string(),
        }
    }
}

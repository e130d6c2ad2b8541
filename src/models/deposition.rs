//! Depositions and the drafts created from them.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

/// Characters escaped inside a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Identifier of an existing deposition, forwarded verbatim into URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepositionId(String);

impl fmt::Display for DepositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for DepositionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DepositionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DepositionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl FromStr for DepositionId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// An unpublished version of a deposition.
///
/// Both locators are taken from the API responses and reused as-is by every
/// later step of the same run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftDeposition {
    /// URL of the draft itself (GET/PUT target, base of `actions/publish`).
    pub self_locator: String,

    /// URL of the draft's file bucket.
    pub bucket_locator: String,

    /// Version currently recorded on the draft.
    pub version: Option<String>,
}

impl DraftDeposition {
    /// Assemble the draft from the locator step 1 handed out and the body step 2 returned.
    pub(crate) fn from_response(self_locator: String, response: DraftResponse) -> Self {
        Self {
            self_locator,
            bucket_locator: response.links.bucket,
            version: response.metadata.version,
        }
    }

    /// URL the named file is uploaded to; the name is escaped as one path segment.
    pub fn file_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.bucket_locator.trim_end_matches('/'),
            utf8_percent_encode(filename, PATH_SEGMENT)
        )
    }

    pub fn publish_url(&self) -> String {
        format!("{}/actions/publish", self.self_locator.trim_end_matches('/'))
    }
}

/// Body of `POST .../actions/newversion`.
#[derive(Debug, Deserialize)]
pub(crate) struct NewVersionResponse {
    pub links: NewVersionLinks,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewVersionLinks {
    pub latest_draft: String,
}

/// Body of `GET {draft}` and `PUT {draft}`.
#[derive(Debug, Deserialize)]
pub(crate) struct DraftResponse {
    pub links: DraftLinks,
    #[serde(default)]
    pub metadata: DraftMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DraftLinks {
    pub bucket: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DraftMetadata {
    pub version: Option<String>,
}

/// Body of `PUT {draft}` when the metadata is updated; only the metadata is echoed back.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataResponse {
    #[serde(default)]
    pub metadata: DraftMetadata,
}

/// Request body setting the draft's version: `{"metadata":{"version":"..."}}`.
#[derive(Debug, Serialize)]
pub(crate) struct VersionUpdate<'a> {
    pub metadata: VersionField<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VersionField<'a> {
    pub version: &'a str,
}

impl<'a> VersionUpdate<'a> {
    pub fn new(version: &'a str) -> Self {
        Self {
            metadata: VersionField { version },
        }
    }
}

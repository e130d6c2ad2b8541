//! src/services/publisher.rs
//!
//! DepositionPublisher: publishes a new version of an existing Zenodo
//! deposition. One run is five dependent calls: create a draft, fetch it,
//! upload the file into its bucket, set its version, publish it. Each call
//! consumes the locator extracted from an earlier response; the first
//! failure stops the run and nothing already done remotely is undone.

use crate::{
    errors::{PublishError, PublishResult, Step},
    models::{
        DepositionId, DraftDeposition, PublishedRecord, UploadedFile,
        deposition::{DraftResponse, MetadataResponse, NewVersionResponse, VersionUpdate},
        record::PublishResponse,
    },
    services::transport::{HttpRequest, Transport},
};
use bytes::Bytes;
use reqwest::header;
use serde::de::DeserializeOwned;
use std::{
    fmt, io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, info};

pub const PRODUCTION_URL: &str = "https://zenodo.org";
pub const SANDBOX_URL: &str = "https://sandbox.zenodo.org";

/// Base URL of the production or the sandbox instance.
pub fn zenodo_base_url(use_sandbox: bool) -> &'static str {
    if use_sandbox { SANDBOX_URL } else { PRODUCTION_URL }
}

/// Personal access token, sent as `Authorization: Bearer {token}`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AuthToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// What to publish.
#[derive(Clone, Debug)]
pub struct PublishRequest {
    pub deposition_id: DepositionId,
    pub file_path: PathBuf,
    /// Forwarded verbatim; no format is enforced.
    pub version: String,
    /// Compare the server's checksum with a local MD5 before continuing.
    pub verify_checksum: bool,
}

impl PublishRequest {
    pub fn new(
        deposition_id: impl Into<DepositionId>,
        file_path: impl Into<PathBuf>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            deposition_id: deposition_id.into(),
            file_path: file_path.into(),
            version: version.into(),
            verify_checksum: false,
        }
    }

    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}

/// Runs the publish workflow over an injected transport.
pub struct DepositionPublisher<T> {
    transport: T,
    base_url: String,
    token: AuthToken,
}

impl<T: Transport> DepositionPublisher<T> {
    pub fn new(transport: T, base_url: impl Into<String>, token: AuthToken) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Publisher aimed at zenodo.org or sandbox.zenodo.org.
    pub fn for_zenodo(transport: T, token: AuthToken, use_sandbox: bool) -> Self {
        Self::new(transport, zenodo_base_url(use_sandbox), token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Publish `request.file_path` as version `request.version` of the deposition.
    pub async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishedRecord> {
        info!(
            deposition = %request.deposition_id,
            version = %request.version,
            file = %request.file_path.display(),
            "publishing new version"
        );

        let draft_locator = self.create_new_version(&request.deposition_id).await?;
        let draft = self.fetch_draft(draft_locator).await?;
        self.upload_file(&draft, &request.file_path, request.verify_checksum)
            .await?;
        self.update_version(&draft, &request.version).await?;
        let record = self.publish_draft(&draft, &request.version).await?;

        info!(id = record.id, doi = %record.doi, "published {}", record.html);
        Ok(record)
    }

    /// Step 1: ask for a new draft version; returns the draft's locator.
    pub async fn create_new_version(&self, deposition_id: &DepositionId) -> PublishResult<String> {
        let url = format!(
            "{}/api/deposit/depositions/{}/actions/newversion",
            self.base_url, deposition_id
        );
        let response: NewVersionResponse = self
            .call(Step::NewVersion, HttpRequest::post(url))
            .await?;

        debug!(draft = %response.links.latest_draft, "created draft");
        Ok(response.links.latest_draft)
    }

    /// Step 2: fetch the draft to learn its bucket.
    pub async fn fetch_draft(&self, draft_locator: String) -> PublishResult<DraftDeposition> {
        let response: DraftResponse = self
            .call(Step::FetchDraft, HttpRequest::get(draft_locator.as_str()))
            .await?;
        let draft = DraftDeposition::from_response(draft_locator, response);

        debug!(
            bucket = %draft.bucket_locator,
            current_version = draft.version.as_deref().unwrap_or("<none>"),
            "fetched draft"
        );
        Ok(draft)
    }

    /// Step 3: read the local file and PUT it into the draft's bucket under its basename.
    pub async fn upload_file(
        &self,
        draft: &DraftDeposition,
        path: &Path,
        verify_checksum: bool,
    ) -> PublishResult<UploadedFile> {
        let filename = upload_filename(path)?;
        let contents = fs::read(path)
            .await
            .map_err(|err| PublishError::file_access(path, err))?;
        let local_md5 = verify_checksum.then(|| format!("{:x}", md5::compute(&contents)));

        info!(filename, bytes = contents.len(), "uploading file");
        let request = HttpRequest::put(draft.file_url(filename)).bytes(Bytes::from(contents));
        let uploaded: UploadedFile = self.call(Step::Upload, request).await?;

        if let Some(expected) = local_md5 {
            match uploaded.md5_hex() {
                Some(actual) if actual.eq_ignore_ascii_case(&expected) => {
                    debug!(checksum = %expected, "checksum verified");
                }
                actual => {
                    return Err(PublishError::ChecksumMismatch {
                        expected,
                        actual: actual.unwrap_or("<missing>").to_string(),
                    });
                }
            }
        }

        Ok(uploaded)
    }

    /// Step 4: set the draft's version. The echoed version is not checked.
    pub async fn update_version(&self, draft: &DraftDeposition, version: &str) -> PublishResult<()> {
        let request = HttpRequest::put(draft.self_locator.as_str())
            .json(&VersionUpdate::new(version))
            .map_err(|source| PublishError::Decode {
                step: Step::UpdateMetadata,
                source,
            })?;
        let response: MetadataResponse = self.call(Step::UpdateMetadata, request).await?;

        if response.metadata.version.as_deref() != Some(version) {
            debug!(
                requested = version,
                echoed = response.metadata.version.as_deref().unwrap_or("<none>"),
                "draft echoed a different version"
            );
        }
        Ok(())
    }

    /// Step 5: publish the draft.
    pub async fn publish_draft(
        &self,
        draft: &DraftDeposition,
        version: &str,
    ) -> PublishResult<PublishedRecord> {
        let response: PublishResponse = self
            .call(Step::Publish, HttpRequest::post(draft.publish_url()))
            .await?;
        Ok(PublishedRecord::from_response(response, version))
    }

    /// Authenticate, send, reject non-2xx, decode.
    async fn call<R: DeserializeOwned>(&self, step: Step, request: HttpRequest) -> PublishResult<R> {
        let request = request.header(header::AUTHORIZATION.as_str(), self.token.bearer());
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| PublishError::transport(step, format!("{err:#}")))?;

        if !response.is_success() {
            debug!(%step, status = %response.status, "request rejected");
            return Err(PublishError::api(step, response.status, response.status_text));
        }

        response
            .json()
            .map_err(|source| PublishError::Decode { step, source })
    }
}

/// Publish `file_path` as `version` of `deposition_id` on zenodo.org (or the sandbox).
pub async fn publish<T: Transport>(
    transport: T,
    deposition_id: impl Into<DepositionId>,
    file_path: impl Into<PathBuf>,
    version: impl Into<String>,
    token: impl Into<AuthToken>,
    use_sandbox: bool,
) -> PublishResult<PublishedRecord> {
    let publisher = DepositionPublisher::for_zenodo(transport, token.into(), use_sandbox);
    publisher
        .publish(&PublishRequest::new(deposition_id, file_path, version))
        .await
}

fn upload_filename(path: &Path) -> PublishResult<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            PublishError::file_access(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no usable file name"),
            )
        })
}

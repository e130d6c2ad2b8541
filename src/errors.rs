use reqwest::StatusCode;
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// One of the five calls that make up a publish run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    NewVersion,
    FetchDraft,
    Upload,
    UpdateMetadata,
    Publish,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::NewVersion => "new version",
            Step::FetchDraft => "fetch draft",
            Step::Upload => "upload",
            Step::UpdateMetadata => "update metadata",
            Step::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    /// Zenodo answered with a non-2xx status.
    #[error("Zenodo API communication error: {status_text}")]
    Api {
        step: Step,
        status: StatusCode,
        status_text: String,
    },
    #[error("cannot read `{}`: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("request failed during {step}: {message}")]
    Transport { step: Step, message: String },
    #[error("unexpected response body during {step}: {source}")]
    Decode {
        step: Step,
        #[source]
        source: serde_json::Error,
    },
    #[error("uploaded checksum `{actual}` does not match local checksum `{expected}`")]
    ChecksumMismatch { expected: String, actual: String },
}

pub type PublishResult<T> = Result<T, PublishError>;

impl PublishError {
    /// Shortcut for a rejected response.
    pub fn api(step: Step, status: StatusCode, status_text: impl Into<String>) -> Self {
        Self::Api {
            step,
            status,
            status_text: status_text.into(),
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn transport(step: Step, message: impl fmt::Display) -> Self {
        Self::Transport {
            step,
            message: message.to_string(),
        }
    }

    /// The step that failed, when the failure happened on the wire.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Api { step, .. } | Self::Transport { step, .. } | Self::Decode { step, .. } => {
                Some(*step)
            }
            Self::ChecksumMismatch { .. } => Some(Step::Upload),
            Self::FileAccess { .. } => None,
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

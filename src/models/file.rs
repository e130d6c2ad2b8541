//! Represents a file stored in a draft's bucket.

use serde::{Deserialize, Serialize};

/// Confirmation returned by the bucket after an upload.
///
/// The legacy files API answers with `id`/`filename`/`filesize`, the bucket
/// API with `version_id`/`key`/`size`; both shapes decode into this struct.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// Remote identifier of the stored file.
    #[serde(default, alias = "version_id")]
    pub id: Option<String>,

    /// Name the file was stored under.
    #[serde(default, alias = "key")]
    pub filename: Option<String>,

    /// Size in bytes as counted by the server.
    #[serde(default, alias = "size")]
    pub filesize: Option<u64>,

    /// Server-side MD5, either bare hex or prefixed with `md5:`.
    #[serde(default)]
    pub checksum: Option<String>,
}

impl UploadedFile {
    /// The MD5 hex digest with any `md5:` prefix removed.
    pub fn md5_hex(&self) -> Option<&str> {
        self.checksum
            .as_deref()
            .map(|c| c.strip_prefix("md5:").unwrap_or(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_files_api_shape() {
        let file: UploadedFile = serde_json::from_str(
            r#"{"id": "fileid1", "filename": "somefile.txt", "filesize": 9,
                "checksum": "4e74fa271381933159558bf36bed0a50"}"#,
        )
        .unwrap();
        assert_eq!(file.filename.as_deref(), Some("somefile.txt"));
        assert_eq!(file.filesize, Some(9));
        assert_eq!(file.md5_hex(), Some("4e74fa271381933159558bf36bed0a50"));
    }

    #[test]
    fn decodes_bucket_api_shape() {
        let file: UploadedFile = serde_json::from_str(
            r#"{"version_id": "v1", "key": "data.zip", "size": 42,
                "checksum": "md5:0cc175b9c0f1b6a831c399e269772661", "mimetype": "application/zip"}"#,
        )
        .unwrap();
        assert_eq!(file.id.as_deref(), Some("v1"));
        assert_eq!(file.filename.as_deref(), Some("data.zip"));
        assert_eq!(file.md5_hex(), Some("0cc175b9c0f1b6a831c399e269772661"));
    }
}

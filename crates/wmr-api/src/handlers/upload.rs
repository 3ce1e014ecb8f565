//! Multipart upload helpers.

use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

/// Form field every upload endpoint reads.
pub const FILE_FIELD: &str = "file";

/// A single uploaded file.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Extension of the client file name, if it is a plain alphanumeric one.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then(|| ext.to_ascii_lowercase())
    }
}

/// Read the `file` field; other fields are skipped.
pub async fn read_file_field(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request("Missing multipart field 'file'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>) -> Upload {
        Upload {
            file_name: name.map(str::to_string),
            bytes: vec![1],
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(upload(Some("clip.MP4")).extension().as_deref(), Some("mp4"));
        assert_eq!(upload(Some("archive.tar.gz")).extension().as_deref(), Some("gz"));
        assert_eq!(upload(Some("../../etc/passwd")).extension(), None);
        assert_eq!(upload(Some("noext")).extension(), None);
        assert_eq!(upload(None).extension(), None);
    }
}

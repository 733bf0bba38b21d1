use std::path::Path;

use bytes::Bytes;

use crate::errors::ResumeError;

/// Only Word documents are accepted.
pub const ACCEPTED_EXTENSION: &str = ".docx";
/// 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// An uploaded resume file, owned by a single pipeline run.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn meta(&self) -> UploadMeta<'_> {
        UploadMeta {
            name: &self.file_name,
            size_bytes: self.bytes.len() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadMeta<'a> {
    pub name: &'a str,
    pub size_bytes: u64,
}

/// Rejects uploads by metadata alone, before any bytes are read.
pub fn validate_upload(meta: &UploadMeta<'_>) -> Result<(), ResumeError> {
    if !has_accepted_extension(meta.name) {
        return Err(ResumeError::InvalidFormat);
    }
    if meta.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ResumeError::FileTooLarge {
            size_bytes: meta.size_bytes,
        });
    }
    Ok(())
}

/// Case-insensitive; a bare `.docx` has no stem and does not count.
fn has_accepted_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, size_bytes: u64) -> UploadMeta<'_> {
        UploadMeta { name, size_bytes }
    }

    #[test]
    fn test_accepts_docx_any_case() {
        assert!(validate_upload(&meta("resume.docx", 10_000)).is_ok());
        assert!(validate_upload(&meta("Jane_Doe_CV.DOCX", 10_000)).is_ok());
        assert!(validate_upload(&meta("cv.DocX", 0)).is_ok());
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in [
            "resume.pdf",
            "resume.doc",
            "resume.docx.pdf",
            "resume",
            "docx",
            ".docx",
            ".DOCX",
            "resume.docxx",
        ] {
            assert_eq!(
                validate_upload(&meta(name, 100)),
                Err(ResumeError::InvalidFormat),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        assert!(validate_upload(&meta("cv.docx", MAX_UPLOAD_BYTES)).is_ok());
        assert_eq!(
            validate_upload(&meta("cv.docx", 5_242_881)),
            Err(ResumeError::FileTooLarge {
                size_bytes: 5_242_881
            })
        );
    }

    #[test]
    fn test_format_checked_before_size() {
        assert_eq!(
            validate_upload(&meta("huge.pdf", 50_000_000)),
            Err(ResumeError::InvalidFormat)
        );
    }

    #[test]
    fn test_upload_meta_reflects_bytes() {
        let upload = ResumeUpload::new("cv.docx", vec![0u8; 1234]);
        let meta = upload.meta();
        assert_eq!(meta.name, "cv.docx");
        assert_eq!(meta.size_bytes, 1234);
    }
}

//! Uploaded face-swap inputs.
//!
//! A face swap needs exactly two files: the `source` face and the `target`
//! media the face is placed onto. [`FaceSwapUploadBuilder`] collects
//! multipart parts as they arrive and [`FaceSwapUploadBuilder::build`]
//! rejects the request when either is absent.

use crate::error::CoreError;

/// Multipart field name of the face image.
pub const SOURCE_FIELD: &str = "source";

/// Multipart field name of the media that receives the face.
pub const TARGET_FIELD: &str = "target";

/// A single uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, or the field name when none was sent.
    pub file_name: String,
    /// Client-supplied MIME type, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Both inputs of a face swap.
#[derive(Debug, Clone)]
pub struct FaceSwapUpload {
    pub source: UploadedFile,
    pub target: UploadedFile,
}

/// Accumulates multipart fields into a [`FaceSwapUpload`].
#[derive(Debug, Default)]
pub struct FaceSwapUploadBuilder {
    source: Option<UploadedFile>,
    target: Option<UploadedFile>,
}

impl FaceSwapUploadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a multipart field. Returns `false` for fields that are not
    /// part of a face swap so the caller can ignore them.
    ///
    /// A repeated field replaces the earlier value.
    pub fn accept(&mut self, field: &str, file: UploadedFile) -> bool {
        match field {
            SOURCE_FIELD => self.source = Some(file),
            TARGET_FIELD => self.target = Some(file),
            _ => return false,
        }
        true
    }

    /// Finish the upload. Empty parts are treated as missing.
    pub fn build(self) -> Result<FaceSwapUpload, CoreError> {
        let source = require(self.source, SOURCE_FIELD)?;
        let target = require(self.target, TARGET_FIELD)?;
        Ok(FaceSwapUpload { source, target })
    }
}

fn require(file: Option<UploadedFile>, field: &str) -> Result<UploadedFile, CoreError> {
    match file {
        Some(f) if !f.data.is_empty() => Ok(f),
        _ => Err(CoreError::Validation(format!(
            "Missing required '{field}' file"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn file(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: bytes.to_vec(),
        }
    }

    #[test]
    fn builds_with_both_files() {
        let mut builder = FaceSwapUploadBuilder::new();
        assert!(builder.accept("source", file("face.png", b"face")));
        assert!(builder.accept("target", file("clip.mp4", b"clip")));

        let upload = builder.build().unwrap();
        assert_eq!(upload.source.file_name, "face.png");
        assert_eq!(upload.target.data, b"clip");
    }

    #[test]
    fn missing_source_is_rejected() {
        let mut builder = FaceSwapUploadBuilder::new();
        builder.accept("target", file("clip.mp4", b"clip"));

        assert_matches!(
            builder.build(),
            Err(CoreError::Validation(msg)) if msg.contains("'source'")
        );
    }

    #[test]
    fn missing_target_is_rejected() {
        let mut builder = FaceSwapUploadBuilder::new();
        builder.accept("source", file("face.png", b"face"));

        assert_matches!(
            builder.build(),
            Err(CoreError::Validation(msg)) if msg.contains("'target'")
        );
    }

    #[test]
    fn empty_part_counts_as_missing() {
        let mut builder = FaceSwapUploadBuilder::new();
        builder.accept("source", file("face.png", b""));
        builder.accept("target", file("clip.mp4", b"clip"));

        assert_matches!(builder.build(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut builder = FaceSwapUploadBuilder::new();
        assert!(!builder.accept("notes", file("notes.txt", b"hi")));
    }
}

//! Request-scoped input types shared by ingestion and the brightness check.

/// Media-type prefix an upload must declare to be treated as an image.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// One uploaded file as the HTTP layer hands it over.
///
/// `original_name` is untrusted. It is only ever used to pick an extension
/// for the generated stored filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub data: Vec<u8>,
    pub original_name: String,
    pub content_type: String,
}

impl UploadPart {
    pub fn new(
        data: impl Into<Vec<u8>>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            original_name: original_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Whether the declared content type starts with `image/` (case-insensitive).
    pub fn is_image(&self) -> bool {
        self.content_type
            .get(..IMAGE_CONTENT_TYPE_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_CONTENT_TYPE_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_content_types() {
        assert!(UploadPart::new(vec![], "a.jpg", "image/jpeg").is_image());
        assert!(UploadPart::new(vec![], "a.png", "IMAGE/PNG").is_image());
        assert!(UploadPart::new(vec![], "a", "image/").is_image());
    }

    #[test]
    fn non_image_content_types() {
        assert!(!UploadPart::new(vec![], "a.txt", "text/plain").is_image());
        assert!(!UploadPart::new(vec![], "a.jpg", "").is_image());
        assert!(!UploadPart::new(vec![], "a.jpg", "application/octet-stream").is_image());
        assert!(!UploadPart::new(vec![], "a.jpg", "imag").is_image());
        assert!(!UploadPart::new(vec![], "a.jpg", " image/png").is_image());
    }

    #[test]
    fn multibyte_content_type_does_not_panic() {
        assert!(!UploadPart::new(vec![], "a.jpg", "imagé/png").is_image());
    }
}

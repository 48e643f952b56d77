//! Minimal `multipart/form-data` body builder.

/// An in-memory multipart body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// Start a body with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("drishti-{:016x}", rand::random::<u64>()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a part.
    pub fn part(
        &mut self,
        name: &str,
        file_name: Option<&str>,
        content_type: &str,
        data: &[u8],
    ) -> &mut Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        let disposition = match file_name {
            Some(file) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
        };
        self.body.extend_from_slice(disposition.as_bytes());
        self.body
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body and return its bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_layout() {
        let mut body = MultipartBody::with_boundary("XYZ");
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
        body.part("metadata", None, "application/json", b"{}")
            .part("image_1", Some("a.jpg"), "image/jpeg", b"\xFF\xD8");
        let bytes = body.finish();

        let expected = [
            &b"--XYZ\r\nContent-Disposition: form-data; name=\"metadata\"\r\n"[..],
            b"Content-Type: application/json\r\n\r\n{}\r\n",
            b"--XYZ\r\nContent-Disposition: form-data; name=\"image_1\"; filename=\"a.jpg\"\r\n",
            b"Content-Type: image/jpeg\r\n\r\n\xFF\xD8\r\n",
            b"--XYZ--\r\n",
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_random_boundaries_differ() {
        assert_ne!(MultipartBody::new().content_type(), MultipartBody::new().content_type());
    }
}

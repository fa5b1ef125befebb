// File: ./src/client/multipart.rs
// multipart/form-data encoder for file uploads.
use bytes::Bytes;
use uuid::Uuid;

#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("docboard-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.part_header(name, None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.part_header(name, Some(file_name));
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn part_header(&mut self, name: &str, file_name: Option<&str>) {
        let mut header = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.boundary,
            quote(name)
        );
        if let Some(file_name) = file_name {
            header.push_str(&format!(
                "; filename=\"{}\"\r\nContent-Type: application/octet-stream",
                quote(file_name)
            ));
        }
        header.push_str("\r\n\r\n");
        self.body.extend_from_slice(header.as_bytes());
    }

    /// Closes the form; returns the `Content-Type` header value and the body.
    pub fn finish(mut self) -> (String, Bytes) {
        let content_type = self.content_type();
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (content_type, Bytes::from(self.body))
    }
}

/// Header parameter values may not contain quotes or line breaks.
fn quote(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let form = MultipartForm::new()
            .text("setCover", "false")
            .file("file", "notes \"v2\".txt", b"hello");
        let boundary = form.boundary().to_string();
        let (content_type, body) = form.finish();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(
            content_type,
            format!("multipart/form-data; boundary={}", boundary)
        );
        assert!(body.starts_with(&format!("--{}\r\n", boundary)));
        assert!(body.contains("name=\"setCover\"\r\n\r\nfalse\r\n"));
        assert!(body.contains("filename=\"notes 'v2'.txt\""));
        assert!(body.contains("\r\n\r\nhello\r\n"));
        assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
    }
}

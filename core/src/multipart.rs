//! `multipart/form-data` encoding for file uploads.

use uuid::Uuid;

use crate::http::FilePart;

/// An encoded multipart body and the `content-type` header that goes with it.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Encode `files` with a fresh random boundary.
pub fn encode(files: &[FilePart]) -> MultipartBody {
    encode_with_boundary(files, &format!("meli-{}", Uuid::new_v4().simple()))
}

pub fn encode_with_boundary(files: &[FilePart], boundary: &str) -> MultipartBody {
    let mut bytes = Vec::new();
    for part in files {
        bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape(&part.field),
                escape(&part.file_name)
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        bytes.extend_from_slice(&part.bytes);
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes,
    }
}

// Quotes and line breaks would end the header parameter early.
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

//! Test fixtures: fake video payloads and multipart forms.

use axum_test::multipart::{MultipartForm, Part};

/// Bytes starting with an MP4 `ftyp` box; content beyond that is irrelevant to the
/// scripted probes.
pub fn fake_mp4(tag: &str) -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypisom");
    data.extend_from_slice(tag.as_bytes());
    data.resize(1024, 0x42);
    data
}

/// Upload form with a `video` part and an optional `description` part.
pub fn video_form(filename: &str, data: Vec<u8>, description: Option<&str>) -> MultipartForm {
    let form = MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name(filename).mime_type("video/mp4"),
    );
    match description {
        Some(text) => form.add_text("description", text),
        None => form,
    }
}

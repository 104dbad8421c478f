use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

/// MIME type assumed when the payload cannot be sniffed
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Base64 characters decoded to detect the image format
const SNIFF_CHARS: usize = 64;

/// Wrap a base64 image payload in a data URI for the model
pub fn image_data_url(payload: &str) -> String {
    if payload.starts_with("data:") {
        return payload.to_string();
    }

    format!("data:{};base64,{}", sniff_mime(payload), payload)
}

/// Guess the MIME type from the first decoded bytes of the payload
fn sniff_mime(payload: &str) -> &'static str {
    // Decode a whole number of base64 quanta
    let prefix_len = payload.len().min(SNIFF_CHARS) / 4 * 4;

    let mime = payload
        .get(..prefix_len)
        .and_then(|prefix| STANDARD.decode(prefix).ok())
        .and_then(|bytes| ::image::guess_format(&bytes).ok())
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_IMAGE_MIME);

    debug!("Detected image type {}", mime);
    mime
}

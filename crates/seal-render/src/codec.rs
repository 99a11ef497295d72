//! PNG / JPEG encoding helpers and data URLs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use seal_types::{SealError, SealResult};
use std::io::Cursor;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub fn encode_png(image: &RgbaImage) -> SealResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| SealError::io("encoding PNG", e))?;
    Ok(bytes)
}

/// Decode PNG or JPEG bytes into RGBA; opaque sources get full alpha
pub fn decode_image(bytes: &[u8]) -> SealResult<RgbaImage> {
    if bytes.is_empty() {
        return Err(SealError::validation("Image data is empty"));
    }
    let image = image::load_from_memory(bytes).map_err(|e| SealError::io("decoding image", e))?;
    Ok(image.to_rgba8())
}

/// Strip an optional `data:...;base64,` prefix and any whitespace, then decode
pub fn decode_base64_image(data: &str) -> SealResult<Vec<u8>> {
    let payload = match data.find(',') {
        Some(pos) => &data[pos + 1..],
        None => data,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(SealError::validation("Image data is empty"));
    }
    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| SealError::validation(format!("Invalid base64 image data: {}", e)))
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png))
}

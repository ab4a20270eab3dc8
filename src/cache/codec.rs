//! Compression Codec
//!
//! Encodes large JSON values as base64 text of their DEFLATE-compressed
//! serialization, and reverses it.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::error::{CacheError, Result};

/// Serialized size of a value in bytes.
pub fn serialized_size(value: &Value) -> usize {
    // Value serialization cannot fail: all map keys are strings.
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Compresses a value into its encoded text form.
pub fn compress(value: &Value) -> Result<String> {
    let raw = serde_json::to_vec(value)?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| CacheError::Compression(e.to_string()))?;
    let packed = encoder
        .finish()
        .map_err(|e| CacheError::Compression(e.to_string()))?;
    Ok(STANDARD.encode(packed))
}

/// Restores a value from its encoded text form.
pub fn decompress(encoded: &str) -> Result<Value> {
    let packed = STANDARD
        .decode(encoded)
        .map_err(|e| CacheError::Compression(format!("invalid base64: {}", e)))?;
    let mut raw = Vec::new();
    DeflateDecoder::new(packed.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| CacheError::Compression(format!("invalid deflate stream: {}", e)))?;
    Ok(serde_json::from_slice(&raw)?)
}

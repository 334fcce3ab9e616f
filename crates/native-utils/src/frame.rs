use std::path::Path;

use anyhow::Context;
use base64::Engine;

/// Encodes an image as standard base64, the form carried by `process_frame`.
pub fn encode_frame(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Reads an encoded still (JPEG, PNG, ...) from disk and base64-encodes it.
pub fn read_frame(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read frame {}", path.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("Frame {} is empty", path.display());
    }
    Ok(encode_frame(&bytes))
}

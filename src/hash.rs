//! Content identity digests.

use sha2::{Digest, Sha256};

/// SHA-256 of the utf-8 encoding, lowercase hex. Identity of a text block.
pub fn text_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// SHA-256 of a raw byte stream, lowercase hex. Identity of an image; no
/// content sniffing happens here.
pub fn bytes_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

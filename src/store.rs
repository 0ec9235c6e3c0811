//! Content-addressed persistence of image byte streams.
//!
//! Every distinct image is written exactly once, keyed by its hash. Writes
//! go through a temp file and an atomic rename so that a parallel variant
//! gets first-writer-wins without readers ever observing a partial file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::guess_format;

/// A directory of `<hash>.<ext>` artifacts.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: &Path) -> ImageStore {
        ImageStore { root: root.to_path_buf() }
    }

    /// Persists `bytes` under `hash` unless an artifact with that hash
    /// already exists. Returns the artifact path either way.
    pub fn put_if_absent(&self, hash: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.root.join(format!("{hash}.{}", artifact_extension(bytes)));
        if path.exists() {
            return Ok(path);
        }
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }
}

/// File extension by sniffing the byte stream's magic; streams that are not
/// a recognizable raster format (raw or exotically filtered PDF image data)
/// fall back to `bin`.
fn artifact_extension(bytes: &[u8]) -> &'static str {
    match guess_format(bytes) {
        Ok(format) => format.extensions_str().first().copied().unwrap_or("bin"),
        Err(_) => "bin",
    }
}

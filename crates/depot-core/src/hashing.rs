//! Streaming SHA-256 of files on disk.

use depot_schema::Sha256Digest;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Read buffer size. Files are never loaded whole.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 of a file, reading it in fixed-size chunks.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> std::io::Result<Sha256Digest> {
    let file = std::fs::File::open(path)?;
    sha256_reader(file)
}

/// Compute the SHA-256 of everything `reader` yields.
///
/// # Errors
///
/// Returns the first read error encountered.
pub fn sha256_reader(mut reader: impl Read) -> std::io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    let digest: [u8; 32] = hasher.finalize().into();
    Ok(Sha256Digest::from_bytes(&digest))
}

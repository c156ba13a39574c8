//! Streaming CRC-32 content checksum.

use crate::error::FingerprintError;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Block size used when streaming files through the checksum
pub const READ_BUFFER_SIZE: usize = 65536;

/// CRC-32 (IEEE) of everything `reader` yields, as 8 lowercase hex digits.
pub fn compute_checksum<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:08x}", hasher.finalize()))
}

/// Checksum of a file on disk.
pub fn checksum_file(path: &Path) -> Result<String, FingerprintError> {
    let io_error = |source| FingerprintError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    compute_checksum(file).map_err(io_error)
}

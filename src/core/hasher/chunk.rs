//! # Chunk Hasher
//!
//! Computes a stable 256-bit content fingerprint from a file's contents
//! using a fixed head+tail sampling policy (§4.4):
//!
//! - Let `S` be the file size and `C = 1 MiB`.
//! - If `S ≤ 2·C`: hash the entire file, read in `C`-sized blocks.
//! - Else: hash the first `C` bytes, then seek to `S − C` and hash the
//!   last `C` bytes.
//!
//! Large videos dominate wall-clock hashing time; head+tail sampling
//! catches accidental duplicates (same container, same tail index) at a
//! large performance multiple while admitting rare false positives on
//! crafted files whose differences lie only in the untouched middle
//! region. That trade-off is intentional (§4.4, §9).

use crate::error::WalkError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Size of the window hashed in the head/tail sampling policy: 1 MiB.
pub const CHUNK_SIZE: u64 = 1024 * 1024;

/// A 256-bit content fingerprint. Two files with equal fingerprints are
/// treated as content-identical (collision risk accepted, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 hex characters, used to name Content Duplicate groups (§4.6a).
    pub fn short_hex(&self) -> String {
        self.to_string().chars().take(8).collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Compute the content fingerprint of `path`, per the sampling policy
/// above. Fails with `WalkError::Io` if the file cannot be opened or
/// read; callers exclude such files from duplicate detection but still
/// treat them as unique in the Planner (§4.4).
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, WalkError> {
    let io_err = |cause: std::io::Error| WalkError::Io {
        path: path.to_path_buf(),
        cause,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let size = file.metadata().map_err(io_err)?.len();

    let mut hasher = Sha256::new();

    if size <= 2 * CHUNK_SIZE {
        hash_whole_file(&mut file, &mut hasher).map_err(io_err)?;
    } else {
        hash_head_and_tail(&mut file, size, &mut hasher).map_err(io_err)?;
    }

    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Ok(Fingerprint(bytes))
}

fn hash_whole_file(file: &mut File, hasher: &mut Sha256) -> std::io::Result<()> {
    let mut buffer = vec![0u8; CHUNK_SIZE as usize];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(())
}

fn hash_head_and_tail(file: &mut File, size: u64, hasher: &mut Sha256) -> std::io::Result<()> {
    let mut buffer = vec![0u8; CHUNK_SIZE as usize];

    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut buffer)?;
    hasher.update(&buffer);

    file.seek(SeekFrom::Start(size - CHUNK_SIZE))?;
    file.read_exact(&mut buffer)?;
    hasher.update(&buffer);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn identical_small_files_have_identical_fingerprints() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.heic", b"same content");
        let b = write_file(&dir, "b.heic", b"same content");

        assert_eq!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn different_small_files_have_different_fingerprints() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.heic", b"content one");
        let b = write_file(&dir, "b.heic", b"content two, different");

        assert_ne!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn small_file_fingerprint_matches_sha256_of_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.heic", b"hello world");

        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"hello world");
            let digest = hasher.finalize();
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&digest);
            Fingerprint(bytes)
        };

        assert_eq!(fingerprint_file(&path).unwrap(), expected);
    }

    #[test]
    fn large_file_hashes_only_head_and_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.mov");

        // 2 * CHUNK_SIZE + 1 byte, so head and tail windows do not overlap
        // and the middle byte is never touched.
        let total = 2 * CHUNK_SIZE + 1;
        let mut file = File::create(&path).unwrap();
        file.set_len(total).unwrap();
        // Mark head and tail distinctly; leave the middle as zeros.
        file.write_all(&vec![0xAAu8; CHUNK_SIZE as usize]).unwrap();
        file.seek(SeekFrom::Start(total - CHUNK_SIZE)).unwrap();
        file.write_all(&vec![0xBBu8; CHUNK_SIZE as usize]).unwrap();
        drop(file);

        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(vec![0xAAu8; CHUNK_SIZE as usize]);
            hasher.update(vec![0xBBu8; CHUNK_SIZE as usize]);
            let digest = hasher.finalize();
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&digest);
            Fingerprint(bytes)
        };

        assert_eq!(fingerprint_file(&path).unwrap(), expected);
    }

    #[test]
    fn large_files_differing_only_in_middle_collide() {
        let dir = TempDir::new().unwrap();
        let total = 2 * CHUNK_SIZE + 100;

        let make = |name: &str, middle_byte: u8| {
            let path = dir.path().join(name);
            let mut file = File::create(&path).unwrap();
            file.set_len(total).unwrap();
            file.write_all(&vec![0xAAu8; CHUNK_SIZE as usize]).unwrap();
            file.seek(SeekFrom::Start(CHUNK_SIZE)).unwrap();
            file.write_all(&[middle_byte; 100]).unwrap();
            file.seek(SeekFrom::Start(total - CHUNK_SIZE)).unwrap();
            file.write_all(&vec![0xBBu8; CHUNK_SIZE as usize]).unwrap();
            path
        };

        let a = make("a.mov", 0x01);
        let b = make("b.mov", 0x02);

        // Intentional false-positive acceptance documented in §4.4/§9.
        assert_eq!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = fingerprint_file(Path::new("/nonexistent/path/12345.heic"));
        assert!(result.is_err());
    }

    #[test]
    fn short_hex_is_eight_characters() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.heic", b"hello world");
        let fp = fingerprint_file(&path).unwrap();
        assert_eq!(fp.short_hex().len(), 8);
    }
}

//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Blake3Hasher`] is the production [`ContentHasher`] handed to the
//! duplicate finder. Plain files are streamed through a fixed buffer; large
//! files go through BLAKE3's memory-mapped multi-threaded path. Archive
//! members are streamed straight out of their container.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::duplicates::ContentHasher;

use super::{archive, FileDescriptor, HashError};

/// A 32-byte BLAKE3 content digest.
pub type Hash = [u8; 32];

/// Read buffer size for streaming hashes.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Files at or above this size are hashed via mmap + rayon.
pub const MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Encode a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}

/// Decode a 64-character hex string into a digest.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}

/// BLAKE3 content hasher for filesystem files and archive members.
#[derive(Debug, Clone, Default)]
pub struct Blake3Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Blake3Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag; reads stop with [`HashError::Interrupted`] once it is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash a plain file on disk.
    ///
    /// Files at or above the mmap threshold are hashed in one call, so the
    /// shutdown flag is only checked before and after that call.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn hash_path(&self, path: &Path) -> Result<Hash, HashError> {
        let location = path.display().to_string();
        let size = std::fs::metadata(path)
            .map_err(|e| HashError::from_io(location.clone(), e))?
            .len();

        if size >= MMAP_THRESHOLD {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(location));
            }
            log::debug!(
                "Hashing large file ({} MB) via mmap: {}",
                size / (1024 * 1024),
                location
            );
            let mut hasher = blake3::Hasher::new();
            hasher
                .update_mmap_rayon(path)
                .map_err(|e| HashError::from_io(location.clone(), e))?;
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(location));
            }
            return Ok(*hasher.finalize().as_bytes());
        }

        let file = File::open(path).map_err(|e| HashError::from_io(location.clone(), e))?;
        self.hash_reader(BufReader::with_capacity(BUFFER_SIZE, file), location)
    }

    /// Hash a member of a zip archive without extracting it.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the archive or the member cannot be read.
    pub fn hash_member(&self, archive_path: &Path, member: &Path) -> Result<Hash, HashError> {
        let location = format!(
            "{}{}{}",
            archive_path.display(),
            super::ARCHIVE_SEPARATOR,
            member.display()
        );
        let mut zip = archive::open(archive_path).map_err(|e| match e {
            super::ScanError::Archive { source, .. } => HashError::Archive {
                location: location.clone(),
                source,
            },
            other => HashError::Other(other.to_string()),
        })?;
        let reader = archive::open_member(&mut zip, member).map_err(|source| {
            HashError::Archive {
                location: location.clone(),
                source,
            }
        })?;
        self.hash_reader(reader, location)
    }

    /// Stream `reader` to the end through a BLAKE3 hasher.
    fn hash_reader<R: Read>(&self, mut reader: R, location: String) -> Result<Hash, HashError> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(location));
            }
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(location, e)),
            };
            hasher.update(&buffer[..n]);
        }

        log::trace!("Hashed {}", location);
        Ok(*hasher.finalize().as_bytes())
    }
}

impl ContentHasher for Blake3Hasher {
    fn digest(&self, file: &FileDescriptor) -> Result<Hash, HashError> {
        if self.is_shutdown_requested() {
            return Err(HashError::Interrupted(file.location()));
        }
        match &file.archive {
            Some(archive_path) => self.hash_member(archive_path, &file.path),
            None => self.hash_path(&file.path),
        }
    }
}

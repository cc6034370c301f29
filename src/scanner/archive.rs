//! Zip archive enumeration.
//!
//! Members of a `.zip` container are exposed as ordinary
//! [`FileDescriptor`]s carrying the archive path. Listing reads only the
//! central directory and, when resolution probing is enabled, a bounded
//! header prefix of each member. Nothing is extracted to disk.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{NaiveDate, TimeZone, Utc};
use zip::result::ZipResult;
use zip::ZipArchive;

use super::{media, FileDescriptor, ScanError, WalkerConfig};

/// Bytes read from the start of a member to probe its dimensions.
pub const PROBE_PREFIX: u64 = 256 * 1024;

/// Whether `path` looks like a supported archive container.
#[must_use]
pub fn is_archive(path: &Path) -> bool {
    super::extension_of(path) == "zip"
}

/// Open an archive for reading.
///
/// # Errors
///
/// Returns [`ScanError`] if the file cannot be opened or is not a valid zip.
pub fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::from_io(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| ScanError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Open one member for streaming.
///
/// # Errors
///
/// Returns `ZipError::FileNotFound` if no member has that name.
pub fn open_member<'a, R: Read + Seek>(
    zip: &'a mut ZipArchive<R>,
    member: &Path,
) -> ZipResult<impl Read + 'a> {
    let name = member_name(member);
    zip.by_name(&name)
}

/// List the members of `archive_path` that pass the extension filter.
///
/// # Errors
///
/// Returns [`ScanError`] if the container itself cannot be read. A member
/// with a corrupt header is logged and skipped.
pub fn list_members(
    archive_path: &Path,
    config: &WalkerConfig,
) -> Result<Vec<FileDescriptor>, ScanError> {
    let mut zip = open(archive_path)?;
    let mut members = Vec::new();

    for index in 0..zip.len() {
        let mut entry = match zip.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!(
                    "Skipping unreadable member #{} of {}: {}",
                    index,
                    archive_path.display(),
                    e
                );
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = PathBuf::from(entry.name());
        if !config.accepts(&name) {
            log::trace!(
                "Skipping archive member by extension: {}",
                name.display()
            );
            continue;
        }

        let size = entry.size();
        let stamp = entry.last_modified().and_then(|dt| {
            dos_time_to_system(
                dt.year().into(),
                dt.month().into(),
                dt.day().into(),
                dt.hour().into(),
                dt.minute().into(),
                dt.second().into(),
            )
        });

        let resolution = if config.probe_resolution && media::is_photo(&name) {
            let mut prefix = Vec::new();
            match (&mut entry).take(PROBE_PREFIX).read_to_end(&mut prefix) {
                Ok(_) => media::probe_bytes(&prefix),
                Err(e) => {
                    log::debug!("Could not read header of {}: {}", name.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let mut file = FileDescriptor::new(name, size, stamp.unwrap_or(SystemTime::UNIX_EPOCH))
            .in_archive(archive_path);
        if let Some(modified) = stamp {
            file = file.with_modified(modified);
        }
        file.resolution = resolution;
        members.push(file);
    }

    log::debug!(
        "Archive {}: {} candidate member(s)",
        archive_path.display(),
        members.len()
    );
    Ok(members)
}

/// Convert a DOS timestamp (stored without zone) to a `SystemTime`, reading it as UTC.
fn dos_time_to_system(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let utc = Utc.from_utc_datetime(&naive);
    Some(SystemTime::from(utc))
}

/// Zip member names always use forward slashes.
fn member_name(member: &Path) -> String {
    member.to_string_lossy().replace('\\', "/")
}

//! ZIP archive writer.
//!
//! Walks the source tree in file-name order (symlinks are recorded, never
//! followed) and streams every entry into a sibling temporary file, which is
//! renamed over the destination only once the archive is complete.

use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use stager_core::{
    application::{ApplicationError, ports::ArchiveWriter, ports::output::ArchiveReport},
    domain::{ArchiveSettings, Compression},
    error::{StagerError, StagerResult},
};

/// Writes staging trees as ZIP archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveWriter for ZipArchiver {
    #[instrument(skip_all, fields(source = %source.display(), archive = %archive.display()))]
    fn write(
        &self,
        source: &Path,
        archive: &Path,
        settings: &ArchiveSettings,
    ) -> StagerResult<ArchiveReport> {
        // The root is classified through links, like the projector's
        // `is_dir`; entries beneath it are never followed.
        let source_meta = match fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ApplicationError::SourceNotFound {
                    path: source.to_path_buf(),
                }
                .into());
            }
            Err(e) => {
                return Err(ApplicationError::Filesystem {
                    path: source.to_path_buf(),
                    reason: format!("Failed to read metadata: {e}"),
                }
                .into());
            }
        };

        let root = if source_meta.is_dir() {
            fs::canonicalize(source).map_err(|e| ApplicationError::Filesystem {
                path: source.to_path_buf(),
                reason: format!("Failed to resolve source: {e}"),
            })?
        } else {
            source.to_path_buf()
        };

        let temp = prepare_destination(&root, &source_meta, archive)?;
        let written = if source_meta.is_dir() {
            write_tree(&temp, archive, &root, settings)
        } else {
            write_single(&temp, archive, source, &source_meta, settings)
        };

        let entries = match written {
            Ok(entries) => entries,
            Err(e) => {
                discard(&temp);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp, archive) {
            discard(&temp);
            return Err(creation_error(archive, format!("Failed to move archive into place: {e}")));
        }

        debug!(entries, "Archive complete");
        Ok(ArchiveReport {
            path: archive.to_path_buf(),
            entries,
        })
    }
}

/// Check the destination and pick the temporary file beside it.
///
/// `source` is already canonical when it is a directory.
fn prepare_destination(source: &Path, source_meta: &Metadata, archive: &Path) -> StagerResult<PathBuf> {
    if archive.is_dir() {
        return Err(creation_error(archive, "Destination is a directory"));
    }

    let file_name = archive
        .file_name()
        .ok_or_else(|| creation_error(archive, "Destination has no file name"))?;
    let parent = match archive.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(creation_error(
            archive,
            format!("Parent directory does not exist: {}", parent.display()),
        ));
    }
    if source_meta.is_dir() {
        let resolved = fs::canonicalize(parent)
            .map_err(|e| creation_error(archive, format!("Failed to resolve destination: {e}")))?
            .join(file_name);
        if resolved.starts_with(source) {
            return Err(creation_error(
                archive,
                "Archive must not be written inside the directory being archived",
            ));
        }
    }

    Ok(parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    )))
}

fn write_tree(
    temp: &Path,
    archive: &Path,
    source: &Path,
    settings: &ArchiveSettings,
) -> StagerResult<usize> {
    let mut zip = open(temp, archive)?;
    let mut entries = 0;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for item in walker {
        let item = item.map_err(|e| creation_error(archive, format!("Failed to walk source: {e}")))?;
        let path = item.path();
        let name = record_name(source, path);
        let metadata = item
            .metadata()
            .map_err(|e| creation_error(archive, format!("Failed to read {}: {e}", path.display())))?;

        add_entry(&mut zip, archive, path, &name, &metadata, settings)?;
        entries += 1;
    }

    finish(zip, archive)?;
    Ok(entries)
}

fn write_single(
    temp: &Path,
    archive: &Path,
    source: &Path,
    metadata: &Metadata,
    settings: &ArchiveSettings,
) -> StagerResult<usize> {
    warn!(path = %source.display(), "Archive source is not a directory, writing a single entry");
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| creation_error(archive, "Source has no file name"))?;

    let mut zip = open(temp, archive)?;
    add_entry(&mut zip, archive, source, &name, metadata, settings)?;
    finish(zip, archive)?;
    Ok(1)
}

fn add_entry(
    zip: &mut ZipWriter<File>,
    archive: &Path,
    path: &Path,
    name: &str,
    metadata: &Metadata,
    settings: &ArchiveSettings,
) -> StagerResult<()> {
    let options = entry_options(settings, metadata);
    let zip_error = |e: zip::result::ZipError| creation_error(archive, format!("Failed to add {name}: {e}"));
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let target = fs::read_link(path)
            .map_err(|e| creation_error(archive, format!("Failed to read link {}: {e}", path.display())))?;
        zip.add_symlink(name.to_string(), target.to_string_lossy().into_owned(), options)
            .map_err(zip_error)?;
    } else if file_type.is_dir() {
        zip.add_directory(format!("{name}/"), options).map_err(zip_error)?;
    } else {
        zip.start_file(name.to_string(), options).map_err(zip_error)?;
        let mut input = File::open(path)
            .map_err(|e| creation_error(archive, format!("Failed to open {}: {e}", path.display())))?;
        io::copy(&mut input, zip)
            .map_err(|e| creation_error(archive, format!("Failed to write {name}: {e}")))?;
    }
    Ok(())
}

fn open(temp: &Path, archive: &Path) -> StagerResult<ZipWriter<File>> {
    let file = File::create(temp)
        .map_err(|e| creation_error(archive, format!("Failed to create archive file: {e}")))?;
    Ok(ZipWriter::new(file))
}

fn finish(zip: ZipWriter<File>, archive: &Path) -> StagerResult<()> {
    zip.finish()
        .map(drop)
        .map_err(|e| creation_error(archive, format!("Failed to finalize archive: {e}")))
}

/// Compression plus the entry's own timestamp and permission bits.
fn entry_options(settings: &ArchiveSettings, metadata: &Metadata) -> SimpleFileOptions {
    let mut options = match settings.compression {
        Compression::Stored => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        Compression::Deflated => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(settings.level))),
    };
    if let Some(time) = zip_time(metadata.modified().ok()) {
        options = options.last_modified_time(time);
    }
    if let Some(mode) = unix_mode(metadata) {
        options = options.unix_permissions(mode);
    }
    options
}

/// ZIP timestamps are local-less calendar values; record them in UTC.
fn zip_time(modified: Option<SystemTime>) -> Option<zip::DateTime> {
    let utc: DateTime<Utc> = modified?.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(utc.year()).ok()?,
        utc.month() as u8,
        utc.day() as u8,
        utc.hour() as u8,
        utc.minute() as u8,
        utc.second() as u8,
    )
    .ok()
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

/// `/`-joined path of `path` below `root`.
fn record_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(error = %e, path = %temp.display(), "Failed to remove temporary archive");
        }
    }
}

fn creation_error(archive: &Path, reason: impl Into<String>) -> StagerError {
    ApplicationError::ArchiveCreation {
        path: archive.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

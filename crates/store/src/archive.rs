//! Firmware archive creation

use crate::work_area::{StagedEntry, WorkArea};
use nxfw_errors::{Error, StorageError};
use nxfw_hash::{Hash, HashAlgorithm};
use nxfw_types::TitleVersion;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Extension of the checksum sidecar
pub const CHECKSUM_SUFFIX: &str = "md5sum";

const PART_SUFFIX: &str = "part";

const COPY_CHUNK: usize = 1024 * 1024;

/// Where an archive ended up and what it contains
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutput {
    pub archive_path: PathBuf,
    pub sidecar_path: PathBuf,
    /// Lowercase MD5 hex of the archive
    pub checksum: String,
    pub entries: usize,
    pub size: u64,
}

/// Final file name of the archive for a firmware version
#[must_use]
pub fn archive_name(version: TitleVersion) -> String {
    format!(
        "Firmware {}.{}.{}.zip",
        version.major(),
        version.minor(),
        version.patch()
    )
}

/// Pack every staged blob into `destination_dir` and write its checksum
///
/// The archive is stored uncompressed, entries are sorted by name and carry
/// a fixed timestamp, so identical staged sets give identical bytes. Both
/// files are written under `.part` names and renamed together once complete.
///
/// Dropping the returned future before it resolves leaves nothing in
/// `destination_dir`: the blocking writer stops at its next chunk and
/// removes its partial files, and a pair it already published is removed
/// again.
///
/// # Errors
///
/// Returns `StorageError::DirectoryNotFound` if the destination does not
/// exist and `StorageError::ArchiveFailed` if writing the archive fails.
pub async fn create_archive(
    work_area: &WorkArea,
    version: TitleVersion,
    destination_dir: &Path,
) -> Result<ArchiveOutput, Error> {
    if !tokio::fs::metadata(destination_dir)
        .await
        .is_ok_and(|m| m.is_dir())
    {
        return Err(StorageError::DirectoryNotFound {
            path: destination_dir.to_path_buf(),
        }
        .into());
    }

    let paths = ArchivePaths::new(destination_dir, &archive_name(version));
    let entries = work_area.entries().await?;
    let entry_count = entries.len();

    let guard = PublishGuard::new(paths.clone());
    let state = guard.state();
    let source_dir = work_area.path().to_path_buf();
    let job_paths = paths.clone();
    let (checksum, size) = tokio::task::spawn_blocking(move || {
        write_archive(&source_dir, &entries, &job_paths, &state)
    })
    .await
    .map_err(|e| {
        paths.remove_parts();
        Error::internal(format!("archive task failed: {e}"))
    })??;
    guard.commit();

    tracing::debug!(
        archive = %paths.archive.display(),
        entries = entry_count,
        size,
        "archive written"
    );

    Ok(ArchiveOutput {
        archive_path: paths.archive,
        sidecar_path: paths.sidecar,
        checksum,
        entries: entry_count,
        size,
    })
}

/// Final and in-progress locations of the archive and its sidecar
#[derive(Debug, Clone)]
struct ArchivePaths {
    name: String,
    archive: PathBuf,
    archive_part: PathBuf,
    sidecar: PathBuf,
    sidecar_part: PathBuf,
}

impl ArchivePaths {
    fn new(destination_dir: &Path, name: &str) -> Self {
        let sidecar_name = format!("{name}.{CHECKSUM_SUFFIX}");
        Self {
            name: name.to_string(),
            archive: destination_dir.join(name),
            archive_part: destination_dir.join(format!("{name}.{PART_SUFFIX}")),
            sidecar_part: destination_dir.join(format!("{sidecar_name}.{PART_SUFFIX}")),
            sidecar: destination_dir.join(sidecar_name),
        }
    }

    fn remove_parts(&self) {
        let _ = fs::remove_file(&self.archive_part);
        let _ = fs::remove_file(&self.sidecar_part);
    }

    fn remove_published(&self) {
        let _ = fs::remove_file(&self.archive);
        let _ = fs::remove_file(&self.sidecar);
    }
}

/// Progress of the blocking writer as seen by the awaiting side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishState {
    Writing,
    /// The awaiting side went away; the writer must not publish
    Abandoned,
    /// Both files are at their final paths
    Published,
}

type SharedState = Arc<Mutex<PublishState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, PublishState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the destination files until the archive step hands them to the
/// caller
struct PublishGuard {
    paths: ArchivePaths,
    state: SharedState,
    committed: bool,
}

impl PublishGuard {
    fn new(paths: ArchivePaths) -> Self {
        Self {
            paths,
            state: Arc::new(Mutex::new(PublishState::Writing)),
            committed: false,
        }
    }

    fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut state = lock(&self.state);
        match *state {
            // the writer cleans up its own part files once it sees this
            PublishState::Writing => *state = PublishState::Abandoned,
            PublishState::Published => {
                self.paths.remove_published();
                *state = PublishState::Abandoned;
            }
            PublishState::Abandoned => {}
        }
    }
}

fn abandoned(state: &SharedState) -> bool {
    *lock(state) == PublishState::Abandoned
}

/// Write, hash and publish the archive on a blocking thread
fn write_archive(
    source_dir: &Path,
    entries: &[StagedEntry],
    paths: &ArchivePaths,
    state: &SharedState,
) -> Result<(String, u64), Error> {
    let result = write_and_publish(source_dir, entries, paths, state);
    if result.is_err() {
        paths.remove_parts();
    }
    result
}

fn write_and_publish(
    source_dir: &Path,
    entries: &[StagedEntry],
    paths: &ArchivePaths,
    state: &SharedState,
) -> Result<(String, u64), Error> {
    let archive_failed = |message: String| StorageError::ArchiveFailed {
        path: paths.archive.display().to_string(),
        message,
    };

    write_zip(source_dir, entries, &paths.archive_part, state)
        .map_err(|e| archive_failed(e.to_string()))?;

    let checksum = Hash::hash_file(HashAlgorithm::Md5, &paths.archive_part)?.to_hex();
    let size = fs::metadata(&paths.archive_part)
        .map_err(|e| StorageError::from_io_with_path(&e, &paths.archive_part))?
        .len();
    fs::write(&paths.sidecar_part, format!("{checksum}  {}", paths.name))
        .map_err(|e| StorageError::from_io_with_path(&e, &paths.sidecar_part))?;

    // the awaiting side cannot abandon the step while both renames happen
    let mut current = lock(state);
    if *current == PublishState::Abandoned {
        return Err(archive_failed("archive step cancelled".to_string()).into());
    }
    fs::rename(&paths.archive_part, &paths.archive)
        .map_err(|e| StorageError::from_io_with_path(&e, &paths.archive))?;
    if let Err(e) = fs::rename(&paths.sidecar_part, &paths.sidecar) {
        let _ = fs::remove_file(&paths.archive);
        return Err(StorageError::from_io_with_path(&e, &paths.sidecar).into());
    }
    *current = PublishState::Published;

    Ok((checksum, size))
}

fn write_zip(
    source_dir: &Path,
    entries: &[StagedEntry],
    part_path: &Path,
    state: &SharedState,
) -> io::Result<()> {
    let file = File::create(part_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let mut chunk = vec![0; COPY_CHUNK];

    for entry in entries {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
            .large_file(entry.size >= u64::from(u32::MAX));

        writer
            .start_file(entry.name.as_str(), options)
            .map_err(io::Error::other)?;
        let mut source = File::open(source_dir.join(&entry.name))?;
        loop {
            if abandoned(state) {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "archive step cancelled",
                ));
            }
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            writer.write_all(&chunk[..n])?;
        }
    }

    let mut buffered = writer.finish().map_err(io::Error::other)?;
    buffered.flush()?;
    buffered.get_ref().sync_all()?;
    Ok(())
}

//! Flat on-disk store for accepted uploads.
//!
//! Stored names are the only access control the service has: retrieval is unauthenticated, so a
//! file is reachable only by whoever was handed its randomly generated name. Every path that
//! reaches the filesystem on behalf of a caller goes through [`UploadStore::resolve`] first.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::server::constants::{PGP_ARMOR_MARKER, STORED_NAME_LENGTH, TEMP_UPLOAD_SUFFIX};
use crate::server::utils::generate_random_name;

/// A file that lives directly under the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name relative to the storage root.
    pub name: String,
    /// Absolute location, always a descendant of the storage root.
    pub location: PathBuf,
    pub size_bytes: u64,
}

/// A caller-supplied name that passed containment validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub absolute: PathBuf,
    pub relative: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is not PGP encrypted")]
    NotArmored,
    #[error("file exceeds the upload limit of {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("malformed multipart data: {0}")]
    Multipart(#[from] MultipartError),
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("no file specified")]
    Empty,
    #[error("path escapes the storage root")]
    Escapes,
}

/// Source of upload body chunks, read until it yields `None`.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, UploadError>> + Send;
}

pub struct UploadStore {
    root: PathBuf,
    max_upload_bytes: u64,
}

impl UploadStore {
    /// Build a store rooted at `root`, made absolute against the current directory.
    ///
    /// The directory itself is not created until the first accepted upload.
    pub fn new(root: &Path, max_upload_bytes: u64) -> std::io::Result<Self> {
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Self {
            root: normalize_lexically(&absolute),
            max_upload_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Validate an upload's armor marker and stream it to a freshly named file.
    ///
    /// Nothing touches the disk until the marker has been matched. Content is written to a
    /// temporary sibling and renamed into place only once the whole stream has been copied, so
    /// a failed upload never leaves a file under its final name.
    pub async fn persist<C>(
        &self,
        declared_filename: Option<&str>,
        source: &mut C,
    ) -> Result<StoredFile, UploadError>
    where
        C: ChunkSource + Send,
    {
        let mut prefix = Vec::with_capacity(PGP_ARMOR_MARKER.len());
        let mut remainder: Option<Bytes> = None;

        while prefix.len() < PGP_ARMOR_MARKER.len() {
            let Some(chunk) = source.next_chunk().await? else {
                break;
            };
            let take = (PGP_ARMOR_MARKER.len() - prefix.len()).min(chunk.len());
            prefix.extend_from_slice(&chunk[..take]);
            if take < chunk.len() {
                remainder = Some(chunk.slice(take..));
            }
        }

        if !has_armor_marker(&prefix) {
            return Err(UploadError::NotArmored);
        }

        let name = stored_name_for(declared_filename);
        fs::create_dir_all(&self.root).await?;

        let final_path = self.root.join(&name);
        let temp_path = self.root.join(format!("{name}{TEMP_UPLOAD_SUFFIX}"));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;

        let copied = self
            .copy_stream(&mut file, &prefix, remainder, source)
            .await;
        let size_bytes = match copied {
            Ok(size) => size,
            Err(err) => {
                drop(file);
                discard_temp_file(&temp_path).await;
                return Err(err);
            }
        };
        drop(file);

        if let Err(err) = fs::rename(&temp_path, &final_path).await {
            discard_temp_file(&temp_path).await;
            return Err(UploadError::Io(err));
        }

        Ok(StoredFile {
            name,
            location: final_path,
            size_bytes,
        })
    }

    async fn copy_stream<C>(
        &self,
        file: &mut fs::File,
        prefix: &[u8],
        remainder: Option<Bytes>,
        source: &mut C,
    ) -> Result<u64, UploadError>
    where
        C: ChunkSource + Send,
    {
        let mut written: u64 = 0;

        self.write_counted(file, prefix, &mut written).await?;
        if let Some(chunk) = remainder {
            self.write_counted(file, &chunk, &mut written).await?;
        }

        while let Some(chunk) = source.next_chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            self.write_counted(file, &chunk, &mut written).await?;
        }

        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }

    async fn write_counted(
        &self,
        file: &mut fs::File,
        chunk: &[u8],
        written: &mut u64,
    ) -> Result<(), UploadError> {
        *written = written.saturating_add(chunk.len() as u64);
        if *written > self.max_upload_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }

        file.write_all(chunk).await?;
        Ok(())
    }

    /// Resolve a requested name against the storage root.
    ///
    /// `.` and `..` segments are collapsed lexically before the containment check, and the
    /// result must sit strictly below the root. Symlinks are not resolved before the check, so a
    /// link placed inside the root by someone with filesystem access is still followed.
    pub fn resolve(&self, requested: &str) -> Result<ResolvedPath, PathError> {
        let mut absolute = self.root.clone();
        let mut saw_segment = false;

        for segment in requested.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    absolute.pop();
                }
                other => absolute.push(other),
            }
            saw_segment = true;
        }

        if !saw_segment {
            return Err(PathError::Empty);
        }

        if absolute == self.root || !absolute.starts_with(&self.root) {
            return Err(PathError::Escapes);
        }

        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| PathError::Escapes)?
            .to_string_lossy()
            .into_owned();

        Ok(ResolvedPath { absolute, relative })
    }

    /// Look up a resolved path, returning `None` when no regular file exists there.
    pub async fn stat(&self, resolved: &ResolvedPath) -> Option<StoredFile> {
        match fs::metadata(&resolved.absolute).await {
            Ok(metadata) if metadata.is_file() => Some(StoredFile {
                name: resolved.relative.clone(),
                location: resolved.absolute.clone(),
                size_bytes: metadata.len(),
            }),
            Ok(_) => {
                debug!(target: "download", name = %resolved.relative, "requested path is not a regular file");
                None
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(
                    target: "download",
                    %err,
                    path = %resolved.absolute.display(),
                    "failed to inspect requested file"
                );
                None
            }
        }
    }
}

/// True when `content` begins with the OpenPGP armored-message marker.
///
/// This is a format gate only; armor structure and checksums are never inspected.
pub fn has_armor_marker(content: &[u8]) -> bool {
    content.starts_with(PGP_ARMOR_MARKER)
}

/// Generated stored name: random identifier followed by the declared extension.
pub fn stored_name_for(declared_filename: Option<&str>) -> String {
    let extension = declared_filename
        .map(declared_extension)
        .unwrap_or_default();
    format!("{}{}", generate_random_name(STORED_NAME_LENGTH), extension)
}

/// Lower-cased suffix of the final path element, starting at its last `.`.
///
/// The rest of the client-supplied name is discarded.
pub fn declared_extension(filename: &str) -> String {
    let base = filename.rsplit('/').next().unwrap_or_default();
    match base.rfind('.') {
        Some(index) => base[index..].to_lowercase(),
        None => String::new(),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

async fn discard_temp_file(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != ErrorKind::NotFound {
            warn!(
                target: "upload",
                path = %path.display(),
                %err,
                "failed to remove incomplete upload"
            );
        }
    }
}

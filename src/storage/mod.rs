use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageFormat;
use thiserror::Error;

use crate::render::Raster;

const BACKING_SUFFIX: &str = "_backing";
const PNG_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no save path configured")]
    MissingSavePath,
    #[error("unsupported output format for {path}; only .png is written")]
    UnsupportedFormat { path: PathBuf },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Where saved artwork goes: a file, or a directory that receives a
/// timestamp-named file per save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    File(PathBuf),
    Directory(PathBuf),
}

impl SaveTarget {
    pub fn new(path: PathBuf, is_dir: bool) -> Self {
        if is_dir {
            Self::Directory(path)
        } else {
            Self::File(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOutput {
    pub artwork: PathBuf,
    pub backing: Option<PathBuf>,
}

/// Writes saved artwork as PNG.
#[derive(Debug, Clone)]
pub struct OutputStorage {
    target: SaveTarget,
}

impl OutputStorage {
    pub const fn new(target: SaveTarget) -> Self {
        Self { target }
    }

    pub fn from_params(save_path: Option<&Path>, is_dir: bool) -> StorageResult<Self> {
        let path = save_path.ok_or(StorageError::MissingSavePath)?;
        let target = SaveTarget::new(path.to_path_buf(), is_dir);
        if let SaveTarget::File(path) = &target {
            ensure_png(path)?;
        }
        Ok(Self::new(target))
    }

    pub fn target(&self) -> &SaveTarget {
        &self.target
    }

    /// Path the next artwork is written to. Directory targets never reuse
    /// an existing file name.
    pub fn allocate_target_path(&self) -> StorageResult<PathBuf> {
        match &self.target {
            SaveTarget::File(path) => {
                ensure_png(path)?;
                Ok(path.clone())
            }
            SaveTarget::Directory(dir) => Ok(unused_name(dir, timestamp_millis())),
        }
    }

    /// Writes `artwork`, and `backing` next to it with a `_backing` suffix.
    pub fn save(&self, artwork: &Raster, backing: Option<&Raster>) -> StorageResult<SavedOutput> {
        let artwork_path = self.allocate_target_path()?;
        write_png(artwork, &artwork_path)?;

        let backing_path = match backing {
            Some(backing) => {
                let path = backing_path_for(&artwork_path);
                write_png(backing, &path)?;
                Some(path)
            }
            None => None,
        };

        tracing::info!(
            path = %artwork_path.display(),
            backing = backing_path.is_some(),
            "saved graffiti output"
        );
        Ok(SavedOutput {
            artwork: artwork_path,
            backing: backing_path,
        })
    }
}

fn ensure_png(path: &Path) -> StorageResult<()> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PNG_EXTENSION));
    if is_png {
        Ok(())
    } else {
        Err(StorageError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

fn unused_name(dir: &Path, stamp: u128) -> PathBuf {
    let first = dir.join(format!("{stamp}.{PNG_EXTENSION}"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stamp}-{n}.{PNG_EXTENSION}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

fn write_png(raster: &Raster, path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    raster
        .to_rgba_image()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| StorageError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

fn backing_path_for(artwork: &Path) -> PathBuf {
    let stem = artwork
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("graffiti");
    artwork.with_file_name(format!("{stem}{BACKING_SUFFIX}.{PNG_EXTENSION}"))
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

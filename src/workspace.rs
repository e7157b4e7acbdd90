//! Per-run output workspace and bundle packaging.
//!
//! Every run writes into its own directory `<output root>/<run id>`, so
//! concurrent runs never race on the same files. The directory is cleared
//! and recreated when the run starts.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name the bundle is offered under.
pub const BUNDLE_FILENAME: &str = "generated_docs.zip";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list output directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read artifact {path}: {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build bundle: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write bundle: {0}")]
    ArchiveIo(#[source] std::io::Error),
    #[error("failed to remove output directory {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The isolated output location of one run.
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    run_id: Uuid,
    dir: PathBuf,
}

impl RunWorkspace {
    /// Creates a fresh workspace for a new run under `root`.
    pub fn create(root: &Path) -> Result<Self, WorkspaceError> {
        Self::with_id(root, Uuid::new_v4())
    }

    /// Clears and recreates `<root>/<run_id>`; earlier contents are lost.
    pub fn with_id(root: &Path, run_id: Uuid) -> Result<Self, WorkspaceError> {
        let dir = root.join(run_id.to_string());
        let prepare_error = |source| WorkspaceError::Prepare {
            path: dir.clone(),
            source,
        };

        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(prepare_error)?;
        }
        fs::create_dir_all(&dir).map_err(prepare_error)?;

        log::debug!("Prepared run workspace {}", dir.display());
        Ok(Self { run_id, dir })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.dir.join(sanitize_filename::sanitize(filename))
    }

    pub fn write_artifact(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.artifact_path(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Every file currently in the workspace, sorted by name.
    pub fn artifacts(&self) -> Result<Vec<PathBuf>, WorkspaceError> {
        let list_error = |source| WorkspaceError::List {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(list_error)? {
            let entry = entry.map_err(list_error)?;
            if entry.file_type().map_err(list_error)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Packs every artifact into one Deflate ZIP, flat by file name.
    pub fn bundle(&self) -> Result<Vec<u8>, WorkspaceError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in self.artifacts()? {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let bytes = fs::read(&path).map_err(|source| WorkspaceError::ReadArtifact {
                path: path.clone(),
                source,
            })?;

            writer.start_file(name, options)?;
            writer.write_all(&bytes).map_err(WorkspaceError::ArchiveIo)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Removes the workspace directory and everything in it.
    pub fn remove(self) -> Result<(), WorkspaceError> {
        fs::remove_dir_all(&self.dir).map_err(|source| WorkspaceError::Cleanup {
            path: self.dir.clone(),
            source,
        })
    }
}

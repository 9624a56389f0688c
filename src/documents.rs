use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Documents are identified by their path.
pub type DocumentId = PathBuf;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::Read { path, .. } | DocumentError::Write { path, .. } => path,
        }
    }
}

/// Whole-file document access. The pipeline reads documents through this
/// boundary during ingest and the rewriter writes corrected content back
/// through it; nothing else touches document storage.
pub trait DocumentStore: Send + Sync {
    fn read_all(&self, id: &DocumentId) -> Result<String, DocumentError>;
    fn write_all(&self, id: &DocumentId, text: &str) -> Result<(), DocumentError>;
}

/// Document store backed by the local filesystem.
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read_all(&self, id: &DocumentId) -> Result<String, DocumentError> {
        fs::read_to_string(id).map_err(|source| DocumentError::Read {
            path: id.clone(),
            source,
        })
    }

    fn write_all(&self, id: &DocumentId, text: &str) -> Result<(), DocumentError> {
        fs::write(id, text).map_err(|source| DocumentError::Write {
            path: id.clone(),
            source,
        })
    }
}

/// Expand the selected paths into a flat, ordered document list.
///
/// Files are taken as given; directories are walked recursively in file-name
/// order so a selection always expands the same way.
pub fn collect_documents(paths: &[PathBuf]) -> Vec<DocumentId> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if entry.file_type().is_file() {
                    documents.push(entry.into_path());
                }
            }
        } else {
            documents.push(path.clone());
        }
    }

    documents
}

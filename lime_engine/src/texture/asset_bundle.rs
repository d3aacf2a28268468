/// Asset bundles: byte streams addressed by logical path

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::engine_err;

/// Source of asset streams
pub trait AssetBundle: Send + Sync {
    fn file_exists(&self, path: &str) -> bool;

    /// Open `path` for reading
    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

/// Bundle backed by a directory on disk
///
/// Logical paths use `/` separators and are resolved below the root.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |resolved, part| resolved.join(part))
    }
}

impl AssetBundle for DirectoryBundle {
    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let resolved = self.resolve(path);
        let file = File::open(&resolved).map_err(|error| {
            engine_err!(InvalidResource, "lime::DirectoryBundle",
                "Cannot open '{}': {}", resolved.display(), error)
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

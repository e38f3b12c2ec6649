use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Named blob storage organised in folders
pub trait FileStore {
    /// Store `data` under `folder/name`, replacing any existing blob
    fn put(&self, folder: &str, name: &str, data: &[u8]) -> Result<PathBuf>;

    fn get(&self, folder: &str, name: &str) -> Result<Vec<u8>>;

    /// File names in `folder`. The order returned is the discovery order
    /// used for the whole run.
    fn list(&self, folder: &str) -> Result<Vec<String>>;
}

/// File store rooted at a local directory. An empty folder name is the
/// root itself.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn folder_path(&self, folder: &str) -> PathBuf {
        if folder.is_empty() {
            self.root.clone()
        } else {
            self.root.join(folder)
        }
    }
}

impl FileStore for DirectoryStore {
    fn put(&self, folder: &str, name: &str, data: &[u8]) -> Result<PathBuf> {
        let dir = self.folder_path(folder);
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, data)?;
        Ok(path)
    }

    fn get(&self, folder: &str, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.folder_path(folder).join(name))?)
    }

    fn list(&self, folder: &str) -> Result<Vec<String>> {
        let dir = self.folder_path(folder);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        // read_dir order is platform dependent; sort so reruns agree.
        names.sort();
        Ok(names)
    }
}

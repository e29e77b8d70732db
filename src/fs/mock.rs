use super::{DirEntry, FileMetadata, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system keyed on a BTreeMap so that directory listings
/// come back in name order, matching the real provider.
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(BTreeMap::new()),
            root: root.clone(),
        };
        fs.files.write().unwrap().insert(
            root,
            MockEntry {
                content: None,
                file_type: FileType::Directory,
            },
        );
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        Self::ensure_parents(&mut files, &path);

        files.insert(
            path,
            MockEntry {
                content: None,
                file_type: FileType::Directory,
            },
        );
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if !files.contains_key(&current) {
                files.insert(
                    current.clone(),
                    MockEntry {
                        content: None,
                        file_type: FileType::Directory,
                    },
                );
            }
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))?;

        Ok(FileMetadata {
            size: entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
            file_type: entry.file_type,
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let content = self.read_to_string(path)?;
        let bytes = content.as_bytes();
        Ok(bytes[..bytes.len().min(max_bytes)].to_vec())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();

        if !files.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let mut entries = Vec::new();
        for (file_path, entry) in files.iter() {
            if let Some(parent) = file_path.parent() {
                if parent == path && file_path != &path {
                    let name = file_path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("")
                        .to_string();

                    entries.push(DirEntry {
                        path: file_path.clone(),
                        name,
                        file_type: entry.file_type,
                        size: entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
                    });
                }
            }
        }

        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let normalized = self.normalize_path(path);
        if self.files.read().unwrap().contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(anyhow!("Path not found: {:?}", path))
        }
    }
}

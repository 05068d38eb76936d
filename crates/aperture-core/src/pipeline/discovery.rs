//! File discovery for finding uploadable images in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::validate::Validator;

/// Discovers image files the validator would accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDiscovery;

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl DiscoveredFile {
    /// Filename as the uploader would declare it.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// Discover files at a path.
    ///
    /// A file path is returned as-is, whatever its extension, so the pipeline
    /// can report why it is rejected. Directories are walked recursively and
    /// only files with accepted extensions are kept.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return match std::fs::metadata(path) {
                Ok(meta) => vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }],
                Err(e) => {
                    tracing::warn!("Cannot stat {:?}: {}", path, e);
                    vec![]
                }
            };
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && Self::is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn is_supported(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(Validator::is_allowed)
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(FileDiscovery::is_supported(Path::new("test.jpg")));
        assert!(FileDiscovery::is_supported(Path::new("test.JPG")));
        assert!(FileDiscovery::is_supported(Path::new("test.jpeg")));
        assert!(FileDiscovery::is_supported(Path::new("test.png")));
        assert!(!FileDiscovery::is_supported(Path::new("test.webp")));
        assert!(!FileDiscovery::is_supported(Path::new("test.txt")));
    }

    #[test]
    fn test_discover_directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"12").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpeg"), b"123").unwrap();

        let files = FileDiscovery::new().discover(dir.path());
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
        assert_eq!(FileDiscovery::total_size(&files), 6);
    }

    #[test]
    fn test_discover_single_file_keeps_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let files = FileDiscovery::new().discover(&path);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "photo.gif");
    }
}

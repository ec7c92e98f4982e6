//! Source tree fixtures

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `files` (relative path -> content) below `root`
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// A temporary source tree with the given files
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);
    dir
}

/// All regular files below `root`, relative and sorted
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

/// A package source directory with a descriptor and a gcc build
pub fn package_fixture(descriptor: &str) -> TempDir {
    source_tree(&[
        ("live.package.json", descriptor),
        ("lib/include/qmat.h", "class QMat;"),
        ("build/gcc_64/bin/livecv", "binary"),
        ("build/gcc_64/plugins/lcvcore/qmldir", "module lcvcore"),
        ("build/gcc_64/plugins/lcvcore/.gitignore", "*"),
        ("build/gcc_64/plugins/lcvcore/liblcvcore.so", "library"),
        ("samples/basic/hello.qml", "Item {}"),
    ])
}

//! Package archive and registry response fixtures

use serde_json::{json, Value};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a zip archive in memory
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A package archive holding a `qmldir` naming the module
pub fn package_archive(name: &str) -> Vec<u8> {
    zip_bytes(&[("qmldir", &format!("module {}", name))])
}

/// Registry response for a package
pub fn metadata(url: &str, version: &str, dependencies: Vec<Value>) -> Value {
    json!({ "url": url, "version": version, "dependencies": dependencies })
}

/// A dependency node of a registry response
pub fn dependency(name: &str, version: &str, url: &str, dependencies: Vec<Value>) -> Value {
    json!({
        "version": version,
        "package": { "name": name },
        "url": url,
        "dependencies": dependencies
    })
}

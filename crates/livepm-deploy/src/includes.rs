//! Forwarding header generation
//!
//! Class-style headers (`QMat`) are emitted next to the real headers so that
//! consumers can write `#include <QMat>`.

use livepm_core::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Content of a header forwarding to `file`
pub fn forwarding_header(file: &str) -> String {
    format!("#include \"{}\"\n", file)
}

/// Write one forwarding header per entry of `headers` (generated name ->
/// included file) into `location`, returning the written paths
pub fn generate_includes(location: &Path, headers: &BTreeMap<String, String>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(location)?;

    let mut written = Vec::with_capacity(headers.len());
    for (generated, file) in headers {
        let path = location.join(generated);
        fs::write(&path, forwarding_header(file))?;
        info!("Generated: {} <-- {}", generated, file);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_forwarding_header() {
        assert_eq!(forwarding_header("qmat.h"), "#include \"qmat.h\"\n");
    }

    #[test]
    fn test_generate_includes() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("api/include");

        let mut headers = BTreeMap::new();
        headers.insert("QMat".to_string(), "qmat.h".to_string());
        headers.insert("QMatNode".to_string(), "qmatnode.h".to_string());

        let written = generate_includes(&location, &headers).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(location.join("QMatNode")).unwrap(),
            "#include \"qmatnode.h\"\n"
        );
    }
}

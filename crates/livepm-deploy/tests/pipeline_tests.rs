//! End-to-end deploy pipeline tests

mod common;

use common::*;
use flate2::read::GzDecoder;
use livepm_core::{Error, PlatformKind};
use livepm_deploy::{DeployOptions, DeployPipeline};
use std::collections::BTreeMap;
use std::fs::{self, File};

const DESCRIPTOR: &str = r#"{
    "name": "live.cv",
    "version": "1.4.0",
    "components": { "lcvcore": "Core image types" },
    "releases": {
        "gcc_64": {
            "compiler": "gcc_64",
            "environment": { "QTDIR": "Qt install directory" },
            "deploy": [
                {
                    "type": "copy",
                    "structure": {
                        "{release}/bin/livecv": "-",
                        "{release}/plugins": { "lcvcore": "plugins/-" },
                        "{source}/lib/include": { "qmat.h": "api/include/-" },
                        "{source}/samples": "-",
                        "{qtbuild}/lib": { "libQt5Core.so*": "-" }
                    }
                },
                { "type": "includes", "location": "api/include", "headers": { "QMat": "qmat.h" } }
            ]
        }
    }
}"#;

fn options(source: &std::path::Path) -> DeployOptions {
    let mut options = DeployOptions::new(source, "gcc_64");
    options.platform = PlatformKind::Unix;
    options.environment = BTreeMap::from([(
        "QTDIR".to_string(),
        source.join("qt/gcc").display().to_string(),
    )]);
    options
}

#[test]
fn test_deploy_builds_and_archives_bundle() {
    let source = package_fixture(DESCRIPTOR);

    let pipeline = DeployPipeline::load(options(source.path())).unwrap();
    let outcome = pipeline.run().unwrap();

    let root = source.path().join("build/live.cv-1.4.0-gcc_64/live-cv");
    assert_eq!(outcome.layout.deploy_root, root);
    assert!(root.join("livecv").is_file());
    assert!(root.join("plugins/lcvcore/qmldir").is_file());
    assert!(!root.join("plugins/lcvcore/.gitignore").exists());
    assert!(root.join("samples/basic/hello.qml").is_file());
    assert_eq!(
        fs::read_to_string(root.join("api/include/QMat")).unwrap(),
        "#include \"qmat.h\"\n"
    );
    assert_eq!(outcome.headers_generated, 1);
    assert_eq!(outcome.report.patterns_without_match, 1);

    let archive = source.path().join("build/live.cv-1.4.0-gcc_64.tar.gz");
    assert_eq!(outcome.archive.archive_path, archive);

    let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
    let names: Vec<String> = tar
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(names.contains(&"live-cv/livecv".to_string()));
    assert!(names.contains(&"live-cv/api/include/QMat".to_string()));
}

#[test]
fn test_redeploy_cleans_previous_bundle() {
    let source = package_fixture(DESCRIPTOR);
    let stale = source.path().join("build/live.cv-1.4.0-gcc_64/live-cv/stale.txt");
    write_files(source.path(), &[("build/live.cv-1.4.0-gcc_64/live-cv/stale.txt", "old")]);

    DeployPipeline::load(options(source.path()))
        .unwrap()
        .run()
        .unwrap();

    assert!(!stale.exists());
}

#[test]
fn test_custom_build_directory() {
    let source = package_fixture(DESCRIPTOR);
    let build = tempfile::TempDir::new().unwrap();
    write_files(build.path(), &[("gcc_64/bin/livecv", "other binary")]);
    write_files(build.path(), &[("gcc_64/plugins/lcvcore/qmldir", "module lcvcore")]);

    let mut options = options(source.path());
    options.build = Some(build.path().to_path_buf());

    let outcome = DeployPipeline::load(options).unwrap().run().unwrap();

    let root = build.path().join("live.cv-1.4.0-gcc_64/live-cv");
    assert_eq!(outcome.layout.deploy_root, root);
    assert_eq!(fs::read_to_string(root.join("livecv")).unwrap(), "other binary");
}

#[test]
fn test_unknown_preset_fails() {
    let descriptor = DESCRIPTOR.replace(
        r#""deploy": ["#,
        r#""deploy": [ { "type": "copy", "structure": "livecv-gcc" },"#,
    );
    let source = package_fixture(&descriptor);

    let err = DeployPipeline::load(options(source.path()))
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, Error::UnknownPreset { .. }));
}

#[test]
fn test_missing_descriptor() {
    let source = source_tree(&[("README.md", "no descriptor")]);
    let result = DeployPipeline::load(options(source.path()));
    assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
}

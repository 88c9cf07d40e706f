//! Archive writing and full assembly against the local filesystem.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use stager_adapters::{LocalFilesystem, PlanLoader, ZipArchiver};
use stager_core::{
    application::{ApplicationError, ArchiveService, AssemblyService, ports::ArchiveWriter},
    domain::{ArchiveSettings, EngineConfig, SourcePolicy},
    error::StagerError,
};
use tempfile::TempDir;

fn staging(temp: &TempDir) -> std::path::PathBuf {
    let root = temp.path().join("staging");
    fs::create_dir_all(root.join("ui/assets")).unwrap();
    fs::create_dir_all(root.join("META-INF")).unwrap();
    fs::write(root.join("ui/index.html"), "<html/>").unwrap();
    fs::write(root.join("ui/assets/app.js"), "console.log(1)").unwrap();
    fs::write(root.join("META-INF/manifest.yml"), "name: app").unwrap();
    root
}

/// `(name, content)` for every record, in archive order.
fn records(archive: &Path) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut bytes = Vec::new();
            if entry.is_file() {
                entry.read_to_end(&mut bytes).unwrap();
            }
            (entry.name().to_string(), bytes)
        })
        .collect()
}

fn service() -> ArchiveService {
    ArchiveService::new(
        Arc::new(LocalFilesystem::new()),
        Box::new(ZipArchiver::new()),
        &EngineConfig::default(),
    )
}

#[test]
fn archive_round_trips_file_set_and_bytes() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    let out = temp.path().join("app.zip");

    let report = service().archive(&root, &out).unwrap();

    assert_eq!(report.path, out);
    let files: Vec<(String, Vec<u8>)> = records(&out)
        .into_iter()
        .filter(|(name, _)| !name.ends_with('/'))
        .collect();
    assert_eq!(
        files,
        vec![
            ("META-INF/manifest.yml".to_string(), b"name: app".to_vec()),
            ("ui/assets/app.js".to_string(), b"console.log(1)".to_vec()),
            ("ui/index.html".to_string(), b"<html/>".to_vec()),
        ]
    );
}

#[test]
fn rearchiving_unchanged_tree_keeps_order() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    let first = temp.path().join("first.zip");
    let second = temp.path().join("second.zip");

    service().archive(&root, &first).unwrap();
    service().archive(&root, &second).unwrap();

    let names = |p: &Path| -> Vec<String> { records(p).into_iter().map(|(n, _)| n).collect() };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn existing_archive_is_replaced() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    let out = temp.path().join("app.zip");
    fs::write(&out, "not a zip").unwrap();

    service().archive(&root, &out).unwrap();

    assert!(zip::ZipArchive::new(File::open(&out).unwrap()).is_ok());
}

#[test]
fn missing_source_leaves_archive_untouched() {
    let temp = TempDir::new().unwrap();
    let absent = temp.path().join("absent.zip");
    let existing = temp.path().join("existing.zip");
    fs::write(&existing, "previous").unwrap();

    for out in [&absent, &existing] {
        let err = service().archive(temp.path().join("gone"), out).unwrap_err();
        assert!(matches!(
            err.root(),
            StagerError::Application(ApplicationError::SourceNotFound { .. })
        ));
    }

    assert!(!absent.exists());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous");
}

#[test]
fn file_source_becomes_single_entry() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("only.txt");
    fs::write(&file, "solo").unwrap();
    let out = temp.path().join("app.zip");

    let report = service().archive(&file, &out).unwrap();

    assert_eq!(report.entries, 1);
    assert_eq!(records(&out), vec![("only.txt".to_string(), b"solo".to_vec())]);
}

#[test]
fn strict_policy_rejects_file_source() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("only.txt");
    fs::write(&file, "solo").unwrap();
    let out = temp.path().join("app.zip");
    let config = EngineConfig {
        source_policy: SourcePolicy::Strict,
        ..EngineConfig::default()
    };

    let err = ArchiveService::new(
        Arc::new(LocalFilesystem::new()),
        Box::new(ZipArchiver::new()),
        &config,
    )
    .archive(&file, &out)
    .unwrap_err();

    assert!(matches!(
        err.root(),
        StagerError::Application(ApplicationError::SourceNotDirectory { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn directory_destination_is_archive_creation_error() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    let out = temp.path().join("taken");
    fs::create_dir_all(&out).unwrap();

    let err = ZipArchiver::new()
        .write(&root, &out, &ArchiveSettings::default())
        .unwrap_err();

    assert!(matches!(
        err,
        StagerError::Application(ApplicationError::ArchiveCreation { .. })
    ));
    assert!(out.is_dir());
}

#[test]
fn missing_parent_leaves_no_partial_archive() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    let out = temp.path().join("no/such/dir/app.zip");

    let err = service().archive(&root, &out).unwrap_err();

    assert!(matches!(
        err.root(),
        StagerError::Application(ApplicationError::ArchiveCreation { .. })
    ));
    assert!(!out.exists());
    assert!(!temp.path().join("no").exists());
}

#[cfg(unix)]
#[test]
fn symlinks_are_archived_as_links() {
    let temp = TempDir::new().unwrap();
    let root = staging(&temp);
    std::os::unix::fs::symlink("index.html", root.join("ui/home.html")).unwrap();
    let out = temp.path().join("app.zip");

    service().archive(&root, &out).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
    let mut link = zip.by_name("ui/home.html").unwrap();
    let mode = link.unix_mode().unwrap();
    assert_eq!(mode & 0o170000, 0o120000);
    let mut target = String::new();
    link.read_to_string(&mut target).unwrap();
    assert_eq!(target, "index.html");
}

#[test]
fn plan_assembles_modules_into_archive() {
    let temp = TempDir::new().unwrap();
    let ui = temp.path().join("ui/dist");
    let api = temp.path().join("api/build");
    fs::create_dir_all(ui.join("static")).unwrap();
    fs::create_dir_all(api.join("bin")).unwrap();
    fs::write(ui.join("index.html"), "<html/>").unwrap();
    fs::write(ui.join("static/app.css"), "body{}").unwrap();
    fs::write(api.join("bin/server"), "ELF").unwrap();
    fs::write(api.join("bin/debug.log"), "noise").unwrap();

    fs::write(
        temp.path().join("stager.toml"),
        r#"
staging = "target/staging"
archive = "target/app.zip"
cleanup = true

[[modules]]
name = "ui"
path = "ui/dist"
patterns = ["."]

[[modules]]
name = "api"
path = "api/build"
target = "."
patterns = ["bin/server"]
"#,
    )
    .unwrap();

    let plan = PlanLoader::new(temp.path()).load().unwrap();
    let report = AssemblyService::new(
        Arc::new(LocalFilesystem::new()),
        Box::new(ZipArchiver::new()),
        &EngineConfig::default(),
    )
    .assemble(&plan)
    .unwrap();

    assert!(report.cleaned_up);
    assert!(!temp.path().join("target/staging").exists());

    let names: Vec<String> = records(&temp.path().join("target/app.zip"))
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert_eq!(
        names,
        vec![
            "META-INF/",
            "server",
            "ui/",
            "ui/dist/",
            "ui/dist/index.html",
            "ui/dist/static/",
            "ui/dist/static/app.css",
        ]
    );
}

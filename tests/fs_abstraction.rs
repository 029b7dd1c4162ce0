use std::path::Path;

use tauri_runner::fs::mock::MockFileSystem;
use tauri_runner::fs::{FileSystem, RealFileSystem};

#[test]
fn test_mock_fs_registers_parent_dirs() {
    let fs = MockFileSystem::new();
    fs.add_file("/app/src-tauri/tauri.conf.json", b"{}".to_vec());

    assert!(fs.is_file(Path::new("/app/src-tauri/tauri.conf.json")));
    assert!(!fs.is_file(Path::new("/app/src-tauri")));

    let dir_err = fs.read_to_string(Path::new("/app/src-tauri")).unwrap_err();
    assert!(dir_err.to_string().contains("Is a directory"), "{dir_err}");
    let missing_err = fs.read_to_string(Path::new("/app/missing.json")).unwrap_err();
    assert!(missing_err.to_string().contains("not found"), "{missing_err}");
}

#[test]
fn test_mock_fs_write_then_read() {
    let fs = MockFileSystem::new();
    fs.write(Path::new("/out/tauri.js"), b"window.tauri = {}").unwrap();

    assert_eq!(
        fs.read_to_string(Path::new("/out/tauri.js")).unwrap(),
        "window.tauri = {}"
    );
    assert!(!fs.is_file(Path::new("/out")));
}

#[test]
fn test_real_fs_write_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("deeper").join("tauri.js");

    RealFileSystem.write(&target, b"ok").unwrap();

    assert!(RealFileSystem.is_file(&target));
    assert_eq!(RealFileSystem.read_to_string(&target).unwrap(), "ok");
}

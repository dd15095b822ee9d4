//! Local tree scanner behavior over real temp directories.

use gcl_storage::manifest::MANIFEST_FILE_NAME;
use gcl_storage::{ExclusionSet, StorageError, scan_tree};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn write(root: &std::path::Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn scans_nested_files_with_forward_slash_keys() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello world");
    write(dir.path(), "sub/deep/b.txt", b"abc");

    let entries = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
    assert_eq!(keys, vec!["a.txt", "sub/deep/b.txt"]);
}

#[test]
fn digests_and_sizes_are_correct() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello world");
    write(dir.path(), "empty", b"");

    let entries = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();

    let a = entries.iter().find(|e| e.rel_path == "a.txt").unwrap();
    assert_eq!(a.digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    assert_eq!(a.size, 11);

    let empty = entries.iter().find(|e| e.rel_path == "empty").unwrap();
    assert_eq!(empty.digest, "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(empty.size, 0);
}

#[test]
fn output_is_sorted_by_relative_path() {
    let dir = tempdir().unwrap();
    write(dir.path(), "z.txt", b"z");
    write(dir.path(), "a.txt", b"a");
    write(dir.path(), "m/m.txt", b"m");

    let entries = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn excluded_paths_never_become_entries() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.txt", b"keep");
    write(dir.path(), "skip.tmp", b"skip");
    write(dir.path(), "cache/skip.txt", b"skip");

    let excludes = ExclusionSet::from_patterns(&[r"\.tmp$", r"^cache/"]).unwrap();
    let entries = scan_tree(dir.path(), &excludes).unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
    assert_eq!(keys, vec!["keep.txt"]);
}

#[test]
fn manifest_file_is_always_ignored() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"a");
    write(dir.path(), MANIFEST_FILE_NAME, b"digest  a.txt\n");

    let entries = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.rel_path.as_str()).collect();
    assert_eq!(keys, vec!["a.txt"]);
}

#[test]
fn rescan_of_unchanged_tree_is_identical() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b/c.txt", b"content");

    let first = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();
    let second = scan_tree(dir.path(), &ExclusionSet::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_root_is_config_error() {
    let err = scan_tree(
        std::path::Path::new("/no/such/root"),
        &ExclusionSet::default(),
    )
    .unwrap_err();
    assert!(matches!(err, StorageError::Config(_)));
}

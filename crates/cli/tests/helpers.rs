use std::fs;
use std::path::Path;

use contract_inspector::commands::{parse_reply, InputArgs};
use contract_inspector::{canonicalize_or_current, infer_workspace_name, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result =
        canonicalize_or_current(subdir.to_str().expect("utf8 path")).expect("canonicalize");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_joins_missing_relative_path() {
    let result = canonicalize_or_current("does-not-exist-yet").expect("canonicalize");
    assert!(result.is_absolute());
    assert!(result.ends_with("does-not-exist-yet"));
}

#[test]
fn infer_workspace_name_uses_last_path_component() {
    assert_eq!(infer_workspace_name(Path::new("/tmp/token-audit")), "token-audit");
    assert_eq!(infer_workspace_name(Path::new("/")), "unnamed-workspace");
}

#[test]
fn sha256_file_matches_known_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("abc.txt");
    fs::write(&path, "abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn parse_reply_rejects_unfinished_and_failed_tasks() {
    let err = parse_reply(r#"{ "state": 2 }"#, "pending.json").unwrap_err();
    assert!(err.to_string().contains("still running (state 2)"));

    let err = parse_reply(
        r#"{ "task_error": { "message": "out of gas", "status": 500 } }"#,
        "failed.json",
    )
    .unwrap_err();
    assert!(err.to_string().contains("out of gas"));

    let err = parse_reply("[1, 2", "broken.json").unwrap_err();
    assert!(err.to_string().contains("Failed to parse disassembly JSON from broken.json"));
}

#[test]
fn load_input_requires_a_source() {
    let input = InputArgs { root: ".".to_string(), address: None, file: None };
    let err = contract_inspector::commands::load_input(&input).unwrap_err();
    assert!(err.to_string().contains("Provide --address"));
}

//! End-to-end tests for the `glimmer` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// 2x1 GIF: one red pixel, then the transparent index.
fn gif_file() -> Vec<u8> {
    let mut file = b"GIF89a\x02\x00\x01\x00\x80\x00\x00".to_vec();
    file.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
    file.extend_from_slice(&[0x21, 0xF9, 4, 0x01, 0, 0, 1, 0]);
    file.extend_from_slice(&[0x2C, 0, 0, 0, 0, 2, 0, 1, 0, 0]);
    // Min code size 2; codes clear(4), 0, 1, end(5) at 3 bits.
    file.extend_from_slice(&[2, 2, 0x44, 0x0A, 0, 0x3B]);
    file
}

fn glimmer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_glimmer"))
        .args(args)
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "two.gif", &gif_file());

    let output = glimmer(&["--json", "--pixel", "1,0", &path]);
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["width"], 2);
    assert_eq!(summary["height"], 1);
    assert_eq!(summary["opaque"], false);
    assert_eq!(summary["first_pixel"], "#FFFF0000");
    assert_eq!(summary["probe"]["argb"], "#00000000");
}

#[test]
fn test_no_transparency_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "two.gif", &gif_file());

    let output = glimmer(&["--json", "--no-transparency", "--pixel", "1,0", &path]);
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["opaque"], true);
    assert_eq!(summary["probe"]["argb"], "#FF0000FF");
}

#[test]
fn test_failure_sets_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "two.gif", &gif_file());
    let bad = write(dir.path(), "junk", b"not an image at all");

    let output = glimmer(&[&good, &bad]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PNG: malformed data"), "{stderr}");
    assert!(stderr.contains("GIF: malformed data"), "{stderr}");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.gif");
    let output = glimmer(&[path.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_dump_writes_pam() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "two.gif", &gif_file());
    let out = dir.path().join("two.pam");

    let output = glimmer(&["--dump", out.to_str().unwrap(), &path]);
    assert!(output.status.success());

    let pam = fs::read(&out).unwrap();
    let header = b"P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n";
    assert!(pam.starts_with(header));
    assert_eq!(&pam[header.len()..], &[255, 0, 0, 255, 0, 0, 0, 0]);
}

#[test]
fn test_requires_a_file() {
    assert!(!glimmer(&[]).status.success());
}

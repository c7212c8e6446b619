//! CLI end-to-end tests
//!
//! Run the img2pdf binary against temporary directories.

#![cfg(feature = "cli")]

use assert_cmd::prelude::*;
use image::{DynamicImage, Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the img2pdf binary
#[allow(deprecated)]
fn img2pdf_cmd() -> Command {
    Command::cargo_bin("img2pdf").unwrap()
}

/// Same binary, with stdin fed from a buffer
#[allow(deprecated)]
fn img2pdf_cmd_with_stdin(input: &str) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("img2pdf").unwrap();
    cmd.write_stdin(input);
    cmd
}

fn save(dir: &Path, name: &str, format: image::ImageFormat) {
    let img: DynamicImage = RgbImage::from_pixel(12, 6, Rgb([200, 40, 40])).into();
    img.save_with_format(dir.join(name), format).unwrap();
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = img2pdf_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--no-webp"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = img2pdf_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_rejects_unknown_page_size() {
    let dir = tempdir().unwrap();
    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["--yes", "--page", "a3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a3"));
}

#[test]
fn test_cli_empty_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("No image files found"))
        .stdout(predicate::str::contains("Done:").not());

    assert!(!dir.path().join("pdf").exists());
}

#[test]
fn test_cli_missing_directory_exits_with_error() {
    let dir = tempdir().unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path().join("missing"))
        .arg("--yes")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read images from"));
}

#[test]
fn test_cli_corrupt_image_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("corrupt.png"), b"\x89PNG\r\n\x1a\nthis is not a png").unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 0 converted, 1 failed"))
        .stderr(predicate::str::contains("corrupt.png FAILED (InvalidImageError)"));

    assert!(!dir.path().join("pdf").join("corrupt.pdf").exists());
}

#[test]
fn test_cli_converts_directory() {
    let dir = tempdir().unwrap();
    save(dir.path(), "a.jpg", image::ImageFormat::Jpeg);
    save(dir.path(), "b.png", image::ImageFormat::Png);
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 image file(s)"))
        .stdout(predicate::str::contains("[1/2] a.jpg -> pdf/a.pdf"))
        .stdout(predicate::str::contains("[2/2] b.png -> pdf/b.pdf"))
        .stdout(predicate::str::contains("Done: 2 converted, 0 failed"));

    let pdf_dir = dir.path().join("pdf");
    assert!(pdf_dir.join("a.pdf").is_file());
    assert!(pdf_dir.join("b.pdf").is_file());
    assert!(!pdf_dir.join("notes.pdf").exists());
}

#[test]
fn test_cli_output_flag() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    save(dir.path(), "a.png", image::ImageFormat::Png);

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--output")
        .arg(out.path().join("converted"))
        .args(["--yes", "--page", "letter", "--fit", "page", "--align", "center"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 1 converted, 0 failed"));

    assert!(out.path().join("converted").join("a.pdf").is_file());
    assert!(!dir.path().join("pdf").exists());
}

#[test]
fn test_cli_no_webp_skips_webp_files() {
    let dir = tempdir().unwrap();
    save(dir.path(), "a.png", image::ImageFormat::Png);
    fs::write(dir.path().join("pic.webp"), b"RIFF\0\0\0\0WEBP").unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["--yes", "--no-webp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(jpg, jpeg, png)"))
        .stdout(predicate::str::contains("Found 1 image file(s)"))
        .stdout(predicate::str::contains("Done: 1 converted, 0 failed"));

    assert!(!dir.path().join("pdf").join("pic.pdf").exists());
}

#[cfg(feature = "webp")]
#[test]
fn test_cli_converts_webp_by_default() {
    let dir = tempdir().unwrap();
    save(dir.path(), "pic.webp", image::ImageFormat::WebP);

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 1 converted, 0 failed"));

    assert!(dir.path().join("pdf").join("pic.pdf").is_file());
}

#[test]
fn test_cli_yes_with_redirected_stdin() {
    let dir = tempdir().unwrap();
    save(dir.path(), "a.png", image::ImageFormat::Png);

    img2pdf_cmd_with_stdin("")
        .arg("--dir")
        .arg(dir.path())
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Press ENTER").not())
        .stdout(predicate::str::contains("Done: 1 converted, 0 failed"));
}

#[test]
fn test_cli_does_not_wait_when_stdin_is_not_a_terminal() {
    let dir = tempdir().unwrap();
    save(dir.path(), "a.png", image::ImageFormat::Png);

    img2pdf_cmd_with_stdin("\n")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Press ENTER").not())
        .stdout(predicate::str::contains("Done: 1 converted, 0 failed"));

    assert!(dir.path().join("pdf").join("a.pdf").is_file());
}

#[test]
fn test_cli_quiet_prints_only_failures() {
    let dir = tempdir().unwrap();
    save(dir.path(), "a.png", image::ImageFormat::Png);
    fs::write(dir.path().join("broken.jpg"), b"").unwrap();

    let mut cmd = img2pdf_cmd();
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["--yes", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("broken.jpg FAILED"));

    assert!(dir.path().join("pdf").join("a.pdf").is_file());
}

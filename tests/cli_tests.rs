//! CLI integration tests
//!
//! These tests run the `pxg` binary against generated images and check the
//! exported files and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn pxg(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pxg"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute pxg")
}

/// Write a 100x50 image, left half red and right half blue
fn write_input(dir: &Path) -> String {
    let img = RgbaImage::from_fn(100, 50, |x, _| {
        if x < 50 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let path = dir.join("photo.png");
    img.save(&path).expect("write input image");
    path.to_string_lossy().into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_pixelate_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());

    let output = pxg(dir.path(), &["pixelate", &input]);
    assert!(output.status.success(), "pixelate failed: {}", stderr(&output));

    let out = dir.path().join("photo_pixelated.png");
    let img = image::open(&out).expect("exported image").to_rgba8();
    assert_eq!(img.dimensions(), (32, 16));
    assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*img.get_pixel(31, 15), Rgba([0, 0, 255, 255]));
}

#[test]
fn test_pixelate_size_scale_and_paint() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let out = dir.path().join("nested/out.png");

    let output = pxg(
        dir.path(),
        &[
            "pixelate",
            &input,
            "-o",
            &out.to_string_lossy(),
            "--size",
            "8",
            "--scale",
            "3",
            "--paint",
            "1,1=#00FF00",
        ],
    );
    assert!(output.status.success(), "pixelate failed: {}", stderr(&output));

    let img = image::open(&out).expect("exported image").to_rgba8();
    assert_eq!(img.dimensions(), (24, 12));
    // Cell (1,1) spans pixels 3..6 after scaling
    assert_eq!(*img.get_pixel(4, 4), Rgba([0, 255, 0, 255]));
}

#[test]
fn test_pixelate_filter_chain() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let out = dir.path().join("gray.png");

    let output = pxg(
        dir.path(),
        &["pixelate", &input, "-o", &out.to_string_lossy(), "-f", "grayscale"],
    );
    assert!(output.status.success(), "pixelate failed: {}", stderr(&output));

    let img = image::open(&out).unwrap().to_rgba8();
    assert!(img.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
}

#[test]
fn test_pixelate_jpeg_from_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    let out = dir.path().join("photo.jpg");

    let output = pxg(dir.path(), &["pixelate", &input, "-o", &out.to_string_lossy()]);
    assert!(output.status.success(), "pixelate failed: {}", stderr(&output));

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_pixelate_reads_config() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());
    fs::write(dir.path().join("pxg.toml"), "[grid]\ntarget_size = 10\n").unwrap();

    let output = pxg(dir.path(), &["pixelate", &input]);
    assert!(output.status.success(), "pixelate failed: {}", stderr(&output));

    let img = image::open(dir.path().join("photo_pixelated.png")).unwrap();
    assert_eq!((img.width(), img.height()), (10, 5));
}

#[test]
fn test_pixelate_unknown_filter_is_invalid_args() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());

    let output = pxg(dir.path(), &["pixelate", &input, "-f", "posterize"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("photo_pixelated.png").exists());
}

#[test]
fn test_pixelate_paint_out_of_bounds() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());

    let output = pxg(dir.path(), &["pixelate", &input, "--paint", "40,0=red"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_pixelate_missing_input() {
    let dir = TempDir::new().unwrap();
    let output = pxg(dir.path(), &["pixelate", "nope.png"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_info_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path());

    let output = pxg(dir.path(), &["info", &input, "--size", "20", "--json"]);
    assert!(output.status.success(), "info failed: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["source"], serde_json::json!([100, 50]));
    assert_eq!(value["grid"], serde_json::json!([20, 10]));
    assert_eq!(value["cells"], 200);
}

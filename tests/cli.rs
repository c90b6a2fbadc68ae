use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn tilebrot() -> Command {
    Command::cargo_bin("tilebrot").unwrap()
}

#[test]
fn renders_png_of_requested_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandel.png");
    tilebrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "64x48", "--tiles", "4x3"])
        .args(&["-t", "1", "-i", "100"])
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn renders_julia_set_between_corners() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("julia.png");
    tilebrot()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "40x30",
            "--tiles",
            "2x2",
            "-t",
            "1",
            "-l",
            "-1.5,-1",
            "-r",
            "1.5,1",
            "--julia",
            "--seed",
            "-0.8,0.156",
            "--palette",
            "banded",
            "--curve",
            "sqrt",
        ])
        .assert()
        .success();
    assert!(predicate::path::exists().eval(out.as_path()));
}

#[test]
fn too_many_tiles_is_reported() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("nope.png");
    tilebrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "4x4", "--tiles", "8x8", "-t", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid tile grid"));
    assert!(!out.exists());
}

#[test]
fn inverted_corners_are_reported() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("nope.png");
    tilebrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "--tiles", "1x1", "-t", "1"])
        .args(&["-l", "1,1", "-r", "-1,-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Degenerate rectangle"));
}

#[test]
fn unknown_palette_is_rejected() {
    tilebrot()
        .args(&["-o", "never.png", "--palette", "plaid"])
        .assert()
        .failure();
}

mod common;

use assert_cmd::Command;
use common::{blank, render_chessboard};
use predicates::prelude::*;

#[test]
fn missing_frame_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("boardr")
        .unwrap()
        .arg("--frames")
        .arg(dir.path().join("no-such-dir"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("camera unavailable"));
}

#[test]
fn invalid_board_size_fails() {
    let dir = tempfile::tempdir().unwrap();
    blank(64, 64).save(dir.path().join("f0.png")).unwrap();
    Command::cargo_bin("boardr")
        .unwrap()
        .arg("--frames")
        .arg(dir.path())
        .args(["--board-w", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("board dimensions"));
}

#[test]
fn collects_board_from_frame_dir() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    blank(440, 440).save(frames.path().join("f0.png")).unwrap();
    render_chessboard(8, 8, 40, 60)
        .save(frames.path().join("f1.png"))
        .unwrap();
    let report = out.path().join("report.json");

    Command::cargo_bin("boardr")
        .unwrap()
        .arg("--frames")
        .arg(frames.path())
        .args(["--board-w", "7", "--board-h", "7", "--max-frames", "5"])
        .arg("--image-path")
        .arg(out.path().join("board.png"))
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complete\":true"));

    assert!(out.path().join("board.png").is_file());
    assert!(report.is_file());
}

#[test]
fn corrupt_frame_does_not_abort_the_run() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(frames.path().join("f0.png"), "not a png").unwrap();
    render_chessboard(8, 8, 40, 60)
        .save(frames.path().join("f1.png"))
        .unwrap();

    Command::cargo_bin("boardr")
        .unwrap()
        .arg("--frames")
        .arg(frames.path())
        .args(["--board-w", "7", "--board-h", "7", "--max-frames", "5"])
        .arg("--image-path")
        .arg(out.path().join("board.png"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complete\":true"));
}

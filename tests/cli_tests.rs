// tests/cli_tests.rs
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn flexnms() -> Command {
    Command::cargo_bin("flexnms").unwrap()
}

#[test]
fn no_inputs_is_a_usage_error() {
    flexnms()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn merges_detections_across_input_files() {
    let dir = TempDir::new().unwrap();
    let pass1 = write_csv(
        &dir,
        "pass1.csv",
        "image_filename,x0,y0,x1,y1,confidence\nimg_0001.jpg,0,0,10,10,0.9\n",
    );
    let pass2 = write_csv(
        &dir,
        "pass2.csv",
        "image_filename,x0,y0,x1,y1,confidence\nimg_0001.jpg,0,0,10,10,0.8\n",
    );

    flexnms().arg(&pass1).arg(&pass2).assert().success().stdout(
        predicate::eq(
            "image_filename,x0,y0,x1,y1,label,confidence\n\
             img_0001.jpg,0.0,0.0,10.0,10.0,car,0.850\n",
        ),
    );
}

#[test]
fn header_order_is_irrelevant_and_extra_columns_are_ignored() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "confidence,image_filename,extra,y1,x1,y0,x0\n\
         0.9,img_0001.jpg,whatever,10,10,0,0\n",
    );

    flexnms()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "img_0001.jpg,0.0,0.0,10.0,10.0,car,0.900",
        ));
}

#[test]
fn missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1\nimg_0001.jpg,0,0,10,10\n",
    );

    flexnms()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence"));
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1,confidence\n\
         img_0001.jpg,0,0,10,10,0.9\n\
         img_0002.jpg,not_a_number,0,10,10,0.9\n\
         img_0003.jpg,5,5,25,25,0.6\n",
    );

    let assert = flexnms().arg(&input).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("img_0001.jpg"));
    assert!(!stdout.contains("img_0002.jpg"));
    assert!(stdout.contains("img_0003.jpg"));
}

#[test]
fn zero_ensemble_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1,confidence\nimg_0001.jpg,0,0,10,10,0.9\n",
    );

    flexnms()
        .arg(&input)
        .args(["--ensemble-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ensemble size"));
}

#[test]
fn min_confidence_floor_drops_weak_survivors() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1,confidence\n\
         img_0001.jpg,0,0,10,10,0.9\n\
         img_0001.jpg,200,200,220,220,0.05\n",
    );

    flexnms()
        .arg(&input)
        .args(["--min-confidence", "0.1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("img_0001.jpg,0.0,0.0,10.0,10.0")
                .and(predicate::str::contains("200.0").not()),
        );
}

#[test]
fn output_is_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1,confidence\n\
         zebra.jpg,0,0,10,10,0.9\n\
         apple.jpg,5,5,30,30,0.7\n\
         apple.jpg,6,4,31,29,0.8\n\
         mango.jpg,40,40,80,90,0.6\n",
    );

    let first = flexnms().arg(&input).assert().success();
    let second = flexnms().arg(&input).assert().success();
    assert_eq!(first.get_output().stdout, second.get_output().stdout);

    // Groups come out in ascending image order regardless of input order.
    let stdout = String::from_utf8(first.get_output().stdout.clone()).unwrap();
    let images: Vec<&str> = stdout
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    let mut sorted = images.clone();
    sorted.sort();
    assert_eq!(images, sorted);
}

#[test]
fn writes_to_output_file_when_requested() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(
        &dir,
        "detections.csv",
        "image_filename,x0,y0,x1,y1,confidence\nimg_0001.jpg,0,0,10,10,0.9\n",
    );
    let output = dir.path().join("merged.csv");

    flexnms()
        .arg(&input)
        .args(["--output", output.to_str().unwrap()])
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("image_filename,x0,y0,x1,y1,label,confidence\n"));
    assert!(text.contains("img_0001.jpg"));
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/cli.rs - 命令行集成测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RIDE_RECORD: &str = "person, 0.91, 0.0, 0.0, 100.0, 200.0\nhorse, 0.88, 0.0, 150.0, 150.0, 300.0\n";

fn file_url(scheme: &str, path: &Path) -> String {
  format!("{}://{}", scheme, path.display())
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
  let path = dir.path().join(name);
  std::fs::write(&path, contents).unwrap();
  path
}

#[test]
fn oneshot_record_to_stdout() {
  let dir = TempDir::new().unwrap();
  let input = write(&dir, "ride.txt", RIDE_RECORD);

  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args(["--input", &file_url("record", &input)])
    .assert()
    .success()
    .stdout(predicate::str::contains("person_1 on horse_1"));
}

#[test]
fn oneshot_json_to_text_file() {
  let dir = TempDir::new().unwrap();
  let input = write(
    &dir,
    "desk.json",
    r#"[
      {"label": "cup", "score": 0.8, "bbox": [90, 80, 110, 100]},
      {"label": "table", "score": 0.9, "bbox": [0, 90, 200, 200]}
    ]"#,
  );
  let output = dir.path().join("out").join("desk.txt");

  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args([
      "--model",
      "scene:",
      "--input",
      &file_url("json", &input),
      "--output",
      &file_url("text", &output),
    ])
    .assert()
    .success();

  let text = std::fs::read_to_string(&output).unwrap();
  assert!(text.starts_with("cup_1 on table_1\n"));
  assert!(text.contains("cup_1 on table_1."));
}

#[test]
fn continueshot_directory_with_frame_limit() {
  let dir = TempDir::new().unwrap();
  let frames = dir.path().join("frames");
  std::fs::create_dir(&frames).unwrap();
  for name in ["0001.txt", "0002.txt", "0003.txt"] {
    std::fs::write(frames.join(name), RIDE_RECORD).unwrap();
  }
  let output = dir.path().join("graph.json");

  Command::cargo_bin("scene-continueshot")
    .unwrap()
    .args([
      "--input",
      &file_url("record", &frames),
      "--output",
      &file_url("json", &output),
      "--frames",
      "2",
    ])
    .assert()
    .success();

  let value: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
  assert_eq!(value["relationships"][0], "person_1 on horse_1");
  assert_eq!(value["objects"].as_array().unwrap().len(), 2);
}

#[test]
fn model_query_overrides_threshold() {
  let dir = TempDir::new().unwrap();
  let input = write(
    &dir,
    "pets.txt",
    "dog, 0.9, 0, 0, 100, 50\ncat, 0.8, 40, 100, 200, 150\n",
  );

  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args(["--input", &file_url("record", &input)])
    .assert()
    .success()
    .stdout(predicate::str::contains("next to").not());

  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args([
      "--model",
      "scene:?proximity=80",
      "--input",
      &file_url("record", &input),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("dog_1 next to cat_1"));
}

#[test]
fn unknown_scheme_fails() {
  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args(["--input", "v4l2:///dev/video0"])
    .assert()
    .failure();

  let dir = TempDir::new().unwrap();
  let input = write(&dir, "ride.txt", RIDE_RECORD);
  Command::cargo_bin("scene-oneshot")
    .unwrap()
    .args([
      "--model",
      "detect:///model.bin",
      "--input",
      &file_url("record", &input),
    ])
    .assert()
    .failure();
}

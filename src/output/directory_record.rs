// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::DetectionFrame,
  output::Render,
  scene::SceneGraph,
  url_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("JSON 序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

#[derive(Serialize)]
struct FrameRecord<'a> {
  frame: &'a str,
  scene_graph: &'a SceneGraph,
}

/// 按日期分目录记录每帧的场景图：`<dir>/YYYY/MM/DD/HH-MM-SS-XXXX.json`
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counters: Arc<Mutex<u16>>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: url_path(uri),
      frame_counters: Arc::new(Mutex::new(0)),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    let mut counter = self
      .frame_counters
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  /// 新建记录文件；同名文件已存在（其他记录器或重启前的进程写入）时顺延编号
  fn create_record(&self, now: DateTime<Utc>) -> Result<(PathBuf, File), std::io::Error> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    for _ in 0..=u16::MAX {
      let path = directory.join(format!(
        "{}-{:04X}.json",
        now.format("%H-%M-%S"),
        self.frame_id()
      ));
      match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => return Ok((path, file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
          debug!("记录文件已存在，顺延编号: {}", path.display());
        }
        Err(e) => return Err(e),
      }
    }

    Err(std::io::Error::new(
      ErrorKind::AlreadyExists,
      format!("{} 下同一秒的记录编号已用尽", directory.display()),
    ))
  }
}

impl Render<DetectionFrame, SceneGraph> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &DetectionFrame, result: &SceneGraph) -> Result<(), Self::Error> {
    if !self.always && result.relationships.is_empty() {
      debug!("帧 {} 没有关系，跳过记录", frame.name);
      return Ok(());
    }

    let (path, file) = self.create_record(Utc::now())?;
    let record = FrameRecord {
      frame: &frame.name,
      scene_graph: result,
    };
    serde_json::to_writer_pretty(file, &record)?;
    debug!("帧 {} 已记录到: {}", frame.name, path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;

  fn recorded_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
      for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          stack.push(path);
        } else {
          files.push(path);
        }
      }
    }
    files
  }

  fn graph_with_relation() -> SceneGraph {
    let mut graph = SceneGraph::default();
    graph.relationships.insert("a_1 on b_1".parse().unwrap());
    graph
  }

  #[test]
  fn skips_empty_graphs_unless_always() {
    let dir = tempfile::tempdir().unwrap();
    let frame = DetectionFrame::new("f", Vec::new());

    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    output.render_result(&frame, &SceneGraph::default()).unwrap();
    assert!(recorded_files(dir.path()).is_empty());

    output.render_result(&frame, &graph_with_relation()).unwrap();
    assert_eq!(recorded_files(dir.path()).len(), 1);

    let url = url::Url::parse(&format!("folder://{}?always", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    output.render_result(&frame, &SceneGraph::default()).unwrap();
    assert_eq!(recorded_files(dir.path()).len(), 2);
  }

  #[test]
  fn recorders_sharing_a_directory_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let first = DirectoryRecordOutput::from_url(&url).unwrap();
    let second = DirectoryRecordOutput::from_url(&url).unwrap();

    let now = Utc::now();
    let (p1, _) = first.create_record(now).unwrap();
    let (p2, _) = second.create_record(now).unwrap();
    assert_ne!(p1, p2);
    assert!(p1.to_string_lossy().ends_with("-0001.json"));
    assert!(p2.to_string_lossy().ends_with("-0002.json"));
    assert_eq!(recorded_files(dir.path()).len(), 2);
  }

  #[test]
  fn record_contains_frame_name() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    output
      .render_result(&DetectionFrame::new("street-7", Vec::new()), &graph_with_relation())
      .unwrap();

    let files = recorded_files(dir.path());
    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(value["frame"], "street-7");
    assert_eq!(value["scene_graph"]["relationships"][0], "a_1 on b_1");
    assert!(files[0].to_string_lossy().ends_with("-0001.json"));
  }
}

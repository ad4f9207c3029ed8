// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/record_file.rs - 检测记录文本输入
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

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::{DetectionError, DetectionFrame},
  input::{prepare_frame, rescale_from_url},
  model::{DetectItem, DetectResult},
  url_path,
};

const RECORD_EXTENSION: &str = "txt";
const RECORD_FIELDS: usize = 6;

#[derive(Error, Debug)]
pub enum RecordFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("{0}:{1}: 无法解析检测记录 '{2}'")]
  ParseError(String, usize, String),
  #[error("检测结果错误: {0}")]
  DetectionError(#[from] DetectionError),
}

/// 检测记录输入，每行一个检测结果：`label, score, x_min, y_min, x_max, y_max`
///
/// URL 指向文件时产生一帧，指向目录时每个 `*.txt` 文件产生一帧（按文件名排序）。
pub struct RecordFileInput {
  frames: std::vec::IntoIter<DetectionFrame>,
}

impl FromUrlWithScheme for RecordFileInput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for RecordFileInput {
  type Error = RecordFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(RecordFileInputError::SchemaMismatch);
    }

    let path = url_path(url);
    let rescale = rescale_from_url(url)?;

    let files = if path.is_dir() {
      record_files(&path)?
    } else {
      vec![path]
    };
    info!("读取 {} 个检测记录文件", files.len());

    let mut frames = Vec::with_capacity(files.len());
    for file in files {
      let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
      let items = read_records(&file)?;
      frames.push(prepare_frame(name, DetectResult::from(items), rescale.as_ref())?);
    }

    Ok(RecordFileInput {
      frames: frames.into_iter(),
    })
  }
}

fn record_files(directory: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
  let mut files = Vec::new();
  for entry in std::fs::read_dir(directory)? {
    let path = entry?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
      files.push(path);
    }
  }
  if files.is_empty() {
    warn!("目录中没有检测记录文件: {}", directory.display());
  }
  files.sort();
  Ok(files)
}

fn read_records(path: &Path) -> Result<Vec<DetectItem>, RecordFileInputError> {
  let content = std::fs::read_to_string(path)?;
  content
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(index, line)| {
      parse_record(line).ok_or_else(|| {
        RecordFileInputError::ParseError(path.display().to_string(), index + 1, line.to_string())
      })
    })
    .collect()
}

/// 标签中可能含有逗号以外的任意字符，因此从右侧切分数值字段
fn parse_record(line: &str) -> Option<DetectItem> {
  let mut fields: Vec<&str> = line.rsplitn(RECORD_FIELDS, ',').collect();
  if fields.len() != RECORD_FIELDS {
    return None;
  }
  fields.reverse();

  let label = fields[0].trim();
  if label.is_empty() {
    return None;
  }
  let mut numbers = [0f32; RECORD_FIELDS - 1];
  for (slot, field) in numbers.iter_mut().zip(&fields[1..]) {
    *slot = field.trim().parse().ok()?;
  }
  let [score, xmin, ymin, xmax, ymax] = numbers;

  Some(DetectItem::new(label, score, [xmin, ymin, xmax, ymax]))
}

impl Iterator for RecordFileInput {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.frames.next()
  }
}

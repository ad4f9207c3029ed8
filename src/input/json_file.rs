// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/json_file.rs - JSON 检测结果文件输入
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

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::{DetectionError, DetectionFrame},
  input::{prepare_frame, rescale_from_url},
  model::{DetectItem, DetectResult},
  url_path,
};

#[derive(Error, Debug)]
pub enum JsonFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("检测结果错误: {0}")]
  DetectionError(#[from] DetectionError),
}

#[derive(Deserialize)]
struct JsonFrame {
  #[serde(default)]
  name: Option<String>,
  items: Vec<DetectItem>,
}

/// 支持三种文档形状：检测结果数组、单帧对象、帧数组
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
  Items(Vec<DetectItem>),
  Frames(Vec<JsonFrame>),
  Frame(JsonFrame),
}

pub struct JsonFileInput {
  frames: std::vec::IntoIter<DetectionFrame>,
}

impl FromUrlWithScheme for JsonFileInput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonFileInput {
  type Error = JsonFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonFileInputError::SchemaMismatch);
    }

    let path = url_path(url);
    let rescale = rescale_from_url(url)?;
    info!("读取 JSON 检测结果: {}", path.display());
    let data = std::fs::read_to_string(&path)?;
    let document: JsonDocument = serde_json::from_str(&data)?;

    let stem = file_stem(&path);
    let raw: Vec<(String, Vec<DetectItem>)> = match document {
      JsonDocument::Items(items) => vec![(stem, items)],
      JsonDocument::Frame(frame) => vec![(frame.name.unwrap_or(stem), frame.items)],
      JsonDocument::Frames(frames) => frames
        .into_iter()
        .enumerate()
        .map(|(i, frame)| {
          let name = frame.name.unwrap_or_else(|| format!("{}-{}", stem, i + 1));
          (name, frame.items)
        })
        .collect(),
    };

    let frames = raw
      .into_iter()
      .map(|(name, items)| prepare_frame(name, DetectResult::from(items), rescale.as_ref()))
      .collect::<Result<Vec<_>, _>>()?;
    info!("共 {} 帧", frames.len());

    Ok(JsonFileInput {
      frames: frames.into_iter(),
    })
  }
}

fn file_stem(path: &Path) -> String {
  path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| "frame".to_string())
}

impl Iterator for JsonFileInput {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.frames.next()
  }
}

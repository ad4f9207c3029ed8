// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output.rs - 输出定义
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

#[cfg(any(feature = "json_output", feature = "text_output"))]
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::FromUrl;
#[cfg(any(feature = "json_output", feature = "text_output", feature = "directory_record"))]
use crate::FromUrlWithScheme;
use crate::detection::DetectionFrame;
use crate::scene::SceneGraph;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

#[cfg(feature = "json_output")]
mod json_file;
#[cfg(feature = "json_output")]
pub use self::json_file::{JsonFileOutput, JsonFileOutputError};

#[cfg(feature = "text_output")]
mod text_file;
#[cfg(feature = "text_output")]
pub use self::text_file::{TextFileOutput, TextFileOutputError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[cfg(any(feature = "json_output", feature = "text_output"))]
pub(crate) fn ensure_parent(path: &Path) -> Result<(), std::io::Error> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  Ok(())
}

/// 以 JSON 形式打印到标准输出
pub struct StdoutOutput;

pub const STDOUT_SCHEME: &str = "stdout";

impl Render<DetectionFrame, SceneGraph> for StdoutOutput {
  type Error = serde_json::Error;

  fn render_result(&self, _frame: &DetectionFrame, result: &SceneGraph) -> Result<(), Self::Error> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
  }
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "json_output")]
  #[error("JSON 文件输出错误: {0}")]
  JsonFileOutputError(#[from] JsonFileOutputError),
  #[cfg(feature = "text_output")]
  #[error("文本文件输出错误: {0}")]
  TextFileOutputError(#[from] TextFileOutputError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("标准输出错误: {0}")]
  StdoutError(#[from] serde_json::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "json_output")]
  JsonFileOutput(JsonFileOutput),
  #[cfg(feature = "text_output")]
  TextFileOutput(TextFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
  StdoutOutput(StdoutOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "json_output")]
      JsonFileOutput::SCHEME => {
        let output = JsonFileOutput::from_url(url)?;
        Ok(OutputWrapper::JsonFileOutput(output))
      }
      #[cfg(feature = "text_output")]
      TextFileOutput::SCHEME => {
        let output = TextFileOutput::from_url(url)?;
        Ok(OutputWrapper::TextFileOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      STDOUT_SCHEME => Ok(OutputWrapper::StdoutOutput(StdoutOutput)),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render<DetectionFrame, SceneGraph> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &DetectionFrame, result: &SceneGraph) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "json_output")]
      OutputWrapper::JsonFileOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "text_output")]
      OutputWrapper::TextFileOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::StdoutOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}

#[cfg(all(
  test,
  feature = "json_output",
  feature = "text_output",
  feature = "directory_record"
))]
mod tests {
  use super::*;

  #[test]
  fn schemes_dispatch() {
    let parse = |s: &str| OutputWrapper::from_url(&Url::parse(s).unwrap());
    assert!(matches!(parse("stdout:"), Ok(OutputWrapper::StdoutOutput(_))));
    assert!(matches!(
      parse("json:///tmp/graph.json"),
      Ok(OutputWrapper::JsonFileOutput(_))
    ));
    assert!(matches!(
      parse("text:///tmp/graph.txt"),
      Ok(OutputWrapper::TextFileOutput(_))
    ));
    assert!(matches!(
      parse("folder:///tmp/records"),
      Ok(OutputWrapper::DirectoryRecordOutput(_))
    ));
    assert!(matches!(
      parse("rtsp://localhost/stream"),
      Err(OutputError::SchemeMismatch)
    ));
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 检测结果输入
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

use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl,
  detection::{DetectionError, DetectionFrame, Rescale, Size, assign_unique_ids},
  model::DetectResult,
};

#[cfg(feature = "json_input")]
mod json_file;
#[cfg(feature = "json_input")]
pub use self::json_file::{JsonFileInput, JsonFileInputError};

#[cfg(feature = "record_input")]
mod record_file;
#[cfg(feature = "record_input")]
pub use self::record_file::{RecordFileInput, RecordFileInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "json_input")]
  #[error("JSON 输入错误: {0}")]
  JsonFileInputError(#[from] JsonFileInputError),
  #[cfg(feature = "record_input")]
  #[error("记录文件输入错误: {0}")]
  RecordFileInputError(#[from] RecordFileInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 从 URL 查询参数 `source=WxH&target=WxH` 读取坐标缩放
pub(crate) fn rescale_from_url(url: &url::Url) -> Result<Option<Rescale>, DetectionError> {
  let mut source = None;
  let mut target = None;
  for (k, v) in url.query_pairs() {
    match k.as_ref() {
      "source" => source = Some(v.parse::<Size>()?),
      "target" => target = Some(v.parse::<Size>()?),
      _ => {}
    }
  }

  match (source, target) {
    (Some(source), Some(target)) => Ok(Some(Rescale::new(source, target))),
    (None, None) => Ok(None),
    (Some(_), None) | (None, Some(_)) => Err(DetectionError::InvalidScale(
      "source 与 target 必须同时给出".to_string(),
    )),
  }
}

/// 将检测器原始输出整理为一帧：先缩放坐标，再分配编号
pub(crate) fn prepare_frame(
  name: String,
  result: DetectResult,
  rescale: Option<&Rescale>,
) -> Result<DetectionFrame, DetectionError> {
  let mut items = result.items;
  if let Some(rescale) = rescale {
    rescale.apply_all(&mut items);
  }
  let detections = assign_unique_ids(&items)?;
  debug!("输入帧 {}: {} 个检测结果", name, detections.len());
  Ok(DetectionFrame::new(name, detections))
}

pub enum InputWrapper {
  #[cfg(feature = "json_input")]
  JsonFile(JsonFileInput),
  #[cfg(feature = "record_input")]
  RecordFile(RecordFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "json_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonFileInput::SCHEME {
        let input = JsonFileInput::from_url(url)?;
        return Ok(InputWrapper::JsonFile(input));
      }
    }
    #[cfg(feature = "record_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == RecordFileInput::SCHEME {
        let input = RecordFileInput::from_url(url)?;
        return Ok(InputWrapper::RecordFile(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl Iterator for InputWrapper {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "json_input")]
      InputWrapper::JsonFile(input) => input.next(),
      #[cfg(feature = "record_input")]
      InputWrapper::RecordFile(input) => input.next(),
    }
  }
}

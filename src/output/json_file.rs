// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/json_file.rs - 场景图 JSON 文件输出
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::DetectionFrame,
  output::{Render, ensure_parent},
  scene::SceneGraph,
  url_path,
};

/// 将场景图写入 JSON 文件，多帧时后一帧覆盖前一帧
pub struct JsonFileOutput {
  path: PathBuf,
}

#[derive(Error, Debug)]
pub enum JsonFileOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for JsonFileOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonFileOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(JsonFileOutput {
      path: url_path(uri),
    })
  }
}

impl Render<DetectionFrame, SceneGraph> for JsonFileOutput {
  type Error = JsonFileOutputError;

  fn render_result(&self, frame: &DetectionFrame, result: &SceneGraph) -> Result<(), Self::Error> {
    ensure_parent(&self.path)?;
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&self.path, json)?;
    info!("帧 {} 的场景图已保存到: {}", frame.name, self.path.display());
    Ok(())
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/text_file.rs - 关系文本输出
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

/// 每行一条关系，空行之后是交给摘要方的描述文本
pub struct TextFileOutput {
  path: PathBuf,
}

#[derive(Error, Debug)]
pub enum TextFileOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for TextFileOutput {
  const SCHEME: &'static str = "text";
}

impl FromUrl for TextFileOutput {
  type Error = TextFileOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(TextFileOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(TextFileOutput {
      path: url_path(uri),
    })
  }
}

pub(crate) fn render_text(graph: &SceneGraph) -> String {
  let mut text = String::new();
  for relation in graph.relationship_strings() {
    text.push_str(&relation);
    text.push('\n');
  }
  text.push('\n');
  text.push_str(&graph.description());
  text.push('\n');
  text
}

impl Render<DetectionFrame, SceneGraph> for TextFileOutput {
  type Error = TextFileOutputError;

  fn render_result(&self, frame: &DetectionFrame, result: &SceneGraph) -> Result<(), Self::Error> {
    ensure_parent(&self.path)?;
    std::fs::write(&self.path, render_text(result))?;
    info!("帧 {} 的关系文本已保存到: {}", frame.name, self.path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scene::NO_RELATIONSHIP_DESCRIPTION;

  #[test]
  fn empty_graph_gets_fallback_description() {
    assert_eq!(
      render_text(&SceneGraph::default()),
      format!("\n{}\n", NO_RELATIONSHIP_DESCRIPTION)
    );
  }

  #[test]
  fn relations_then_summary_input() {
    let mut graph = SceneGraph::default();
    graph.relationships.insert("a_1 on b_1".parse().unwrap());
    graph.relationships.insert("a_1 is near c_1".parse().unwrap());
    assert_eq!(
      render_text(&graph),
      "a_1 on b_1\na_1 is near c_1\n\na_1 on b_1. a_1 is near c_1.\n"
    );
  }

  #[test]
  fn scheme_is_checked() {
    let url = Url::parse("json:///tmp/out.json").unwrap();
    assert!(TextFileOutput::from_url(&url).is_err());
  }
}

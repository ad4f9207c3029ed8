// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 检测器输出的一行原始结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectItem {
  pub label: String,
  #[serde(alias = "confidence")]
  pub score: f32,
  #[serde(alias = "box")]
  pub bbox: BBox, // [x_min, y_min, x_max, y_max]
  #[serde(default, skip_serializing_if = "Option::is_none", alias = "unique_id")]
  pub id: Option<String>,
}

impl DetectItem {
  pub fn new(label: impl Into<String>, score: f32, bbox: impl Into<BBox>) -> Self {
    Self {
      label: label.into(),
      score,
      bbox: bbox.into(),
      id: None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl From<Vec<DetectItem>> for DetectResult {
  fn from(items: Vec<DetectItem>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

mod scene_graph;
pub use self::scene_graph::{SceneGraphModel, SceneGraphModelBuilder, SceneGraphModelError};

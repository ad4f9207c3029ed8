// 该文件是 Shanan （山南西风） 项目的一部分。
// src/scene.rs - 场景图定义
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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::detection::Detection;
use crate::relation::{RelationEngine, RelationshipTriple};

/// 没有任何关系时交给描述生成方的默认文本
pub const NO_RELATIONSHIP_DESCRIPTION: &str = "No clear relationships found between the objects.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
  pub id: String,
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

impl From<&Detection> for SceneObject {
  fn from(det: &Detection) -> Self {
    Self {
      id: det.unique_id.clone(),
      x: det.bbox.xmin,
      y: det.bbox.ymin,
      width: det.bbox.width(),
      height: det.bbox.height(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
  pub objects: Vec<SceneObject>,
  pub relationships: BTreeSet<RelationshipTriple>,
}

impl SceneGraph {
  pub fn build(detections: &[Detection], engine: &RelationEngine) -> Self {
    Self {
      objects: detections.iter().map(SceneObject::from).collect(),
      relationships: engine.relationships(detections),
    }
  }

  pub fn relationship_strings(&self) -> Vec<String> {
    self.relationships.iter().map(ToString::to_string).collect()
  }

  /// 交给文本摘要方的输入：关系以 `". "` 连接并以句号结尾
  pub fn summary_input(&self) -> Option<String> {
    if self.relationships.is_empty() {
      return None;
    }
    Some(format!("{}.", self.relationship_strings().join(". ")))
  }

  pub fn description(&self) -> String {
    self
      .summary_input()
      .unwrap_or_else(|| NO_RELATIONSHIP_DESCRIPTION.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rider() -> Vec<Detection> {
    vec![
      Detection::new("person_1", "person", 0.9, [0.0, 0.0, 100.0, 200.0]),
      Detection::new("horse_1", "horse", 0.8, [0.0, 150.0, 150.0, 300.0]),
    ]
  }

  #[test]
  fn objects_keep_detection_order() {
    let graph = SceneGraph::build(&rider(), &RelationEngine::default());
    assert_eq!(graph.objects.len(), 2);
    assert_eq!(
      graph.objects[1],
      SceneObject {
        id: "horse_1".to_string(),
        x: 0.0,
        y: 150.0,
        width: 150.0,
        height: 150.0,
      }
    );
    assert_eq!(graph.relationship_strings(), ["person_1 on horse_1"]);
  }

  #[test]
  fn summary_text() {
    let graph = SceneGraph::build(&rider(), &RelationEngine::default());
    assert_eq!(graph.summary_input().as_deref(), Some("person_1 on horse_1."));

    let empty = SceneGraph::default();
    assert_eq!(empty.summary_input(), None);
    assert_eq!(empty.description(), NO_RELATIONSHIP_DESCRIPTION);
  }

  #[test]
  fn json_shape() {
    let graph = SceneGraph::build(&rider(), &RelationEngine::default());
    let value = serde_json::to_value(&graph).unwrap();
    assert_eq!(value["objects"][0]["id"], "person_1");
    assert_eq!(value["objects"][0]["height"], 200.0);
    assert_eq!(value["relationships"][0], "person_1 on horse_1");

    let back: SceneGraph = serde_json::from_value(value).unwrap();
    assert_eq!(back, graph);
  }
}

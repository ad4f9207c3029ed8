// 该文件是 Shanan （山南西风） 项目的一部分。
// src/relation/assemble.rs - 两两配对生成初始关系
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

use tracing::debug;

use crate::config::SceneConfig;
use crate::detection::Detection;
use crate::relation::{RelationshipTriple, SemanticGate, SpatialClassifier};

/// 对输入中每一对 `(i, j)`（`i < j`）依次做空间分类与语义过滤
///
/// 只评估 i 相对 j 的方向；词表之外的谓词被丢弃。
pub fn assemble(detections: &[Detection], config: &SceneConfig) -> Vec<RelationshipTriple> {
  let classifier = SpatialClassifier::from(config);
  let gate = SemanticGate::new(config);
  let mut relations = Vec::new();

  for (i, a) in detections.iter().enumerate() {
    for b in &detections[i + 1..] {
      let Some(spatial) = classifier.classify(&a.bbox, &b.bbox) else {
        continue;
      };
      let Some(predicate) = gate.gate(a, b, spatial) else {
        continue;
      };
      if !config.vocabulary.contains(predicate) {
        debug!(
          "{} -> {}: 谓词 {} 不在词表中，丢弃",
          a.unique_id, b.unique_id, predicate
        );
        continue;
      }
      relations.push(RelationshipTriple::new(
        a.unique_id.as_str(),
        predicate,
        b.unique_id.as_str(),
      ));
    }
  }

  relations
}

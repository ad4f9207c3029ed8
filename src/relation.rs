// 该文件是 Shanan （山南西风） 项目的一部分。
// src/relation.rs - 关系三元组与关系推理引擎
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
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::config::SceneConfig;
use crate::detection::Detection;
use crate::predicate::Predicate;

pub mod assemble;
pub mod semantic;
pub mod spatial;
pub mod transitive;

pub use self::assemble::assemble;
pub use self::semantic::SemanticGate;
pub use self::spatial::SpatialClassifier;
pub use self::transitive::expand;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无法解析关系三元组: '{0}'")]
pub struct TripleParseError(pub String);

/// `主语 谓词 宾语` 关系三元组
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipTriple {
  pub subject: String,
  pub predicate: Predicate,
  pub object: String,
}

impl RelationshipTriple {
  pub fn new(subject: impl Into<String>, predicate: Predicate, object: impl Into<String>) -> Self {
    Self {
      subject: subject.into(),
      predicate,
      object: object.into(),
    }
  }
}

impl fmt::Display for RelationshipTriple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.subject, self.predicate, self.object)
  }
}

impl FromStr for RelationshipTriple {
  type Err = TripleParseError;

  /// 编号可能包含空格（如 `traffic light_1`），因此按谓词词组切分，长词组优先
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut predicates = Predicate::ALL;
    predicates.sort_by_key(|p| std::cmp::Reverse(p.as_str().len()));

    for predicate in predicates {
      let separator = format!(" {} ", predicate.as_str());
      if let Some((subject, object)) = s.split_once(separator.as_str())
        && !subject.is_empty()
        && !object.is_empty()
      {
        return Ok(RelationshipTriple::new(subject, predicate, object));
      }
    }
    Err(TripleParseError(s.to_string()))
  }
}

impl Serialize for RelationshipTriple {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for RelationshipTriple {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
  }
}

/// 关系推理引擎：空间分类 → 语义过滤 → 传递推导 → 去重
#[derive(Debug, Clone, Default)]
pub struct RelationEngine {
  config: SceneConfig,
}

impl RelationEngine {
  pub fn new(config: SceneConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SceneConfig {
    &self.config
  }

  pub fn relationships(&self, detections: &[Detection]) -> BTreeSet<RelationshipTriple> {
    let initial = assemble(detections, &self.config);
    let expanded = expand(&initial, self.config.self_loops, self.config.expansion);
    debug!(
      "初始关系 {} 条, 推导后 {} 条",
      initial.len(),
      expanded.len()
    );
    expanded.into_iter().collect()
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/relation/semantic.rs - 语义合理性过滤
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

use crate::config::{MismatchPolicy, PairPolicy, SceneConfig};
use crate::detection::Detection;
use crate::predicate::{Predicate, SpatialPredicate};

/// 用语义表和标签覆盖规则检查一条空间关系
pub struct SemanticGate<'a> {
  config: &'a SceneConfig,
}

impl<'a> SemanticGate<'a> {
  pub fn new(config: &'a SceneConfig) -> Self {
    Self { config }
  }

  /// 返回 A 与 B 之间最终输出的谓词，`None` 表示丢弃
  pub fn gate(&self, a: &Detection, b: &Detection, spatial: SpatialPredicate) -> Option<Predicate> {
    let table = &self.config.plausibility;
    let mut restricted = false;

    match table.policy(&a.label, &b.label) {
      PairPolicy::Restricted(allowed) => {
        if allowed.contains(&Predicate::from(spatial)) {
          return Some(spatial.into());
        }
        restricted = true;
      }
      PairPolicy::Unrestricted => {
        if let reverse @ PairPolicy::Restricted(_) = table.policy(&b.label, &a.label) {
          // 以反向谓词查表，但输出的仍是原始谓词
          if let Some(reversed) = self.config.reversal.reverse(spatial)
            && reverse.permits(reversed.into())
          {
            return Some(spatial.into());
          }
          restricted = true;
        }
      }
    }

    if let Some(rule) = self
      .config
      .overrides
      .iter()
      .find(|rule| rule.matches(&a.label, &b.label))
    {
      debug!(
        "{} -> {}: 语义覆盖 {} => {}",
        a.unique_id, b.unique_id, spatial, rule.predicate
      );
      return Some(rule.predicate);
    }

    if restricted && self.config.known_pair_mismatch == MismatchPolicy::Reject {
      debug!(
        "{} -> {}: 标签对 ({}, {}) 不允许 {}",
        a.unique_id, b.unique_id, a.label, b.label, spatial
      );
      return None;
    }

    Some(spatial.into())
  }
}

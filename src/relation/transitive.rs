// 该文件是 Shanan （山南西风） 项目的一部分。
// src/relation/transitive.rs - 传递推导 "is near" 关系
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

use std::collections::HashSet;

use tracing::debug;

use crate::config::{ExpansionMode, SelfLoopPolicy};
use crate::predicate::Predicate;
use crate::relation::RelationshipTriple;

/// 输出以初始关系开头，后接推导出的 `A is near C`（由 `A r1 B`、`B r2 C` 得出）
pub fn expand(
  initial: &[RelationshipTriple],
  self_loops: SelfLoopPolicy,
  mode: ExpansionMode,
) -> Vec<RelationshipTriple> {
  let mut output = initial.to_vec();
  let mut present: HashSet<RelationshipTriple> = output.iter().cloned().collect();

  let added = expand_pass(initial, self_loops, &mut output, &mut present);
  debug!("传递推导第 1 轮新增 {} 条关系", added);

  if mode == ExpansionMode::Fixed {
    let mut round = 1;
    let mut last = added;
    while last > 0 {
      round += 1;
      let snapshot = output.clone();
      last = expand_pass(&snapshot, self_loops, &mut output, &mut present);
      debug!("传递推导第 {} 轮新增 {} 条关系", round, last);
    }
  }

  output
}

/// 在 `source` 的所有有序对上推导一次，返回新增条数
fn expand_pass(
  source: &[RelationshipTriple],
  self_loops: SelfLoopPolicy,
  output: &mut Vec<RelationshipTriple>,
  present: &mut HashSet<RelationshipTriple>,
) -> usize {
  let mut added = 0;
  for r1 in source {
    for r2 in source {
      if r1.object != r2.subject {
        continue;
      }
      if self_loops == SelfLoopPolicy::Drop && r1.subject == r2.object {
        continue;
      }
      let derived = RelationshipTriple::new(r1.subject.as_str(), Predicate::IsNear, r2.object.as_str());
      if present.insert(derived.clone()) {
        output.push(derived);
        added += 1;
      }
    }
  }
  added
}

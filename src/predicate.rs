// 该文件是 Shanan （山南西风） 项目的一部分。
// src/predicate.rs - 关系谓词词表
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

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的关系谓词: '{0}'")]
pub struct UnknownPredicate(pub String);

/// 几何规则可以得出的空间关系，从主语框的角度描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpatialPredicate {
  On,
  Under,
  Inside,
  Contains,
  LeftOf,
  RightOf,
  NextTo,
}

impl SpatialPredicate {
  pub const ALL: [SpatialPredicate; 7] = [
    SpatialPredicate::On,
    SpatialPredicate::Under,
    SpatialPredicate::Inside,
    SpatialPredicate::Contains,
    SpatialPredicate::LeftOf,
    SpatialPredicate::RightOf,
    SpatialPredicate::NextTo,
  ];

  pub fn as_str(&self) -> &'static str {
    Predicate::from(*self).as_str()
  }
}

/// 场景图中可输出的全部谓词
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Predicate {
  On,
  Under,
  Inside,
  Contains,
  LeftOf,
  RightOf,
  NextTo,
  Wearing,
  Holding,
  IsNear,
}

impl Predicate {
  pub const ALL: [Predicate; 10] = [
    Predicate::On,
    Predicate::Under,
    Predicate::Inside,
    Predicate::Contains,
    Predicate::LeftOf,
    Predicate::RightOf,
    Predicate::NextTo,
    Predicate::Wearing,
    Predicate::Holding,
    Predicate::IsNear,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Predicate::On => "on",
      Predicate::Under => "under",
      Predicate::Inside => "inside",
      Predicate::Contains => "contains",
      Predicate::LeftOf => "left of",
      Predicate::RightOf => "right of",
      Predicate::NextTo => "next to",
      Predicate::Wearing => "wearing",
      Predicate::Holding => "holding",
      Predicate::IsNear => "is near",
    }
  }

  /// 对应的空间谓词；语义覆盖和推导出的谓词返回 `None`
  pub fn spatial(&self) -> Option<SpatialPredicate> {
    match self {
      Predicate::On => Some(SpatialPredicate::On),
      Predicate::Under => Some(SpatialPredicate::Under),
      Predicate::Inside => Some(SpatialPredicate::Inside),
      Predicate::Contains => Some(SpatialPredicate::Contains),
      Predicate::LeftOf => Some(SpatialPredicate::LeftOf),
      Predicate::RightOf => Some(SpatialPredicate::RightOf),
      Predicate::NextTo => Some(SpatialPredicate::NextTo),
      Predicate::Wearing | Predicate::Holding | Predicate::IsNear => None,
    }
  }
}

impl From<SpatialPredicate> for Predicate {
  fn from(spatial: SpatialPredicate) -> Self {
    match spatial {
      SpatialPredicate::On => Predicate::On,
      SpatialPredicate::Under => Predicate::Under,
      SpatialPredicate::Inside => Predicate::Inside,
      SpatialPredicate::Contains => Predicate::Contains,
      SpatialPredicate::LeftOf => Predicate::LeftOf,
      SpatialPredicate::RightOf => Predicate::RightOf,
      SpatialPredicate::NextTo => Predicate::NextTo,
    }
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Display for SpatialPredicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Predicate {
  type Err = UnknownPredicate;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let word = s.trim();
    Predicate::ALL
      .iter()
      .copied()
      .find(|p| p.as_str() == word)
      .ok_or_else(|| UnknownPredicate(s.to_string()))
  }
}

impl FromStr for SpatialPredicate {
  type Err = UnknownPredicate;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Predicate::from_str(s)?
      .spatial()
      .ok_or_else(|| UnknownPredicate(s.to_string()))
  }
}

macro_rules! serde_as_word {
  ($ty:ty) => {
    impl Serialize for $ty {
      fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
      }
    }

    impl<'de> Deserialize<'de> for $ty {
      fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let word = String::deserialize(deserializer)?;
        word.parse().map_err(serde::de::Error::custom)
      }
    }
  };
}

serde_as_word!(Predicate);
serde_as_word!(SpatialPredicate);

/// 对称谓词反转表，用于以反向标签对查询语义表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReversalMap {
  map: BTreeMap<SpatialPredicate, SpatialPredicate>,
}

impl Default for ReversalMap {
  fn default() -> Self {
    use SpatialPredicate::*;
    Self::from_pairs([
      (On, Under),
      (Under, On),
      (LeftOf, RightOf),
      (RightOf, LeftOf),
      (Inside, Contains),
      (Contains, Inside),
      (NextTo, NextTo),
    ])
  }
}

impl ReversalMap {
  pub fn from_pairs(pairs: impl IntoIterator<Item = (SpatialPredicate, SpatialPredicate)>) -> Self {
    Self {
      map: pairs.into_iter().collect(),
    }
  }

  pub fn reverse(&self, spatial: SpatialPredicate) -> Option<SpatialPredicate> {
    self.map.get(&spatial).copied()
  }
}

/// 引擎允许输出的谓词集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
  predicates: BTreeSet<Predicate>,
}

impl Default for Vocabulary {
  fn default() -> Self {
    use Predicate::*;
    Self::new([
      On, Under, Inside, Contains, LeftOf, RightOf, NextTo, Wearing, Holding,
    ])
  }
}

impl Vocabulary {
  pub fn new(predicates: impl IntoIterator<Item = Predicate>) -> Self {
    Self {
      predicates: predicates.into_iter().collect(),
    }
  }

  pub fn contains(&self, predicate: Predicate) -> bool {
    self.predicates.contains(&predicate)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn words_round_trip_through_from_str() {
    for p in Predicate::ALL {
      assert_eq!(p.as_str().parse::<Predicate>().unwrap(), p);
    }
    assert_eq!(
      "left of".parse::<SpatialPredicate>().unwrap(),
      SpatialPredicate::LeftOf
    );
  }

  #[test]
  fn semantic_words_are_not_spatial() {
    assert!("wearing".parse::<SpatialPredicate>().is_err());
    assert!("is near".parse::<SpatialPredicate>().is_err());
    assert!("beside".parse::<Predicate>().is_err());
  }

  #[test]
  fn default_reversal_is_an_involution() {
    let map = ReversalMap::default();
    for s in SpatialPredicate::ALL {
      let reversed = map.reverse(s).unwrap();
      assert_eq!(map.reverse(reversed), Some(s));
    }
    assert_eq!(
      map.reverse(SpatialPredicate::NextTo),
      Some(SpatialPredicate::NextTo)
    );
  }

  #[test]
  fn default_vocabulary_excludes_derived_near() {
    let vocabulary = Vocabulary::default();
    assert!(vocabulary.contains(Predicate::Contains));
    assert!(vocabulary.contains(Predicate::Holding));
    assert!(!vocabulary.contains(Predicate::IsNear));
  }

  #[test]
  fn serde_uses_relation_words() {
    let json = serde_json::to_string(&Predicate::RightOf).unwrap();
    assert_eq!(json, "\"right of\"");
    let map: ReversalMap = serde_json::from_str(r#"{"on": "under"}"#).unwrap();
    assert_eq!(
      map.reverse(SpatialPredicate::On),
      Some(SpatialPredicate::Under)
    );
    assert_eq!(map.reverse(SpatialPredicate::Under), None);
  }
}

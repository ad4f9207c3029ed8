// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 场景图引擎配置
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

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::predicate::{Predicate, ReversalMap, Vocabulary};

pub const DEFAULT_CONTAINMENT_IOU: f32 = 0.8;
pub const DEFAULT_PROXIMITY_PX: f32 = 50.0;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("无法读取配置文件 {0}: {1}")]
  Read(String, std::io::Error),
  #[error("无法解析配置文件 {0}: {1}")]
  Parse(String, serde_json::Error),
  #[error("配置项 {0} 的取值无效: '{1}'")]
  InvalidValue(&'static str, String),
}

/// 某个有序标签对的语义策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairPolicy<'a> {
  /// 表中登记的标签对，只允许集合内的谓词
  Restricted(&'a BTreeSet<Predicate>),
  /// 未登记的标签对，任何空间谓词都放行
  Unrestricted,
}

impl PairPolicy<'_> {
  pub fn permits(&self, predicate: Predicate) -> bool {
    match self {
      PairPolicy::Restricted(set) => set.contains(&predicate),
      PairPolicy::Unrestricted => true,
    }
  }

  pub fn is_restricted(&self) -> bool {
    matches!(self, PairPolicy::Restricted(_))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlausibilityEntry {
  pub subject: String,
  pub object: String,
  pub predicates: BTreeSet<Predicate>,
}

/// 语义合理性表：`(主语标签, 宾语标签) -> 允许的谓词集合`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlausibilityTable {
  entries: HashMap<(String, String), BTreeSet<Predicate>>,
}

impl Default for PlausibilityTable {
  fn default() -> Self {
    use Predicate::*;
    Self::from_entries([
      ("person", "horse", vec![On]),
      ("person", "car", vec![Inside]),
      ("car", "road", vec![On]),
      ("person", "bicycle", vec![On]),
      ("bottle", "table", vec![On]),
      ("laptop", "table", vec![On]),
      ("cup", "table", vec![On]),
      ("person", "hat", vec![Wearing]),
      ("person", "backpack", vec![Wearing]),
      ("person", "handbag", vec![Holding]),
      ("person", "suitcase", vec![Holding]),
    ])
  }
}

impl PlausibilityTable {
  pub fn empty() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  pub fn from_entries<S, O, P>(entries: impl IntoIterator<Item = (S, O, P)>) -> Self
  where
    S: Into<String>,
    O: Into<String>,
    P: IntoIterator<Item = Predicate>,
  {
    let mut table = Self::empty();
    for (subject, object, predicates) in entries {
      table.insert(subject, object, predicates);
    }
    table
  }

  /// 登记标签对；已存在的标签对会合并谓词集合
  pub fn insert(
    &mut self,
    subject: impl Into<String>,
    object: impl Into<String>,
    predicates: impl IntoIterator<Item = Predicate>,
  ) {
    self
      .entries
      .entry((subject.into(), object.into()))
      .or_default()
      .extend(predicates);
  }

  pub fn policy(&self, subject: &str, object: &str) -> PairPolicy<'_> {
    // HashMap<(String, String), _> 无法用 (&str, &str) 借用查询
    match self
      .entries
      .get(&(subject.to_string(), object.to_string()))
    {
      Some(set) => PairPolicy::Restricted(set),
      None => PairPolicy::Unrestricted,
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn to_entries(&self) -> Vec<PlausibilityEntry> {
    let mut entries: Vec<_> = self
      .entries
      .iter()
      .map(|((subject, object), predicates)| PlausibilityEntry {
        subject: subject.clone(),
        object: object.clone(),
        predicates: predicates.clone(),
      })
      .collect();
    entries.sort_by(|a, b| (&a.subject, &a.object).cmp(&(&b.subject, &b.object)));
    entries
  }
}

impl Serialize for PlausibilityTable {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_entries().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for PlausibilityTable {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let entries = Vec::<PlausibilityEntry>::deserialize(deserializer)?;
    Ok(Self::from_entries(
      entries
        .into_iter()
        .map(|e| (e.subject, e.object, e.predicates)),
    ))
  }
}

/// 标签覆盖规则：主语标签与宾语标签命中时，直接输出给定谓词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticOverride {
  pub subject: String,
  pub objects: BTreeSet<String>,
  pub predicate: Predicate,
}

impl SemanticOverride {
  pub fn new<I, S>(subject: impl Into<String>, objects: I, predicate: Predicate) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      subject: subject.into(),
      objects: objects.into_iter().map(Into::into).collect(),
      predicate,
    }
  }

  pub fn matches(&self, subject: &str, object: &str) -> bool {
    self.subject == subject && self.objects.contains(object)
  }
}

pub fn default_overrides() -> Vec<SemanticOverride> {
  vec![
    SemanticOverride::new("person", ["hat", "backpack"], Predicate::Wearing),
    SemanticOverride::new("person", ["handbag", "suitcase"], Predicate::Holding),
  ]
}

/// 标签对已登记但空间谓词不在允许集合中、且没有语义覆盖时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
  #[default]
  Reject,
  Accept,
}

/// 传递推导时是否保留 `X is near X`
///
/// 引擎只产生 i<j 方向的初始关系，不会出现 `X r Y`、`Y r X` 成环，
/// 因此该选项只对直接调用 [`crate::relation::expand`] 的外部关系列表生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
  #[default]
  Keep,
  Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMode {
  /// 只在初始关系上做一次推导
  #[default]
  Single,
  /// 反复推导直到不再产生新关系
  Fixed,
}

macro_rules! parse_word_enum {
  ($ty:ty, $key:literal, { $($word:literal => $variant:expr),+ $(,)? }) => {
    impl FromStr for $ty {
      type Err = ConfigError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($word => Ok($variant),)+
          _ => Err(ConfigError::InvalidValue($key, s.to_string())),
        }
      }
    }
  };
}

parse_word_enum!(MismatchPolicy, "mismatch", {
  "reject" => MismatchPolicy::Reject,
  "accept" => MismatchPolicy::Accept,
});
parse_word_enum!(SelfLoopPolicy, "self_loops", {
  "keep" => SelfLoopPolicy::Keep,
  "drop" => SelfLoopPolicy::Drop,
});
parse_word_enum!(ExpansionMode, "expansion", {
  "single" => ExpansionMode::Single,
  "fixed" => ExpansionMode::Fixed,
});

/// 关系推理引擎的不可变配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
  pub containment_iou: f32,
  pub proximity_px: f32,
  pub vocabulary: Vocabulary,
  pub plausibility: PlausibilityTable,
  pub reversal: ReversalMap,
  pub overrides: Vec<SemanticOverride>,
  pub known_pair_mismatch: MismatchPolicy,
  pub self_loops: SelfLoopPolicy,
  pub expansion: ExpansionMode,
}

impl Default for SceneConfig {
  fn default() -> Self {
    Self {
      containment_iou: DEFAULT_CONTAINMENT_IOU,
      proximity_px: DEFAULT_PROXIMITY_PX,
      vocabulary: Vocabulary::default(),
      plausibility: PlausibilityTable::default(),
      reversal: ReversalMap::default(),
      overrides: default_overrides(),
      known_pair_mismatch: MismatchPolicy::default(),
      self_loops: SelfLoopPolicy::default(),
      expansion: ExpansionMode::default(),
    }
  }
}

impl SceneConfig {
  pub fn from_json_str(name: &str, data: &str) -> Result<Self, ConfigError> {
    let config: SceneConfig =
      serde_json::from_str(data).map_err(|e| ConfigError::Parse(name.to_string(), e))?;
    config.validate()?;
    debug!(
      "配置 {}: IoU 阈值 {}, 邻近阈值 {}px, 语义表 {} 项",
      name,
      config.containment_iou,
      config.proximity_px,
      config.plausibility.len()
    );
    Ok(config)
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    info!("加载场景图配置: {}", path.display());
    let data = std::fs::read_to_string(path)
      .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
    Self::from_json_str(&path.display().to_string(), &data)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(self.containment_iou.is_finite() && (0.0..=1.0).contains(&self.containment_iou)) {
      return Err(ConfigError::InvalidValue(
        "containment_iou",
        self.containment_iou.to_string(),
      ));
    }
    if !(self.proximity_px.is_finite() && self.proximity_px >= 0.0) {
      return Err(ConfigError::InvalidValue(
        "proximity_px",
        self.proximity_px.to_string(),
      ));
    }
    Ok(())
  }

  pub fn with_plausibility(mut self, table: PlausibilityTable) -> Self {
    self.plausibility = table;
    self
  }

  pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
    self.vocabulary = vocabulary;
    self
  }

  pub fn with_reversal(mut self, reversal: ReversalMap) -> Self {
    self.reversal = reversal;
    self
  }

  pub fn with_overrides(mut self, overrides: Vec<SemanticOverride>) -> Self {
    self.overrides = overrides;
    self
  }

  pub fn with_known_pair_mismatch(mut self, policy: MismatchPolicy) -> Self {
    self.known_pair_mismatch = policy;
    self
  }

  pub fn with_self_loops(mut self, policy: SelfLoopPolicy) -> Self {
    self.self_loops = policy;
    self
  }

  pub fn with_expansion(mut self, mode: ExpansionMode) -> Self {
    self.expansion = mode;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_table_matches_known_pairs() {
    let table = PlausibilityTable::default();
    assert_eq!(table.len(), 11);
    assert!(table.policy("person", "horse").permits(Predicate::On));
    assert!(!table.policy("person", "horse").permits(Predicate::Under));
    assert_eq!(table.policy("horse", "person"), PairPolicy::Unrestricted);
    assert!(table.policy("dog", "sofa").permits(Predicate::LeftOf));
  }

  #[test]
  fn partial_json_keeps_defaults() {
    let config = SceneConfig::from_json_str("inline", r#"{"proximity_px": 20}"#).unwrap();
    assert_eq!(config.proximity_px, 20.0);
    assert_eq!(config.containment_iou, DEFAULT_CONTAINMENT_IOU);
    assert_eq!(config.plausibility, PlausibilityTable::default());
  }

  #[test]
  fn json_table_replaces_default() {
    let config = SceneConfig::from_json_str(
      "inline",
      r#"{
        "plausibility": [
          {"subject": "cat", "object": "sofa", "predicates": ["on", "next to"]}
        ],
        "self_loops": "drop",
        "known_pair_mismatch": "accept"
      }"#,
    )
    .unwrap();
    assert_eq!(config.plausibility.len(), 1);
    assert!(config.plausibility.policy("cat", "sofa").permits(Predicate::NextTo));
    assert!(!config.plausibility.policy("person", "horse").is_restricted());
    assert_eq!(config.self_loops, SelfLoopPolicy::Drop);
    assert_eq!(config.known_pair_mismatch, MismatchPolicy::Accept);
  }

  #[test]
  fn unknown_predicate_is_rejected() {
    let err = SceneConfig::from_json_str(
      "inline",
      r#"{"plausibility": [{"subject": "a", "object": "b", "predicates": ["beside"]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
  }

  #[test]
  fn out_of_range_threshold_is_rejected() {
    let err = SceneConfig::from_json_str("inline", r#"{"containment_iou": 1.5}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue("containment_iou", _)));
  }

  #[test]
  fn overrides_load_from_json() {
    let config = SceneConfig::from_json_str(
      "inline",
      r#"{"overrides": [{"subject": "dog", "objects": ["leash"], "predicate": "wearing"}]}"#,
    )
    .unwrap();
    assert_eq!(config.overrides.len(), 1);
    assert!(config.overrides[0].matches("dog", "leash"));
    assert!(!config.overrides[0].matches("person", "hat"));
    assert_eq!(SceneConfig::default().overrides, default_overrides());
  }

  #[test]
  fn policy_words_parse() {
    assert_eq!("drop".parse::<SelfLoopPolicy>().unwrap(), SelfLoopPolicy::Drop);
    assert_eq!("fixed".parse::<ExpansionMode>().unwrap(), ExpansionMode::Fixed);
    assert!("maybe".parse::<MismatchPolicy>().is_err());
  }
}

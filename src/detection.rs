// 该文件是 Shanan （山南西风） 项目的一部分。
// src/detection.rs - 检测结果整理：唯一编号与坐标缩放
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

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::BBox;
use crate::model::DetectItem;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
  #[error("同一帧中存在重复的对象编号: {0}")]
  DuplicateId(String),
  #[error("无效的缩放尺寸: '{0}'")]
  InvalidScale(String),
}

/// 带唯一编号的检测对象，坐标位于原图像素空间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  #[serde(rename = "id")]
  pub unique_id: String,
  pub label: String,
  pub confidence: f32,
  #[serde(rename = "box")]
  pub bbox: BBox,
}

impl Detection {
  pub fn new(
    unique_id: impl Into<String>,
    label: impl Into<String>,
    confidence: f32,
    bbox: impl Into<BBox>,
  ) -> Self {
    Self {
      unique_id: unique_id.into(),
      label: label.into(),
      confidence,
      bbox: bbox.into(),
    }
  }
}

/// 一帧图像整理后的检测集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
  pub name: String,
  pub detections: Vec<Detection>,
}

impl DetectionFrame {
  pub fn new(name: impl Into<String>, detections: Vec<Detection>) -> Self {
    Self {
      name: name.into(),
      detections,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.detections.is_empty()
  }
}

/// 按 `标签_序号` 规则为检测结果分配编号，序号按标签单独从 1 计数
///
/// 已携带编号的条目保留原编号，但仍计入该标签的序号。
pub fn assign_unique_ids(items: &[DetectItem]) -> Result<Vec<Detection>, DetectionError> {
  let mut counters: HashMap<&str, usize> = HashMap::new();
  let mut seen = HashSet::new();
  let mut detections = Vec::with_capacity(items.len());

  for item in items {
    let ordinal = counters.entry(item.label.as_str()).or_insert(0);
    *ordinal += 1;

    let unique_id = match &item.id {
      Some(id) => id.clone(),
      None => format!("{}_{}", item.label, ordinal),
    };
    if !seen.insert(unique_id.clone()) {
      return Err(DetectionError::DuplicateId(unique_id));
    }

    detections.push(Detection {
      unique_id,
      label: item.label.clone(),
      confidence: item.score,
      bbox: item.bbox,
    });
  }

  debug!("已为 {} 个检测结果分配编号", detections.len());
  Ok(detections)
}

/// 检查一组检测结果的编号是否唯一
pub fn ensure_unique_ids(detections: &[Detection]) -> Result<(), DetectionError> {
  let mut seen = HashSet::new();
  for det in detections {
    if !seen.insert(det.unique_id.as_str()) {
      return Err(DetectionError::DuplicateId(det.unique_id.clone()));
    }
  }
  Ok(())
}

/// 图像尺寸，文本形式为 `WxH`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  pub width: f32,
  pub height: f32,
}

impl FromStr for Size {
  type Err = DetectionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || DetectionError::InvalidScale(s.to_string());
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: f32 = w.trim().parse().map_err(|_| invalid())?;
    let height: f32 = h.trim().parse().map_err(|_| invalid())?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
      return Err(invalid());
    }
    Ok(Size { width, height })
  }
}

/// 将检测器坐标空间（如 640x640 模型输入，或归一化的 1x1）映射回原图
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
  source: Size,
  target: Size,
}

impl Rescale {
  pub fn new(source: Size, target: Size) -> Self {
    Self { source, target }
  }

  /// 缩放后向零截断为整数像素
  pub fn apply(&self, bbox: BBox) -> BBox {
    let sx = self.target.width / self.source.width;
    let sy = self.target.height / self.source.height;
    BBox::new(
      (bbox.xmin * sx).trunc(),
      (bbox.ymin * sy).trunc(),
      (bbox.xmax * sx).trunc(),
      (bbox.ymax * sy).trunc(),
    )
  }

  pub fn apply_all(&self, items: &mut [DetectItem]) {
    for item in items.iter_mut() {
      item.bbox = self.apply(item.bbox);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(label: &str) -> DetectItem {
    DetectItem::new(label, 0.9, [0.0, 0.0, 10.0, 10.0])
  }

  #[test]
  fn ids_count_per_label() {
    let items = [item("person"), item("car"), item("person"), item("traffic light")];
    let ids: Vec<_> = assign_unique_ids(&items)
      .unwrap()
      .into_iter()
      .map(|d| d.unique_id)
      .collect();
    assert_eq!(ids, ["person_1", "car_1", "person_2", "traffic light_1"]);
  }

  #[test]
  fn explicit_ids_are_kept_and_checked() {
    let mut items = vec![item("person"), item("person")];
    items[0].id = Some("alice".to_string());
    let dets = assign_unique_ids(&items).unwrap();
    assert_eq!(dets[0].unique_id, "alice");
    assert_eq!(dets[1].unique_id, "person_2");

    items[0].id = Some("person_2".to_string());
    assert_eq!(
      assign_unique_ids(&items).unwrap_err(),
      DetectionError::DuplicateId("person_2".to_string())
    );
  }

  #[test]
  fn rescale_truncates_to_pixels() {
    let rescale = Rescale::new("640x640".parse().unwrap(), "1280x960".parse().unwrap());
    let bbox = rescale.apply(BBox::new(10.3, 10.3, 100.9, 200.0));
    assert_eq!(bbox, BBox::new(20.0, 15.0, 201.0, 300.0));
  }

  #[test]
  fn normalized_source() {
    let rescale = Rescale::new("1x1".parse().unwrap(), "200x100".parse().unwrap());
    assert_eq!(
      rescale.apply(BBox::new(0.25, 0.5, 0.75, 1.0)),
      BBox::new(50.0, 50.0, 150.0, 100.0)
    );
  }

  #[test]
  fn bad_sizes_are_rejected() {
    assert!("640".parse::<Size>().is_err());
    assert!("0x480".parse::<Size>().is_err());
    assert!("axb".parse::<Size>().is_err());
  }

  #[test]
  fn duplicate_ids_are_detected() {
    let dets = vec![
      Detection::new("a", "cup", 0.5, [0.0, 0.0, 1.0, 1.0]),
      Detection::new("a", "cup", 0.5, [0.0, 0.0, 1.0, 1.0]),
    ];
    assert!(ensure_unique_ids(&dets).is_err());
    assert!(ensure_unique_ids(&dets[..1]).is_ok());
  }
}

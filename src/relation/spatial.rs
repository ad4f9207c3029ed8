// 该文件是 Shanan （山南西风） 项目的一部分。
// src/relation/spatial.rs - 空间关系分类
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

use crate::config::{DEFAULT_CONTAINMENT_IOU, DEFAULT_PROXIMITY_PX, SceneConfig};
use crate::geometry::BBox;
use crate::predicate::SpatialPredicate;

/// 按固定优先级的几何规则判断 A 相对 B 的空间关系
///
/// 结果从 A 的角度表述，交换参数顺序可能得到不同的谓词。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialClassifier {
  pub containment_iou: f32,
  pub proximity_px: f32,
}

impl Default for SpatialClassifier {
  fn default() -> Self {
    Self {
      containment_iou: DEFAULT_CONTAINMENT_IOU,
      proximity_px: DEFAULT_PROXIMITY_PX,
    }
  }
}

impl From<&SceneConfig> for SpatialClassifier {
  fn from(config: &SceneConfig) -> Self {
    Self {
      containment_iou: config.containment_iou,
      proximity_px: config.proximity_px,
    }
  }
}

impl SpatialClassifier {
  pub fn classify(&self, a: &BBox, b: &BBox) -> Option<SpatialPredicate> {
    let iou = a.iou(b);

    // 1. 高度重合：面积小的在内部，面积相等视为包含
    if iou > self.containment_iou {
      return if a.area() < b.area() {
        Some(SpatialPredicate::Inside)
      } else {
        Some(SpatialPredicate::Contains)
      };
    }

    // 2. 垂直方向有重叠且水平中心对齐（图像坐标 y 向下）
    if a.vertical_overlap(b) > 0.0 && (a.center_x() - b.center_x()).abs() < a.width() / 2.0 {
      return if a.ymax < b.ymax {
        Some(SpatialPredicate::On)
      } else {
        Some(SpatialPredicate::Under)
      };
    }

    // 3. 水平方向完全分离
    if a.xmax < b.xmin {
      return Some(SpatialPredicate::LeftOf);
    }
    if a.xmin > b.xmax {
      return Some(SpatialPredicate::RightOf);
    }

    // 4. 不相交但水平边缘足够接近
    if iou == 0.0 && a.horizontal_gap(b) < self.proximity_px {
      return Some(SpatialPredicate::NextTo);
    }

    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classify(a: [f32; 4], b: [f32; 4]) -> Option<SpatialPredicate> {
    SpatialClassifier::default().classify(&a.into(), &b.into())
  }

  #[test]
  fn rider_is_on_horse() {
    let person = [0.0, 0.0, 100.0, 200.0];
    let horse = [0.0, 150.0, 150.0, 300.0];
    assert_eq!(classify(person, horse), Some(SpatialPredicate::On));
    assert_eq!(classify(horse, person), Some(SpatialPredicate::Under));
  }

  #[test]
  fn containment_picks_smaller_as_inside() {
    let big = [0.0, 0.0, 100.0, 100.0];
    let small = [0.0, 0.0, 95.0, 95.0];
    assert_eq!(classify(small, big), Some(SpatialPredicate::Inside));
    assert_eq!(classify(big, small), Some(SpatialPredicate::Contains));
  }

  #[test]
  fn equal_area_containment_is_contains_both_ways() {
    let a = [0.0, 0.0, 100.0, 100.0];
    let b = [2.0, 0.0, 102.0, 100.0];
    assert_eq!(classify(a, b), Some(SpatialPredicate::Contains));
    assert_eq!(classify(b, a), Some(SpatialPredicate::Contains));
  }

  #[test]
  fn containment_threshold_is_strict_and_configurable() {
    let a = [0.0, 0.0, 100.0, 100.0];
    let b = [0.0, 0.0, 100.0, 50.0];
    // iou = 0.5
    let loose = SpatialClassifier {
      containment_iou: 0.4,
      ..Default::default()
    };
    assert_eq!(loose.classify(&b.into(), &a.into()), Some(SpatialPredicate::Inside));
    let exact = SpatialClassifier {
      containment_iou: 0.5,
      ..Default::default()
    };
    assert_ne!(exact.classify(&b.into(), &a.into()), Some(SpatialPredicate::Inside));
  }

  #[test]
  fn separated_boxes_are_left_or_right() {
    let a = [0.0, 0.0, 10.0, 10.0];
    let b = [100.0, 500.0, 110.0, 510.0];
    assert_eq!(classify(a, b), Some(SpatialPredicate::LeftOf));
    assert_eq!(classify(b, a), Some(SpatialPredicate::RightOf));
  }

  #[test]
  fn offset_centers_fall_through_to_left_right() {
    // 垂直重叠但中心不对齐
    let a = [0.0, 0.0, 100.0, 100.0];
    let b = [200.0, 50.0, 300.0, 150.0];
    assert_eq!(classify(a, b), Some(SpatialPredicate::LeftOf));
  }

  #[test]
  fn proximity_threshold() {
    let a = [0.0, 0.0, 100.0, 100.0];
    let near = [60.0, 200.0, 160.0, 300.0];
    let far = [40.0, 200.0, 140.0, 300.0];
    assert_eq!(classify(a, near), Some(SpatialPredicate::NextTo));
    assert_eq!(classify(a, far), None);

    let wide = SpatialClassifier {
      proximity_px: 70.0,
      ..Default::default()
    };
    assert_eq!(
      wide.classify(&a.into(), &far.into()),
      Some(SpatialPredicate::NextTo)
    );
  }

  #[test]
  fn touching_edges_are_next_to() {
    let a = [0.0, 0.0, 100.0, 100.0];
    let b = [100.0, 0.0, 200.0, 100.0];
    assert_eq!(classify(a, b), Some(SpatialPredicate::NextTo));
  }

  #[test]
  fn degenerate_box_does_not_panic() {
    let line = [50.0, 50.0, 50.0, 50.0];
    let b = [0.0, 0.0, 100.0, 100.0];
    let _ = classify(line, b);
    let _ = classify(b, line);
  }

  #[test]
  fn never_both_left_and_right() {
    let boxes = [
      [0.0, 0.0, 10.0, 10.0],
      [20.0, 0.0, 30.0, 10.0],
      [5.0, 5.0, 25.0, 25.0],
      [0.0, 100.0, 50.0, 200.0],
    ];
    for a in boxes {
      for b in boxes {
        let forward = classify(a, b);
        let backward = classify(b, a);
        if forward == Some(SpatialPredicate::LeftOf) {
          assert_ne!(backward, Some(SpatialPredicate::LeftOf));
        }
      }
    }
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/geometry.rs - 边界框几何运算
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

/// 轴对齐边界框，原图像素坐标 `[x_min, y_min, x_max, y_max]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
  pub xmin: f32,
  pub ymin: f32,
  pub xmax: f32,
  pub ymax: f32,
}

impl From<[f32; 4]> for BBox {
  fn from([xmin, ymin, xmax, ymax]: [f32; 4]) -> Self {
    Self {
      xmin,
      ymin,
      xmax,
      ymax,
    }
  }
}

impl From<BBox> for [f32; 4] {
  fn from(bbox: BBox) -> Self {
    [bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax]
  }
}

impl BBox {
  pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
    Self {
      xmin,
      ymin,
      xmax,
      ymax,
    }
  }

  pub fn width(&self) -> f32 {
    self.xmax - self.xmin
  }

  pub fn height(&self) -> f32 {
    self.ymax - self.ymin
  }

  /// 面积，畸形框可能为零或负数
  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }

  pub fn center_x(&self) -> f32 {
    (self.xmin + self.xmax) / 2.0
  }

  /// 交集面积，宽高截断到非负
  pub fn intersection(&self, other: &BBox) -> f32 {
    let x1 = self.xmin.max(other.xmin);
    let y1 = self.ymin.max(other.ymin);
    let x2 = self.xmax.min(other.xmax);
    let y2 = self.ymax.min(other.ymax);

    (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
  }

  pub fn union(&self, other: &BBox) -> f32 {
    self.area() + other.area() - self.intersection(other)
  }

  /// 计算两个边界框的 IoU
  ///
  /// 并集不为正时返回 0，因此不会出现除零或 NaN。
  pub fn iou(&self, other: &BBox) -> f32 {
    let intersection = self.intersection(other);
    let union = self.area() + other.area() - intersection;

    if union > 0.0 {
      (intersection / union).clamp(0.0, 1.0)
    } else {
      0.0
    }
  }

  /// 垂直方向重叠长度
  pub fn vertical_overlap(&self, other: &BBox) -> f32 {
    (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0)
  }

  /// 两个框水平边缘之间的最小距离：`min(|xmaxA - xminB|, |xminA - xmaxB|)`
  pub fn horizontal_gap(&self, other: &BBox) -> f32 {
    (self.xmax - other.xmin)
      .abs()
      .min((self.xmin - other.xmax).abs())
  }
}

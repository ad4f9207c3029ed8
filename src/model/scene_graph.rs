// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/scene_graph.rs - 场景图推理模型
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  config::{ConfigError, SceneConfig},
  detection::{DetectionError, DetectionFrame, ensure_unique_ids},
  model::Model,
  relation::RelationEngine,
  scene::SceneGraph,
  url_path,
};

#[derive(Error, Debug)]
pub enum SceneGraphModelError {
  #[error("模型路径必须使用 {0} 方案, 实际为 '{1}'")]
  SchemeMismatch(&'static str, String),
  #[error("配置错误: {0}")]
  ConfigError(#[from] ConfigError),
  #[error("检测结果错误: {0}")]
  DetectionError(#[from] DetectionError),
  #[error("参数 {0} 的取值无效: '{1}'")]
  InvalidParameter(String, String),
}

/// 关系推理引擎包装为模型：输入一帧检测结果，输出场景图
#[derive(Debug, Clone, Default)]
pub struct SceneGraphModel {
  engine: RelationEngine,
}

impl SceneGraphModel {
  pub fn new(config: SceneConfig) -> Self {
    Self {
      engine: RelationEngine::new(config),
    }
  }

  pub fn config(&self) -> &SceneConfig {
    self.engine.config()
  }
}

impl Model for SceneGraphModel {
  type Input = DetectionFrame;
  type Output = SceneGraph;
  type Error = SceneGraphModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    ensure_unique_ids(&input.detections)?;
    debug!("帧 {}: {} 个对象", input.name, input.detections.len());

    let graph = SceneGraph::build(&input.detections, &self.engine);
    debug!("帧 {}: {} 条关系", input.name, graph.relationships.len());
    Ok(graph)
  }
}

/// 从 `scene:` URL 构建模型
///
/// 路径部分（可选）指向 JSON 配置文件，查询参数覆盖单项配置：
/// `iou`、`proximity`、`self_loops`、`mismatch`、`expansion`。
#[derive(Debug, Default)]
pub struct SceneGraphModelBuilder {
  config_path: Option<PathBuf>,
  params: Vec<(String, String)>,
}

impl FromUrlWithScheme for SceneGraphModelBuilder {
  const SCHEME: &'static str = "scene";
}

impl FromUrl for SceneGraphModelBuilder {
  type Error = SceneGraphModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!("模型路径方案不匹配: {}", url.scheme());
      return Err(SceneGraphModelError::SchemeMismatch(
        Self::SCHEME,
        url.scheme().to_string(),
      ));
    }

    let path = url_path(url);
    Ok(SceneGraphModelBuilder {
      config_path: (!path.as_os_str().is_empty()).then_some(path),
      params: url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect(),
    })
  }
}

fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SceneGraphModelError> {
  value
    .parse()
    .map_err(|_| SceneGraphModelError::InvalidParameter(key.to_string(), value.to_string()))
}

impl SceneGraphModelBuilder {
  pub fn build(self) -> Result<SceneGraphModel, SceneGraphModelError> {
    let mut config = match &self.config_path {
      Some(path) => SceneConfig::load(path)?,
      None => SceneConfig::default(),
    };

    for (key, value) in &self.params {
      match key.as_str() {
        "iou" => config.containment_iou = parse_param(key, value)?,
        "proximity" => config.proximity_px = parse_param(key, value)?,
        "self_loops" => config.self_loops = value.parse()?,
        "mismatch" => config.known_pair_mismatch = value.parse()?,
        "expansion" => config.expansion = value.parse()?,
        _ => warn!("忽略未知的模型参数: {}={}", key, value),
      }
    }
    config.validate()?;

    info!(
      "场景图模型就绪: IoU 阈值 {}, 邻近阈值 {}px, 语义表 {} 项",
      config.containment_iou,
      config.proximity_px,
      config.plausibility.len()
    );
    Ok(SceneGraphModel::new(config))
  }
}

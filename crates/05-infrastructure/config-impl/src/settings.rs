//! 容器设置

use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// 环境变量前缀，例如 `BEANS__SEARCH_ROOTS=app::services,app::web`
pub const ENV_PREFIX: &str = "BEANS";

/// 默认的未解析占位符标记
pub const DEFAULT_UNRESOLVED_MARKER: &str = "<unresolved>";

/// 容器设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// 扫描根（模块路径）
    pub search_roots: Vec<String>,
    /// 默认属性目录
    pub defaults_dir: Option<PathBuf>,
    /// 覆盖属性目录
    pub overrides_dir: Option<PathBuf>,
    /// 无法解析的占位符被替换成的文本
    pub unresolved_marker: String,
    /// 没有发现任何候选类型时是否视为启动失败
    pub fail_on_empty_discovery: bool,
    /// 是否读取进程环境变量作为环境绑定
    pub ingest_process_environment: bool,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            defaults_dir: None,
            overrides_dir: None,
            unresolved_marker: DEFAULT_UNRESOLVED_MARKER.to_string(),
            fail_on_empty_discovery: false,
            ingest_process_environment: true,
        }
    }
}

impl ContainerSettings {
    /// 从可选的配置文件和 `BEANS__*` 环境变量加载
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        Self::load_from(file, None)
    }

    /// 从可选的配置文件和给定的环境变量表加载，`env` 为 `None` 时读取进程环境
    pub fn load_from(file: Option<&Path>, env: Option<HashMap<String, String>>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            debug!("加载容器设置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("search_roots")
                    .source(env),
            )
            .build()
            .map_err(|e| {
                error!("容器设置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        settings
            .try_deserialize::<Self>()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })
    }
}

//! 属性源实现

use crate::properties::parse_properties;
use di_abstractions::PropertySource;
use infrastructure_common::{ConfigError, ConfigResult, PropertyBag};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 属性文件扩展名
pub const PROPERTIES_EXTENSION: &str = "properties";

/// 基于目录的属性源
///
/// 逻辑键 `key` 对应 `<dir>/<key>.properties`；默认目录必须给出，覆盖目录可选。
#[derive(Debug, Clone)]
pub struct DirectoryPropertySource {
    defaults_dir: PathBuf,
    overrides_dir: Option<PathBuf>,
}

impl DirectoryPropertySource {
    /// 创建只有默认目录的属性源
    pub fn new<P: AsRef<Path>>(defaults_dir: P) -> Self {
        Self {
            defaults_dir: defaults_dir.as_ref().to_path_buf(),
            overrides_dir: None,
        }
    }

    /// 设置覆盖目录
    pub fn with_overrides<P: AsRef<Path>>(mut self, overrides_dir: P) -> Self {
        self.overrides_dir = Some(overrides_dir.as_ref().to_path_buf());
        self
    }

    /// 默认目录
    pub fn defaults_dir(&self) -> &Path {
        &self.defaults_dir
    }

    /// 覆盖目录
    pub fn overrides_dir(&self) -> Option<&Path> {
        self.overrides_dir.as_deref()
    }

    fn read(dir: &Path, key: &str) -> ConfigResult<Option<PropertyBag>> {
        let path = dir.join(format!("{}.{}", key, PROPERTIES_EXTENSION));
        if !path.is_file() {
            debug!("属性文件不存在, 跳过: {}", path.display());
            return Ok(None);
        }

        debug!("加载属性文件: {}", path.display());
        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError { source: e })?;
        parse_properties(&path.display().to_string(), &content).map(Some)
    }
}

impl PropertySource for DirectoryPropertySource {
    fn defaults(&self, key: &str) -> ConfigResult<Option<PropertyBag>> {
        Self::read(&self.defaults_dir, key)
    }

    fn overrides(&self, key: &str) -> ConfigResult<Option<PropertyBag>> {
        match &self.overrides_dir {
            Some(dir) => Self::read(dir, key),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "DirectoryPropertySource"
    }
}

/// 内存属性源，适用于测试和嵌入式场景
#[derive(Debug, Clone, Default)]
pub struct InMemoryPropertySource {
    defaults: BTreeMap<String, PropertyBag>,
    overrides: BTreeMap<String, PropertyBag>,
}

impl InMemoryPropertySource {
    /// 创建空的内存属性源
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加默认属性
    pub fn with_defaults<K, V>(mut self, key: &str, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::merge_into(&mut self.defaults, key, pairs);
        self
    }

    /// 添加覆盖属性
    pub fn with_overrides<K, V>(mut self, key: &str, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::merge_into(&mut self.overrides, key, pairs);
        self
    }

    fn merge_into<K, V>(
        target: &mut BTreeMap<String, PropertyBag>,
        key: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        target
            .entry(key.to_string())
            .or_default()
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl PropertySource for InMemoryPropertySource {
    fn defaults(&self, key: &str) -> ConfigResult<Option<PropertyBag>> {
        Ok(self.defaults.get(key).cloned())
    }

    fn overrides(&self, key: &str) -> ConfigResult<Option<PropertyBag>> {
        Ok(self.overrides.get(key).cloned())
    }

    fn name(&self) -> &str {
        "InMemoryPropertySource"
    }
}

//! 属性加载器

use di_abstractions::PropertySource;
use infrastructure_common::{ConfigResult, PropertyBag};
use std::sync::Arc;
use tracing::debug;

/// 属性加载器
///
/// 先读默认属性，再用覆盖属性逐键覆盖。两者都不存在时返回空属性包。
#[derive(Clone)]
pub struct PropertyLoader {
    source: Arc<dyn PropertySource>,
}

impl PropertyLoader {
    /// 创建属性加载器
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        Self { source }
    }

    /// 加载逻辑键 `key` 合并后的属性包
    pub fn load(&self, key: &str) -> ConfigResult<PropertyBag> {
        let mut bag = self.source.defaults(key)?.unwrap_or_default();
        if let Some(overrides) = self.source.overrides(key)? {
            debug!("应用覆盖属性: {} ({} 项)", key, overrides.len());
            bag.extend(overrides);
        }
        Ok(bag)
    }

    /// 底层属性源名称
    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

impl std::fmt::Debug for PropertyLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyLoader")
            .field("source", &self.source.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryPropertySource;

    #[test]
    fn overrides_win_over_defaults() {
        let source = InMemoryPropertySource::new()
            .with_defaults("db", [("k1", "d1"), ("k2", "d2")])
            .with_overrides("db", [("k1", "o1")]);
        let loader = PropertyLoader::new(Arc::new(source));

        let bag = loader.load("db").unwrap();
        assert_eq!(bag.len(), 2);
        assert_eq!(bag["k1"], "o1");
        assert_eq!(bag["k2"], "d2");
    }

    #[test]
    fn missing_resources_yield_empty_bag() {
        let loader = PropertyLoader::new(Arc::new(InMemoryPropertySource::new()));
        assert!(loader.load("nothing").unwrap().is_empty());
    }
}

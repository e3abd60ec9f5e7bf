//! 引用解析
//!
//! `${name}` 语法：整串为单个引用时解析为注册表中的对象；否则逐个替换为
//! bean 的字符串形式、环境绑定或未解析标记。替换只从左到右扫描原始字符串一次，
//! 替换进来的文本不会被再次扫描。

use crate::registry::Registry;
use config_impl::EnvironmentBindings;
use infrastructure_common::ResolvedValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("占位符正则表达式无效"));

static WHOLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{([^}]*)\}$").expect("引用正则表达式无效"));

/// 整串引用的名称，例如 `${db}` 返回 `db`
pub fn whole_reference(raw: &str) -> Option<&str> {
    WHOLE_REFERENCE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// 引用解析器
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    registry: &'a Registry,
    environment: &'a EnvironmentBindings,
    unresolved_marker: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    /// 创建引用解析器
    pub fn new(
        registry: &'a Registry,
        environment: &'a EnvironmentBindings,
        unresolved_marker: &'a str,
    ) -> Self {
        Self {
            registry,
            environment,
            unresolved_marker,
        }
    }

    /// 解析原始字符串
    pub fn resolve(&self, raw: &str) -> ResolvedValue {
        if let Some(name) = whole_reference(raw) {
            return match self.registry.entry(name) {
                Some(entry) => ResolvedValue::Bean {
                    name: entry.name.clone(),
                    instance: entry.instance.clone(),
                    display: entry.display(),
                },
                None => {
                    debug!("引用的 bean 不存在, 保留原文: {}", raw);
                    ResolvedValue::text(raw)
                }
            };
        }
        ResolvedValue::Text(self.substitute(raw))
    }

    /// 替换字符串中的全部 `${name}` 占位符
    pub fn substitute(&self, raw: &str) -> String {
        PLACEHOLDER
            .replace_all(raw, |captures: &Captures<'_>| {
                let name = &captures[1];
                self.registry
                    .display_of(name)
                    .or_else(|| self.environment.get(name).map(str::to_string))
                    .unwrap_or_else(|| {
                        debug!("占位符无法解析: {}", name);
                        self.unresolved_marker.to_string()
                    })
            })
            .into_owned()
    }
}

//! 环境绑定
//!
//! 启动开始时一次性读取的进程级键值对。形如 URL 的值会被拆分为
//! `<key>.protocol`、`<key>.username`、`<key>.password`、`<key>.host`、
//! `<key>.port`、`<key>.uri` 派生绑定。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<protocol>[A-Za-z][A-Za-z0-9+.-]*)://)?(?:(?P<username>[^:@/]+)(?::(?P<password>[^@/]*))?@)?(?P<host>[^:/@]+)(?::(?P<port>\d+))?(?:/(?P<uri>.*))?$",
    )
    .expect("URL 正则表达式无效")
});

const URL_PARTS: [&str; 6] = ["protocol", "username", "password", "host", "port", "uri"];

/// URL 拆分结果，只包含实际出现的部分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// 协议，例如 `postgres`
    pub protocol: Option<String>,
    /// 用户名
    pub username: Option<String>,
    /// 密码
    pub password: Option<String>,
    /// 主机
    pub host: Option<String>,
    /// 端口
    pub port: Option<String>,
    /// 路径部分，不含开头的 `/`
    pub uri: Option<String>,
}

impl UrlParts {
    /// 拆分形如 `[protocol://][user[:password]@]host[:port][/uri]` 的值
    ///
    /// 值中既没有 `://` 也没有 `@` 时不视为 URL。
    pub fn parse(value: &str) -> Option<Self> {
        if !value.contains("://") && !value.contains('@') {
            return None;
        }
        let captures = URL_PATTERN.captures(value)?;
        let part = |name: &str| {
            captures
                .name(name)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            protocol: part("protocol"),
            username: part("username"),
            password: part("password"),
            host: part("host"),
            port: part("port"),
            uri: part("uri"),
        })
    }

    /// `(后缀, 值)` 列表
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let values = [
            &self.protocol,
            &self.username,
            &self.password,
            &self.host,
            &self.port,
            &self.uri,
        ];
        URL_PARTS
            .iter()
            .zip(values)
            .filter_map(|(suffix, value)| value.as_deref().map(|v| (*suffix, v)))
            .collect()
    }
}

/// 环境绑定
#[derive(Debug, Clone, Default)]
pub struct EnvironmentBindings {
    values: BTreeMap<String, String>,
    derived: BTreeMap<String, String>,
}

impl EnvironmentBindings {
    /// 读取当前进程的环境变量
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// 从键值对创建
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut derived = BTreeMap::new();
        for (key, value) in &values {
            let Some(parts) = UrlParts::parse(value) else {
                continue;
            };
            for (suffix, part) in parts.entries() {
                derived.insert(format!("{}.{}", key, suffix), part.to_string());
            }
        }
        debug!(
            "环境绑定: {} 项, 派生 URL 绑定: {} 项",
            values.len(),
            derived.len()
        );

        Self { values, derived }
    }

    /// 空环境
    pub fn empty() -> Self {
        Self::default()
    }

    /// 查找绑定，原始值优先于派生值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .or_else(|| self.derived.get(name))
            .map(String::as_str)
    }

    /// 原始绑定
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// URL 拆分得到的派生绑定
    pub fn derived(&self) -> &BTreeMap<String, String> {
        &self.derived
    }

    /// 绑定总数
    pub fn len(&self) -> usize {
        self.values.len() + self.derived.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.derived.is_empty()
    }
}

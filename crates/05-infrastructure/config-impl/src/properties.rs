//! `key=value` 属性文本解析

use infrastructure_common::{ConfigError, ConfigResult, PropertyBag};

/// 解析属性文本
///
/// 空行以及以 `#`、`!` 开头的行被忽略；键与值之间以第一个 `=` 或 `:` 分隔，
/// 两侧空白会被去除。`resource` 仅用于错误信息。
pub fn parse_properties(resource: &str, content: &str) -> ConfigResult<PropertyBag> {
    let mut bag = PropertyBag::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let Some(separator) = line.find(|c: char| c == '=' || c == ':') else {
            return Err(malformed(resource, index, "缺少 '=' 或 ':' 分隔符"));
        };
        let key = line[..separator].trim();
        if key.is_empty() {
            return Err(malformed(resource, index, "属性键为空"));
        }
        let value = line[separator + 1..].trim();
        bag.insert(key.to_string(), value.to_string());
    }

    Ok(bag)
}

fn malformed(resource: &str, index: usize, message: &str) -> ConfigError {
    ConfigError::MalformedProperties {
        resource: resource.to_string(),
        line: index + 1,
        message: message.to_string(),
    }
}

//! 元数据定义
//!
//! 提供类型信息与标记（marker）定义

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: Cow<'static, str>,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 trait object
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: Cow::Borrowed(std::any::type_name::<T>()),
        }
    }

    /// 为不对应 Rust 类型的条目（例如标记声明）创建类型信息
    pub fn synthetic(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: TypeId::of::<Synthetic>(),
            name: name.into(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径与泛型参数）
    pub fn short_name(&self) -> &str {
        let without_generics = self.name.split('<').next().unwrap_or(&self.name);
        let trimmed = without_generics.trim_start_matches("dyn ");
        trimmed.rsplit("::").next().unwrap_or(trimmed)
    }

    /// 默认 bean 名称：首字母小写的简短类型名称
    pub fn default_bean_name(&self) -> String {
        decapitalize(self.short_name())
    }

    /// 类型名称是否位于指定的模块路径之下
    pub fn is_under(&self, root: &str) -> bool {
        path_is_under(&self.name, root)
    }
}

/// 模块路径 `path` 是否等于 `root` 或位于其下；空的 `root` 匹配一切
pub fn path_is_under(path: &str, root: &str) -> bool {
    root.is_empty()
        || path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

struct Synthetic;

/// 首字母小写
///
/// 与 JavaBeans 约定一致：前两个字符都是大写时保持原样（`URLParser` 不变）
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

/// 标记
///
/// 取代注解的字符串标签，按值比较
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(Cow<'static, str>);

impl Marker {
    /// 声明类型为 bean 的内置标记，其值即 bean 名称
    pub const NAMED: Marker = Marker(Cow::Borrowed("Named"));
    /// 元标记：被标记的条目本身是一个限定符
    pub const QUALIFIER: Marker = Marker(Cow::Borrowed("Qualifier"));
    /// 元标记：被标记的条目是自定义的 bean 标记
    pub const SCOPE: Marker = Marker(Cow::Borrowed("Scope"));

    /// 创建新的标记
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// 标记名称
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Marker {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

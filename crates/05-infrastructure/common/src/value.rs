//! 运行时值定义

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 容器中的 bean 实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 属性包：一个逻辑键合并后的全部原始属性
pub type PropertyBag = BTreeMap<String, String>;

/// 映射 bean 的实例类型
pub type PropertyMap = BTreeMap<String, ResolvedValue>;

/// 引用解析后的值
#[derive(Clone)]
pub enum ResolvedValue {
    /// 文本（字面量或占位符替换后的结果）
    Text(String),
    /// 注册表中的 bean
    Bean {
        /// bean 名称
        name: String,
        /// bean 实例
        instance: Instance,
        /// bean 的字符串形式
        display: String,
    },
}

impl ResolvedValue {
    /// 创建文本值
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// 被引用的 bean 名称
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Bean { name, .. } => Some(name),
        }
    }

    /// 把 bean 引用转换为具体类型
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Text(_) => None,
            Self::Bean { instance, .. } => instance.clone().downcast::<T>().ok(),
        }
    }

    /// 值的字符串形式
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bean { display, .. } => display.clone(),
        }
    }
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bean { name, display, .. } => f
                .debug_struct("Bean")
                .field("name", name)
                .field("display", display)
                .finish_non_exhaustive(),
        }
    }
}

impl PartialEq for ResolvedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bean { instance: a, .. }, Self::Bean { instance: b, .. }) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bean { display, .. } => f.write_str(display),
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for ResolvedValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// 实例地址，用于集合去重
pub fn instance_address(instance: &Instance) -> *const () {
    Arc::as_ptr(instance).cast::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bean_values_compare_by_identity() {
        let instance: Instance = Arc::new(42_u32);
        let a = ResolvedValue::Bean {
            name: "answer".into(),
            instance: instance.clone(),
            display: "42".into(),
        };
        let b = ResolvedValue::Bean {
            name: "alias".into(),
            instance,
            display: "42".into(),
        };
        let c = ResolvedValue::Bean {
            name: "answer".into(),
            instance: Arc::new(42_u32),
            display: "42".into(),
        };

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, ResolvedValue::text("42"));
        assert_eq!(a.downcast::<u32>().as_deref(), Some(&42));
        assert_eq!(a.to_display_string(), "42");
    }
}

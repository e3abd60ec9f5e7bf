//! 声明式属性资源抽象接口

use infrastructure_common::{ConfigResult, PropertyBag};

/// 属性资源 trait
///
/// 每个逻辑键对应一个默认资源和一个可选的覆盖资源，覆盖资源优先。
pub trait PropertySource: Send + Sync {
    /// 默认属性，资源不存在时返回 `None`
    fn defaults(&self, key: &str) -> ConfigResult<Option<PropertyBag>>;

    /// 覆盖属性，资源不存在时返回 `None`
    fn overrides(&self, key: &str) -> ConfigResult<Option<PropertyBag>>;

    /// 属性源名称
    fn name(&self) -> &str;
}

//! bean 注册表查询接口

use infrastructure_common::{DependencyResult, Instance, Marker};
use std::sync::Arc;

/// bean 注册表查询 trait
///
/// 启动完成后交给调用者的只读视图；所有查找结果都是可选的。
pub trait BeanRegistry {
    /// 第一个可赋值给 `T` 的 bean
    fn find_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>>;

    /// 全部可赋值给 `T` 的 bean，同一实例只出现一次
    fn find_all_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>>;

    /// 名称为 `name` 且可赋值给 `T` 的 bean
    fn find_by_type_and_name<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>>;

    /// 携带全部限定符的 bean；任何一个标记不是限定符时返回错误
    fn find_by_qualifiers(&self, qualifiers: &[Marker]) -> DependencyResult<Vec<Instance>>;

    /// 按名称获取原始实例
    fn get(&self, name: &str) -> Option<Instance>;

    /// 是否存在指定名称的 bean
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 按注册顺序列出全部 bean 名称
    fn bean_names(&self) -> Vec<String>;
}

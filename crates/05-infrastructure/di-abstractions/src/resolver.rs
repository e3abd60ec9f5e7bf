//! 候选类型解析器抽象接口
//!
//! 物理扫描（模块、归档等）完全隔离在此接口之后，容器本身从不访问存储。

use crate::descriptor::CandidateDescriptor;
use infrastructure_common::{DiscoveryResult, Marker, TypeInfo};
use std::collections::BTreeSet;

/// 候选类型解析器 trait
///
/// 每个方法都针对单个扫描根；某个根返回 [`DiscoveryError::RootUnavailable`]
/// 时容器记录日志并跳过该根，返回 [`DiscoveryError::ResolverUnavailable`]
/// 时启动整体失败。
///
/// [`DiscoveryError::RootUnavailable`]: infrastructure_common::DiscoveryError::RootUnavailable
/// [`DiscoveryError::ResolverUnavailable`]: infrastructure_common::DiscoveryError::ResolverUnavailable
pub trait Resolver: Send + Sync {
    /// 可赋值给 `target` 的具体类型
    fn subclasses_of(&self, root: &str, target: &TypeInfo) -> DiscoveryResult<Vec<CandidateDescriptor>>;

    /// 携带 `marker` 的具体类型
    fn marked_with(&self, root: &str, marker: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>>;

    /// 同时满足前两者的具体类型
    fn marked_subclasses_of(
        &self,
        root: &str,
        target: &TypeInfo,
        marker: &Marker,
    ) -> DiscoveryResult<Vec<CandidateDescriptor>> {
        Ok(self
            .subclasses_of(root, target)?
            .into_iter()
            .filter(|candidate| candidate.has_marker(marker))
            .collect())
    }

    /// 携带 `marker` 的任意条目，包括抽象类型和标记声明
    fn marked_items(&self, root: &str, marker: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>>;

    /// 直接位于 `root` 之下的声明式属性资源标识（不含子目录）
    fn declarative_entries(&self, root: &str) -> DiscoveryResult<BTreeSet<String>>;

    /// 按完整类型名称查找候选类型
    fn find_type(&self, type_name: &str) -> Option<CandidateDescriptor>;

    /// 解析器名称
    fn name(&self) -> &str;
}

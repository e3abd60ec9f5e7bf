//! # Infrastructure Common
//!
//! bean 容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`TypeInfo`] / [`Marker`] - 类型信息与取代注解的标记
//! - [`Instance`] / [`ResolvedValue`] - 运行时 bean 实例与引用解析结果
//! - [`Slot`] - 支持在共享引用下完成注入的字段槽
//! - 错误类型：[`DiscoveryError`]、[`CreationError`]、[`DependencyError`]、
//!   [`LifecycleError`]、[`ConfigError`]、[`BootstrapError`]

pub mod errors;
pub mod metadata;
pub mod slot;
pub mod value;

pub use errors::*;
pub use metadata::*;
pub use slot::*;
pub use value::*;

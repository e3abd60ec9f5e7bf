//! # Dependency Injection Abstractions
//!
//! bean 容器的抽象层，定义外部协作者和能力描述的核心接口。
//!
//! ## 核心接口
//!
//! - [`CandidateDescriptor`] - 候选类型的能力描述（取代运行时反射）
//! - [`Resolver`] - 候选类型解析器接口
//! - [`PropertySource`] - 声明式属性资源接口
//! - [`BeanRegistry`] - 注册表查询接口

pub mod descriptor;
pub mod property;
pub mod registry;
pub mod resolver;

pub use descriptor::*;
pub use property::*;
pub use registry::*;
pub use resolver::*;

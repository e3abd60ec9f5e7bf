//! # 依赖注入具体实现
//!
//! bean 图的构建引擎：注册表、引用解析、bean 工厂、注入器、依赖排序和生命周期调度。
//!
//! 入口为 [`new_container`]，返回只读的 [`Container`]。

pub mod container;
pub mod factory;
pub mod injector;
pub mod lifecycle;
pub mod reference;
pub mod registry;
pub mod tracker;

pub use container::*;
pub use factory::*;
pub use injector::*;
pub use lifecycle::*;
pub use reference::*;
pub use registry::*;
pub use tracker::*;

//! # Configuration Implementation
//!
//! 声明式属性与启动配置的具体实现。
//!
//! ## 主要组件
//!
//! - [`PropertyLoader`] - 合并默认属性与覆盖属性
//! - [`DirectoryPropertySource`] / [`InMemoryPropertySource`] - 属性源
//! - [`EnvironmentBindings`] - 环境绑定与 URL 拆分
//! - [`ContainerSettings`] - 容器设置

pub mod environment;
pub mod loader;
pub mod properties;
pub mod providers;
pub mod settings;

pub use environment::*;
pub use loader::*;
pub use properties::*;
pub use providers::*;
pub use settings::*;

//! # 基础设施组合层
//!
//! 负责把解析器、属性源、环境绑定和容器设置组合起来，完成一次启动。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用建造者模式组装启动所需的协作者
//! - **目录式解析器**: 由显式登记的描述符和属性文件目录提供候选类型
//! - **日志初始化**: 开发与生产两套预设
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{BeanRegistry, CandidateDescriptor};
//! use infrastructure_composition::{BootstrapBuilder, CatalogResolver, LoggingConfig};
//!
//! #[derive(Default)]
//! struct Clock;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = CatalogResolver::new().register(
//!         CandidateDescriptor::builder::<Clock>()
//!             .named("clock")
//!             .default_constructor()
//!             .build(),
//!     );
//!
//!     let container = BootstrapBuilder::new()
//!         .with_resolver(resolver)
//!         .search_root("")
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     assert!(container.find_by_type::<Clock>().is_some());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod catalog;
pub mod logging;


// 重新导出主要类型
pub use builder::BootstrapBuilder;
pub use catalog::CatalogResolver;
pub use logging::LoggingConfig;

// 重新导出错误类型
pub use infrastructure_common::BootstrapError;

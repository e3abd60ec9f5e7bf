//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("属性文件格式错误: {resource} 第 {line} 行: {message}")]
    MalformedProperties {
        resource: String,
        line: usize,
        message: String,
    },
}

/// 候选类型发现错误
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// 单个扫描根无法枚举，仅影响该根
    #[error("扫描根无法枚举: {root}, 原因: {message}")]
    RootUnavailable { root: String, message: String },

    /// 解析器本身不可用，启动过程整体失败
    #[error("解析器不可用: {message}")]
    ResolverUnavailable { message: String },
}

impl DiscoveryError {
    /// 创建扫描根错误
    pub fn root_unavailable(root: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RootUnavailable {
            root: root.into(),
            message: message.into(),
        }
    }

    /// 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResolverUnavailable { .. })
    }
}

/// Bean 创建错误类型
#[derive(Error, Debug)]
pub enum CreationError {
    #[error("没有可用的无参构造器: {type_name}")]
    NoViableConstructor { type_name: String },

    #[error("bean 实例化失败: {type_name}, 原因: {source}")]
    ConstructionFailed {
        type_name: String,
        source: anyhow::Error,
    },

    #[error("类型不存在: {type_name} (声明键: {key})")]
    TypeNotFound { key: String, type_name: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("bean of type {type_name} not found")]
    BeanOfTypeNotFound { type_name: String },

    #[error("bean of type {type_name} with qualifiers [{qualifiers}] not found")]
    QualifiedBeanNotFound {
        type_name: String,
        qualifiers: String,
    },

    #[error("未找到名称为 {name} 的 bean")]
    NamedBeanNotFound { name: String },

    #[error("bean {name} 无法赋值为类型 {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("Not a qualifier: {marker}")]
    NotAQualifier { marker: String },

    #[error("注入参数缺失: {index}")]
    MissingArgument { index: usize },

    #[error("注入点执行失败: {bean}.{point}, 原因: {source}")]
    InjectionFailed {
        bean: String,
        point: String,
        source: anyhow::Error,
    },
}

/// 生命周期钩子错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("初始化钩子签名不兼容: {hook}, 期望 {expected} 个参数, 实际提供 {actual} 个")]
    IncompatibleHook {
        hook: String,
        expected: usize,
        actual: usize,
    },

    #[error("初始化钩子执行失败: {hook}, 原因: {source}")]
    HookFailed { hook: String, source: anyhow::Error },
}

/// 启动错误类型
///
/// 只有超出单个 bean 恢复范围的失败才会以此类型返回给调用者
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("发现错误: {source}")]
    Discovery {
        #[from]
        source: DiscoveryError,
    },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("扫描根 [{roots}] 中没有发现任何候选类型")]
    NoCandidates { roots: String },

    #[error("容器启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
pub type CreationResult<T> = Result<T, CreationError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
pub type BootstrapResult<T> = Result<T, BootstrapError>;

//! 日志初始化

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 未设置时生效
    pub level: tracing::Level,
    /// 额外的过滤指令，例如 `di_impl=trace`
    pub directives: Vec<String>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            ..Self::default()
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            show_target: false,
            json_format: true,
            ..Self::default()
        }
    }

    /// 添加过滤指令
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// 过滤器：优先使用 `RUST_LOG`，否则使用配置的级别与指令
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let mut spec = vec![self.level.to_string().to_lowercase()];
            spec.extend(self.directives.iter().cloned());
            EnvFilter::new(spec.join(","))
        })
    }

    /// 安装全局订阅者
    ///
    /// 已经安装过订阅者时不做任何事并返回 `false`。
    pub fn init(&self) -> bool {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };

        match result {
            Ok(()) => {
                info!("日志系统初始化完成");
                true
            }
            Err(e) => {
                debug!("日志系统已初始化, 跳过: {}", e);
                false
            }
        }
    }
}

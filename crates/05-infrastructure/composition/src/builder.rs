//! 容器构建器

use crate::logging::LoggingConfig;
use config_impl::{
    ContainerSettings, DirectoryPropertySource, EnvironmentBindings, InMemoryPropertySource,
};
use di_abstractions::{CandidateDescriptor, PropertySource, Resolver};
use di_impl::{new_container, BootstrapContext, Container, ExternalBeans};
use infrastructure_common::{BootstrapError, BootstrapResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 容器构建器
///
/// 使用建造者模式组装解析器、属性源、环境绑定与设置，然后启动容器
pub struct BootstrapBuilder {
    /// 候选类型解析器
    resolver: Option<Arc<dyn Resolver>>,
    /// 属性源，未设置时根据设置中的目录决定
    property_source: Option<Arc<dyn PropertySource>>,
    /// 环境绑定，未设置时根据设置决定是否读取进程环境
    environment: Option<EnvironmentBindings>,
    /// 容器设置
    settings: ContainerSettings,
    /// 扫描根
    search_roots: Vec<String>,
    /// 外部 bean
    external_beans: ExternalBeans,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl BootstrapBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            resolver: None,
            property_source: None,
            environment: None,
            settings: ContainerSettings::default(),
            search_roots: Vec::new(),
            external_beans: ExternalBeans::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 设置解析器
    pub fn with_resolver<R: Resolver + 'static>(mut self, resolver: R) -> Self {
        debug!("设置解析器: {}", resolver.name());
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// 设置属性源
    pub fn with_property_source<P: PropertySource + 'static>(mut self, source: P) -> Self {
        debug!("设置属性源: {}", source.name());
        self.property_source = Some(Arc::new(source));
        self
    }

    /// 设置环境绑定
    pub fn with_environment(mut self, environment: EnvironmentBindings) -> Self {
        self.environment = Some(environment);
        self
    }

    /// 设置容器设置
    pub fn with_settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从配置文件与 `BEANS__*` 环境变量加载容器设置
    pub fn load_settings<P: AsRef<Path>>(mut self, path: P) -> BootstrapResult<Self> {
        let path = path.as_ref();
        info!("加载容器设置: {}", path.display());
        self.settings = ContainerSettings::load(Some(path))?;
        Ok(self)
    }

    /// 添加扫描根
    pub fn search_root<S: Into<String>>(mut self, root: S) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// 添加外部 bean
    pub fn external_bean<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.external_beans = self.external_beans.insert(name, value);
        self
    }

    /// 以指定描述符添加共享的外部 bean
    pub fn external_shared<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        instance: Arc<T>,
        descriptor: CandidateDescriptor,
    ) -> Self {
        self.external_beans = self.external_beans.insert_with(name, instance, descriptor);
        self
    }

    /// 添加外部字符串 bean
    pub fn external_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_beans = self.external_beans.text(name, value);
        self
    }

    /// 启用日志初始化
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_enabled = true;
        self.logging_config = config;
        self
    }

    /// 全部扫描根：显式添加的在前，设置中的在后，去重
    fn roots(&self) -> Vec<String> {
        let mut roots: Vec<String> = Vec::new();
        for root in self.search_roots.iter().chain(&self.settings.search_roots) {
            if !roots.contains(root) {
                roots.push(root.clone());
            }
        }
        roots
    }

    fn property_source(&self) -> Arc<dyn PropertySource> {
        if let Some(source) = &self.property_source {
            return source.clone();
        }
        match &self.settings.defaults_dir {
            Some(defaults) => {
                let mut source = DirectoryPropertySource::new(defaults);
                if let Some(overrides) = &self.settings.overrides_dir {
                    source = source.with_overrides(overrides);
                }
                Arc::new(source)
            }
            None => Arc::new(InMemoryPropertySource::new()),
        }
    }

    fn environment(&self) -> EnvironmentBindings {
        match &self.environment {
            Some(environment) => environment.clone(),
            None if self.settings.ingest_process_environment => EnvironmentBindings::from_process(),
            None => EnvironmentBindings::empty(),
        }
    }

    /// 构建并启动容器
    pub fn build(self) -> BootstrapResult<Container> {
        if self.logging_enabled {
            self.logging_config.init();
        }

        info!("开始构建容器");
        let resolver = self
            .resolver
            .clone()
            .ok_or_else(|| BootstrapError::BootstrapFailed {
                message: "未设置解析器".to_string(),
            })?;
        let roots = self.roots();
        let context = BootstrapContext::new(resolver, self.property_source())
            .with_environment(self.environment())
            .with_settings(self.settings.clone());

        let container = new_container(context, roots, self.external_beans)?;
        info!("容器构建完成: {}", container.context_id());
        Ok(container)
    }
}

impl Default for BootstrapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! 容器与启动入口

use crate::factory::BeanFactory;
use crate::injector::{InjectionOutcome, Injector};
use crate::lifecycle::{LifecycleDispatcher, LifecycleReport};
use crate::registry::Registry;
use crate::tracker::{DependencyTracker, EdgeTarget, TopologicalOrder};
use chrono::{DateTime, Utc};
use config_impl::{ContainerSettings, EnvironmentBindings, PropertyLoader};
use di_abstractions::{BeanRegistry, CandidateDescriptor, PropertySource, Resolver};
use indexmap::IndexMap;
use infrastructure_common::{
    BootstrapError, BootstrapResult, DependencyResult, DiscoveryResult, Instance, Marker,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// 启动所需的外部协作者与设置
#[derive(Clone)]
pub struct BootstrapContext {
    /// 候选类型解析器
    pub resolver: Arc<dyn Resolver>,
    /// 声明式属性源
    pub property_source: Arc<dyn PropertySource>,
    /// 环境绑定
    pub environment: EnvironmentBindings,
    /// 容器设置
    pub settings: ContainerSettings,
}

impl BootstrapContext {
    /// 创建启动上下文，使用空环境与默认设置
    pub fn new(resolver: Arc<dyn Resolver>, property_source: Arc<dyn PropertySource>) -> Self {
        Self {
            resolver,
            property_source,
            environment: EnvironmentBindings::empty(),
            settings: ContainerSettings::default(),
        }
    }

    /// 设置环境绑定
    pub fn with_environment(mut self, environment: EnvironmentBindings) -> Self {
        self.environment = environment;
        self
    }

    /// 设置容器设置
    pub fn with_settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// 预先注册的外部 bean
#[derive(Debug, Clone)]
pub struct ExternalBean {
    /// 实例
    pub instance: Instance,
    /// 描述符
    pub descriptor: CandidateDescriptor,
}

/// 外部 bean 集合，按插入顺序注册
#[derive(Debug, Clone, Default)]
pub struct ExternalBeans {
    beans: IndexMap<String, ExternalBean>,
}

impl ExternalBeans {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加只有自身类型视图的实例
    pub fn insert<T: Send + Sync + 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.insert_with(name, Arc::new(value), CandidateDescriptor::of::<T>())
    }

    /// 以指定描述符添加共享实例
    pub fn insert_with<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        instance: Arc<T>,
        descriptor: CandidateDescriptor,
    ) -> Self {
        self.beans.insert(
            name.into(),
            ExternalBean {
                instance,
                descriptor,
            },
        );
        self
    }

    /// 添加字符串 bean
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_with(name, Arc::new(value.into()), CandidateDescriptor::text())
    }

    /// 数量
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl IntoIterator for ExternalBeans {
    type Item = (String, ExternalBean);
    type IntoIter = indexmap::map::IntoIter<String, ExternalBean>;

    fn into_iter(self) -> Self::IntoIter {
        self.beans.into_iter()
    }
}

/// 容器诊断信息
#[derive(Debug, Clone, Serialize)]
pub struct ContainerDiagnostics {
    /// 启动上下文ID
    pub context_id: Uuid,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 全部 bean，按注册顺序
    pub bean_names: Vec<String>,
    /// 依赖就绪顺序
    pub ordered: Vec<String>,
    /// 未能排序的 bean
    pub pending: Vec<String>,
    /// 每个 bean 记录的依赖
    pub edges: BTreeMap<String, Vec<EdgeTarget>>,
    /// 携带限定符的 bean 及其限定符
    pub qualifiers: BTreeMap<String, Vec<String>>,
    /// 初始化钩子调度结果
    pub lifecycle: LifecycleReport,
}

/// 启动完成的容器
///
/// 启动结束后视为只读快照，所有查找都只需要 `&self`。
pub struct Container {
    context_id: Uuid,
    created_at: DateTime<Utc>,
    registry: Registry,
    tracker: DependencyTracker,
    order: TopologicalOrder,
    lifecycle: LifecycleReport,
    loader: PropertyLoader,
    environment: EnvironmentBindings,
    unresolved_marker: String,
}

impl Container {
    /// 启动上下文ID
    pub fn context_id(&self) -> Uuid {
        self.context_id
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 注册表
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 依赖就绪顺序
    pub fn ordered(&self) -> &[String] {
        &self.order.ordered
    }

    /// 未能排序的 bean
    pub fn pending(&self) -> &[String] {
        &self.order.pending
    }

    /// bean 记录的依赖
    pub fn dependencies_of(&self, name: &str) -> &[EdgeTarget] {
        self.tracker.dependencies_of(name)
    }

    /// 初始化钩子调度结果
    pub fn lifecycle_report(&self) -> &LifecycleReport {
        &self.lifecycle
    }

    /// 诊断信息
    pub fn diagnostics(&self) -> ContainerDiagnostics {
        ContainerDiagnostics {
            context_id: self.context_id,
            created_at: self.created_at,
            bean_names: self.registry.bean_names(),
            ordered: self.order.ordered.clone(),
            pending: self.order.pending.clone(),
            edges: self
                .tracker
                .edges()
                .map(|(owner, targets)| (owner.clone(), targets.clone()))
                .collect(),
            qualifiers: self
                .registry
                .entries()
                .filter_map(|entry| {
                    let tags = self.registry.qualifiers_of(&entry.name);
                    (!tags.is_empty()).then(|| {
                        (
                            entry.name.clone(),
                            tags.iter().map(|tag| tag.name().to_string()).collect(),
                        )
                    })
                })
                .collect(),
            lifecycle: self.lifecycle.clone(),
        }
    }

    fn injector(&self) -> Injector<'_> {
        Injector::new(
            &self.registry,
            &self.loader,
            &self.environment,
            &self.unresolved_marker,
        )
    }

    /// 创建一次性实例：实例化、注入并调用初始化钩子，但不注册
    pub fn create_transient<T: Send + Sync + 'static>(
        &self,
        descriptor: &CandidateDescriptor,
        name: Option<&str>,
    ) -> Option<Arc<T>> {
        let name = BeanFactory::bean_name(descriptor, name);
        let instance = match descriptor.instantiate() {
            Ok(instance) => instance,
            Err(e) => {
                error!("创建临时 bean 失败: {}, 原因: {}", name, e);
                return None;
            }
        };
        self.configure(&name, &instance, descriptor);
        descriptor.cast::<T>(&instance)
    }

    /// 对外部构造的实例执行属性、注入与初始化阶段
    pub fn init_existing<T: Send + Sync + 'static>(
        &self,
        instance: &Arc<T>,
        descriptor: &CandidateDescriptor,
        name: Option<&str>,
    ) -> InjectionOutcome {
        let name = BeanFactory::bean_name(descriptor, name);
        let instance: Instance = instance.clone();
        self.configure(&name, &instance, descriptor)
    }

    fn configure(
        &self,
        name: &str,
        instance: &Instance,
        descriptor: &CandidateDescriptor,
    ) -> InjectionOutcome {
        let outcome = self.injector().inject(name, instance, descriptor);
        if let Err(e) = LifecycleDispatcher::run_hook(name, instance, descriptor) {
            error!("初始化钩子失败: {}, 原因: {}", name, e);
        }
        outcome
    }
}

impl BeanRegistry for Container {
    fn find_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.registry.find_by_type::<T>()
    }

    fn find_all_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        self.registry.find_all_by_type::<T>()
    }

    fn find_by_type_and_name<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.registry.find_by_type_and_name::<T>(name)
    }

    fn find_by_qualifiers(&self, qualifiers: &[Marker]) -> DependencyResult<Vec<Instance>> {
        self.registry.find_by_qualifiers(qualifiers)
    }

    fn get(&self, name: &str) -> Option<Instance> {
        self.registry.get(name)
    }

    fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn bean_names(&self) -> Vec<String> {
        self.registry.bean_names()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("context_id", &self.context_id)
            .field("created_at", &self.created_at)
            .field("beans", &self.registry.len())
            .field("ordered", &self.order.ordered.len())
            .field("pending", &self.order.pending)
            .finish()
    }
}

/// 单个扫描根的发现结果：致命错误向上传播，其余错误记录后跳过该根
fn per_root<T>(root: &str, result: DiscoveryResult<T>) -> BootstrapResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => {
            error!("解析器不可用, 启动终止: {}", e);
            Err(e.into())
        }
        Err(e) => {
            warn!("跳过扫描根 {}: {}", root, e);
            Ok(None)
        }
    }
}

/// 启动容器
///
/// 依次完成：环境派生绑定与外部 bean 预注册、限定符与 bean 标记的元级发现、
/// 带标记类型的创建、声明式条目的创建、注入、拓扑排序和初始化钩子调度。
pub fn new_container<I, S>(
    context: BootstrapContext,
    search_roots: I,
    external_beans: ExternalBeans,
) -> BootstrapResult<Container>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let roots: Vec<String> = search_roots.into_iter().map(Into::into).collect();
    let context_id = Uuid::new_v4();
    let span = info_span!("bootstrap", context_id = %context_id);
    let _guard = span.enter();

    let BootstrapContext {
        resolver,
        property_source,
        environment,
        settings,
    } = context;
    let loader = PropertyLoader::new(property_source);
    info!(
        "开始启动容器, 解析器: {}, 属性源: {}, 扫描根: {:?}",
        resolver.name(),
        loader.source_name(),
        roots
    );
    let unresolved_marker = settings.unresolved_marker.clone();
    let mut registry = Registry::new();

    for (key, value) in environment.derived() {
        registry.register(key.clone(), Arc::new(value.clone()), CandidateDescriptor::text());
    }
    for (name, bean) in external_beans {
        info!("注册外部 bean: {}", name);
        registry.register(name, bean.instance, bean.descriptor);
    }

    let mut bean_markers = vec![Marker::NAMED];
    for root in &roots {
        if let Some(items) = per_root(root, resolver.marked_items(root, &Marker::QUALIFIER))? {
            for marker in items.iter().filter_map(CandidateDescriptor::declared_marker) {
                registry.add_qualifier_marker(marker.clone());
            }
        }
        if let Some(items) = per_root(root, resolver.marked_items(root, &Marker::SCOPE))? {
            for marker in items.iter().filter_map(CandidateDescriptor::declared_marker) {
                if !bean_markers.contains(marker) {
                    debug!("登记 bean 标记: {}", marker);
                    bean_markers.push(marker.clone());
                }
            }
        }
    }

    let factory = BeanFactory::new(resolver.as_ref(), &loader, &environment, &unresolved_marker);
    let mut candidates = 0_usize;
    let mut seen_types = HashSet::new();
    for root in &roots {
        for marker in &bean_markers {
            let Some(found) = per_root(root, resolver.marked_with(root, marker))? else {
                continue;
            };
            for descriptor in found {
                if !descriptor.is_concrete()
                    || !seen_types.insert(descriptor.type_info().name.to_string())
                {
                    continue;
                }
                candidates += 1;
                factory.create_from_type(&mut registry, &descriptor, None);
            }
        }
    }

    for root in &roots {
        let Some(entries) = per_root(root, resolver.declarative_entries(root))? else {
            continue;
        };
        for entry in entries {
            let bag = match loader.load(&entry) {
                Ok(bag) => bag,
                Err(err) => {
                    error!("加载声明式条目失败, 跳过: {} - {}", entry, err);
                    continue;
                }
            };
            debug!("处理声明式条目: {} ({} 项)", entry, bag.len());
            for (key, value) in &bag {
                candidates += 1;
                factory.create_from_declaration(&mut registry, key, value);
            }
        }
    }

    if candidates == 0 {
        if settings.fail_on_empty_discovery {
            return Err(BootstrapError::NoCandidates {
                roots: roots.join(", "),
            });
        }
        warn!("扫描根中没有发现任何候选类型: {:?}", roots);
    }

    let mut tracker = DependencyTracker::new();
    {
        let injector = Injector::new(&registry, &loader, &environment, &unresolved_marker);
        for entry in registry.entries() {
            let outcome = injector.inject(&entry.name, &entry.instance, &entry.descriptor);
            if outcome.failures > 0 {
                warn!("bean {} 有 {} 个注入点失败", entry.name, outcome.failures);
            }
            tracker.record_all(&entry.name, outcome.edges);
        }
    }

    let order = tracker.sort(&registry.bean_names());
    let lifecycle = LifecycleDispatcher::dispatch(&registry, &order);

    info!(
        "容器启动完成: {} 个 bean, 已排序 {} 个, 未排序 {} 个",
        registry.len(),
        order.ordered.len(),
        order.pending.len()
    );

    Ok(Container {
        context_id,
        created_at: Utc::now(),
        registry,
        tracker,
        order,
        lifecycle,
        loader,
        environment,
        unresolved_marker,
    })
}

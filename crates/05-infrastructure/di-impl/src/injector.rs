//! 注入器
//!
//! 先处理字段注入点，再按声明顺序处理方法（注入方法与属性设置器）。
//! 单个注入点失败只记录日志并跳过，不影响其余注入点。

use crate::reference::ReferenceResolver;
use crate::registry::Registry;
use crate::tracker::EdgeTarget;
use config_impl::{EnvironmentBindings, PropertyLoader};
use di_abstractions::{
    CandidateDescriptor, Dependency, Injected, InjectionMethod, MethodArgs, MethodPoint,
    PropertySetter, PropertyShape, PropertyValue,
};
use infrastructure_common::{DependencyError, Instance, PropertyBag, ResolvedValue};
use tracing::{debug, error, warn};

/// 单个 bean 的注入结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionOutcome {
    /// 实际注入的依赖
    pub edges: Vec<EdgeTarget>,
    /// 失败的注入点数量
    pub failures: usize,
}

/// 注入器
pub struct Injector<'a> {
    registry: &'a Registry,
    loader: &'a PropertyLoader,
    references: ReferenceResolver<'a>,
}

impl<'a> Injector<'a> {
    /// 创建注入器
    pub fn new(
        registry: &'a Registry,
        loader: &'a PropertyLoader,
        environment: &'a EnvironmentBindings,
        unresolved_marker: &'a str,
    ) -> Self {
        Self {
            registry,
            loader,
            references: ReferenceResolver::new(registry, environment, unresolved_marker),
        }
    }

    /// 为 bean 完成全部注入
    pub fn inject(
        &self,
        name: &str,
        instance: &Instance,
        descriptor: &CandidateDescriptor,
    ) -> InjectionOutcome {
        let mut outcome = InjectionOutcome::default();

        for field in descriptor.fields() {
            let result = self.registry.resolve(&field.dependency).and_then(|injected| {
                let edge = edge_of(&field.dependency, &injected);
                field.apply(instance, injected).map(|()| edge)
            });
            match result {
                Ok(edge) => {
                    debug!("字段注入完成: {}.{}", name, field.name);
                    outcome.edges.push(edge);
                }
                Err(e) => {
                    report_failure(name, &field.name, &e);
                    outcome.failures += 1;
                }
            }
        }

        let properties = self.properties_for(name, descriptor);
        for method in descriptor.methods() {
            match method {
                MethodPoint::Inject(method) => self.invoke_method(name, instance, method, &mut outcome),
                MethodPoint::Setter(setter) => {
                    if let Some(raw) = properties.get(&setter.property) {
                        self.apply_setter(name, instance, setter, raw, &mut outcome);
                    }
                }
            }
        }

        outcome
    }

    fn properties_for(&self, name: &str, descriptor: &CandidateDescriptor) -> PropertyBag {
        let has_setters = descriptor
            .methods()
            .iter()
            .any(|method| matches!(method, MethodPoint::Setter(_)));
        if !has_setters {
            return PropertyBag::new();
        }
        self.loader.load(name).unwrap_or_else(|e| {
            warn!("加载 bean 属性失败: {}, 原因: {}", name, e);
            PropertyBag::new()
        })
    }

    fn invoke_method(
        &self,
        name: &str,
        instance: &Instance,
        method: &InjectionMethod,
        outcome: &mut InjectionOutcome,
    ) {
        let mut values = Vec::with_capacity(method.params.len());
        let mut edges = Vec::with_capacity(method.params.len());
        for dependency in &method.params {
            match self.registry.resolve(dependency) {
                Ok(injected) => {
                    edges.push(edge_of(dependency, &injected));
                    values.push(injected);
                }
                Err(e) => {
                    report_failure(name, &method.name, &e);
                    outcome.failures += 1;
                    return;
                }
            }
        }

        let mut args = MethodArgs::new(values);
        match method.invoke(instance, &mut args) {
            Ok(()) => {
                debug!("注入方法调用完成: {}.{}", name, method.name);
                outcome.edges.extend(edges);
            }
            Err(source) => {
                let e = DependencyError::InjectionFailed {
                    bean: name.to_string(),
                    point: method.name.clone(),
                    source,
                };
                warn!("{}", e);
                outcome.failures += 1;
            }
        }
    }

    fn apply_setter(
        &self,
        name: &str,
        instance: &Instance,
        setter: &PropertySetter,
        raw: &str,
        outcome: &mut InjectionOutcome,
    ) {
        let value = self.coerce(setter.shape, raw);
        let edge = match &value {
            PropertyValue::Reference(resolved) => resolved
                .bean_name()
                .map(|bean| EdgeTarget::Bean(bean.to_string())),
            PropertyValue::Collection(values) => {
                let beans: Vec<String> = values
                    .iter()
                    .filter_map(ResolvedValue::bean_name)
                    .map(str::to_string)
                    .collect();
                (!beans.is_empty()).then_some(EdgeTarget::Collection(beans))
            }
            PropertyValue::Boolean(_) => None,
        };

        match setter.apply(instance, value) {
            Ok(()) => {
                debug!("属性设置完成: {}.{} = {}", name, setter.property, raw);
                outcome.edges.extend(edge);
            }
            Err(source) => {
                let e = DependencyError::InjectionFailed {
                    bean: name.to_string(),
                    point: setter.property.clone(),
                    source,
                };
                warn!("{}", e);
                outcome.failures += 1;
            }
        }
    }

    /// 按设置器形态转换原始属性值
    pub fn coerce(&self, shape: PropertyShape, raw: &str) -> PropertyValue {
        match shape {
            PropertyShape::Boolean => PropertyValue::Boolean(raw.trim().eq_ignore_ascii_case("true")),
            PropertyShape::Collection => {
                let mut values: Vec<ResolvedValue> = Vec::new();
                for element in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                    let resolved = self.references.resolve(element);
                    if !values.contains(&resolved) {
                        values.push(resolved);
                    }
                }
                PropertyValue::Collection(values)
            }
            PropertyShape::Reference => PropertyValue::Reference(self.references.resolve(raw)),
        }
    }
}

fn edge_of(dependency: &Dependency, injected: &Injected) -> EdgeTarget {
    let names = injected.bean_names();
    if dependency.is_collection() {
        return EdgeTarget::Collection(names);
    }
    match names.into_iter().next() {
        Some(name) => EdgeTarget::Bean(name),
        None => EdgeTarget::Collection(Vec::new()),
    }
}

fn report_failure(bean: &str, point: &str, e: &DependencyError) {
    match e {
        DependencyError::NotAQualifier { .. } => error!("注入失败: {}.{}, 原因: {}", bean, point, e),
        _ => warn!("注入失败: {}.{}, 原因: {}", bean, point, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_impl::InMemoryPropertySource;
    use di_abstractions::CollectionShape;
    use infrastructure_common::{Marker, Slot};
    use std::sync::Arc;

    #[derive(Default)]
    struct Pool;

    #[derive(Default)]
    struct Repository {
        pool: Slot<Arc<Pool>>,
        missing: Slot<Arc<String>>,
        tags: Slot<Vec<ResolvedValue>>,
        enabled: Slot<bool>,
        url: Slot<ResolvedValue>,
        pools: Slot<usize>,
    }

    fn repository() -> CandidateDescriptor {
        CandidateDescriptor::builder::<Repository>()
            .default_constructor()
            .inject::<Pool>("pool", |bean, pool| bean.pool.set(pool))
            .inject_named::<String>("missing", "nothing", |bean, value| bean.missing.set(value))
            .inject_method(
                "bind",
                vec![Dependency::all::<Pool>(CollectionShape::List)],
                |bean: &Repository, args| {
                    bean.pools.set(args.take_all::<Pool>(0)?.len());
                    Ok(())
                },
            )
            .property_collection("tags", |bean, tags| bean.tags.set(tags))
            .property_bool("enabled", |bean, flag| bean.enabled.set(flag))
            .property("url", |bean, url| bean.url.set(url))
            .build()
    }

    #[test]
    fn fields_methods_and_setters_are_applied() {
        let mut registry = Registry::new();
        registry.register("pool", Arc::new(Pool), CandidateDescriptor::of::<Pool>());
        registry.register("host", Arc::new("db".to_string()), CandidateDescriptor::text());

        let source = InMemoryPropertySource::new().with_defaults(
            "repository",
            [
                ("tags", "a, b ,a,${host}"),
                ("enabled", "TRUE"),
                ("url", "${pool}"),
                ("unused", "x"),
            ],
        );
        let loader = PropertyLoader::new(Arc::new(source));
        let env = EnvironmentBindings::empty();
        let injector = Injector::new(&registry, &loader, &env, "<unresolved>");

        let descriptor = repository();
        let instance = descriptor.instantiate().unwrap();
        let outcome = injector.inject("repository", &instance, &descriptor);
        let repo = descriptor.cast::<Repository>(&instance).unwrap();

        assert!(repo.pool.is_set());
        assert!(!repo.missing.is_set());
        assert_eq!(repo.pools.get(), Some(1));
        assert_eq!(
            repo.tags.get().unwrap(),
            vec![
                ResolvedValue::text("a"),
                ResolvedValue::text("b"),
                ResolvedValue::Bean {
                    name: "host".into(),
                    instance: registry.entry("host").unwrap().instance.clone(),
                    display: "db".into(),
                },
            ]
        );
        assert_eq!(repo.enabled.get(), Some(true));
        assert_eq!(repo.url.get().unwrap().bean_name(), Some("pool"));

        assert_eq!(outcome.failures, 1);
        assert_eq!(
            outcome.edges,
            vec![
                EdgeTarget::Bean("pool".into()),
                EdgeTarget::Collection(vec!["pool".into()]),
                EdgeTarget::Collection(vec!["host".into()]),
                EdgeTarget::Bean("pool".into()),
            ]
        );
    }

    #[test]
    fn undeclared_qualifiers_skip_the_slot() {
        struct Client {
            pool: Slot<Arc<Pool>>,
        }
        let descriptor = CandidateDescriptor::builder::<Client>()
            .constructor(|| Ok(Client { pool: Slot::empty() }))
            .inject_qualified::<Pool>("pool", [Marker::new("Fast")], |bean, pool| bean.pool.set(pool))
            .build();

        let mut registry = Registry::new();
        registry.register("pool", Arc::new(Pool), CandidateDescriptor::of::<Pool>());
        let loader = PropertyLoader::new(Arc::new(InMemoryPropertySource::new()));
        let env = EnvironmentBindings::empty();
        let injector = Injector::new(&registry, &loader, &env, "<unresolved>");

        let instance = descriptor.instantiate().unwrap();
        let outcome = injector.inject("client", &instance, &descriptor);

        assert_eq!(outcome.failures, 1);
        assert!(outcome.edges.is_empty());
        assert!(!descriptor.cast::<Client>(&instance).unwrap().pool.is_set());
    }

    #[test]
    fn boolean_coercion_is_case_insensitive() {
        let registry = Registry::new();
        let loader = PropertyLoader::new(Arc::new(InMemoryPropertySource::new()));
        let env = EnvironmentBindings::empty();
        let injector = Injector::new(&registry, &loader, &env, "<unresolved>");

        assert_eq!(injector.coerce(PropertyShape::Boolean, "True"), PropertyValue::Boolean(true));
        assert_eq!(injector.coerce(PropertyShape::Boolean, "yes"), PropertyValue::Boolean(false));
        assert_eq!(
            injector.coerce(PropertyShape::Collection, ""),
            PropertyValue::Collection(Vec::new())
        );
    }
}

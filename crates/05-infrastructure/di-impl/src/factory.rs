//! bean 工厂
//!
//! 把候选类型描述符或声明式条目变成注册表中的实例。创建失败只记录日志，
//! 注册表中不会出现该 bean。

use crate::reference::ReferenceResolver;
use crate::registry::Registry;
use config_impl::{EnvironmentBindings, PropertyLoader};
use di_abstractions::{CandidateDescriptor, Resolver};
use infrastructure_common::{CreationError, PropertyMap};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 映射声明的字面值
pub const MAP_DECLARATION: &str = "Map";

/// 声明式条目的值形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'v> {
    /// `Map`：按键加载属性并逐项解析引用
    Map,
    /// `String("...")`：字符串字面量
    Literal(&'v str),
    /// 其它：完整类型名称
    TypeName(&'v str),
}

impl<'v> Declaration<'v> {
    /// 按原始值的形态识别声明
    pub fn parse(value: &'v str) -> Self {
        let value = value.trim();
        if value == MAP_DECLARATION {
            return Self::Map;
        }
        match value
            .strip_prefix("String(\"")
            .and_then(|rest| rest.strip_suffix("\")"))
        {
            Some(literal) => Self::Literal(literal),
            None => Self::TypeName(value),
        }
    }
}

/// bean 工厂
pub struct BeanFactory<'a> {
    resolver: &'a dyn Resolver,
    loader: &'a PropertyLoader,
    environment: &'a EnvironmentBindings,
    unresolved_marker: &'a str,
}

impl<'a> BeanFactory<'a> {
    /// 创建 bean 工厂
    pub fn new(
        resolver: &'a dyn Resolver,
        loader: &'a PropertyLoader,
        environment: &'a EnvironmentBindings,
        unresolved_marker: &'a str,
    ) -> Self {
        Self {
            resolver,
            loader,
            environment,
            unresolved_marker,
        }
    }

    /// bean 名称：显式名称优先，其次 `Named` 标记的值，最后是首字母小写的类型名
    pub fn bean_name(descriptor: &CandidateDescriptor, explicit_name: Option<&str>) -> String {
        explicit_name
            .or_else(|| descriptor.bean_name())
            .map(str::to_string)
            .unwrap_or_else(|| descriptor.type_info().default_bean_name())
    }

    /// 由类型描述符创建并注册 bean，返回注册名称
    pub fn create_from_type(
        &self,
        registry: &mut Registry,
        descriptor: &CandidateDescriptor,
        explicit_name: Option<&str>,
    ) -> Option<String> {
        if !descriptor.is_concrete() {
            debug!("跳过非具体类型: {}", descriptor.type_info());
            return None;
        }

        let name = Self::bean_name(descriptor, explicit_name);
        match descriptor.instantiate() {
            Ok(instance) => {
                info!("创建 bean: {} ({})", name, descriptor.type_info());
                registry.register(name.clone(), instance, descriptor.clone());
                Some(name)
            }
            Err(e) => {
                error!("创建 bean 失败: {}, 原因: {}", name, e);
                None
            }
        }
    }

    /// 由声明式条目创建并注册 bean，返回注册名称
    pub fn create_from_declaration(
        &self,
        registry: &mut Registry,
        key: &str,
        value: &str,
    ) -> Option<String> {
        match Declaration::parse(value) {
            Declaration::Map => {
                let bag = match self.loader.load(key) {
                    Ok(bag) => bag,
                    Err(e) => {
                        error!("加载映射属性失败: {}, 原因: {}", key, e);
                        return None;
                    }
                };
                let references = self.references(registry);
                let map: PropertyMap = bag
                    .iter()
                    .map(|(k, raw)| (k.clone(), references.resolve(raw)))
                    .collect();
                info!("创建映射 bean: {} ({} 项)", key, map.len());
                registry.register(key, Arc::new(map), CandidateDescriptor::property_map());
                Some(key.to_string())
            }
            Declaration::Literal(literal) => {
                let text = self.references(registry).resolve(literal).to_display_string();
                info!("创建字符串 bean: {}", key);
                registry.register(key, Arc::new(text), CandidateDescriptor::text());
                Some(key.to_string())
            }
            Declaration::TypeName(type_name) => match self.resolver.find_type(type_name) {
                Some(descriptor) => self.create_from_type(registry, &descriptor, Some(key)),
                None => {
                    let e = CreationError::TypeNotFound {
                        key: key.to_string(),
                        type_name: type_name.to_string(),
                    };
                    error!("{}", e);
                    None
                }
            },
        }
    }

    fn references<'r>(&'r self, registry: &'r Registry) -> ReferenceResolver<'r> {
        ReferenceResolver::new(registry, self.environment, self.unresolved_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_impl::InMemoryPropertySource;
    use di_abstractions::BeanRegistry;
    use infrastructure_common::{DiscoveryResult, Marker, ResolvedValue, TypeInfo};
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct MailSender;

    struct Broken;

    struct FixedResolver;

    impl Resolver for FixedResolver {
        fn subclasses_of(&self, _: &str, _: &TypeInfo) -> DiscoveryResult<Vec<CandidateDescriptor>> {
            Ok(Vec::new())
        }

        fn marked_with(&self, _: &str, _: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>> {
            Ok(Vec::new())
        }

        fn marked_items(&self, _: &str, _: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>> {
            Ok(Vec::new())
        }

        fn declarative_entries(&self, _: &str) -> DiscoveryResult<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }

        fn find_type(&self, type_name: &str) -> Option<CandidateDescriptor> {
            (type_name == "mail::MailSender").then(|| {
                CandidateDescriptor::builder::<MailSender>()
                    .default_constructor()
                    .build()
            })
        }

        fn name(&self) -> &str {
            "FixedResolver"
        }
    }

    fn loader() -> PropertyLoader {
        PropertyLoader::new(Arc::new(
            InMemoryPropertySource::new()
                .with_defaults("db", [("k1", "d1")])
                .with_overrides("db", [("k1", "o1"), ("k2", "d2")]),
        ))
    }

    #[test]
    fn declarations_are_recognized_by_shape() {
        assert_eq!(Declaration::parse(" Map "), Declaration::Map);
        assert_eq!(
            Declaration::parse("String(\"jdbc:${host}\")"),
            Declaration::Literal("jdbc:${host}")
        );
        assert_eq!(
            Declaration::parse("app::Mailer"),
            Declaration::TypeName("app::Mailer")
        );
    }

    #[test]
    fn names_follow_explicit_then_marker_then_type() {
        let plain = CandidateDescriptor::of::<MailSender>();
        let named = CandidateDescriptor::builder::<MailSender>().named("mailer").build();

        assert_eq!(BeanFactory::bean_name(&plain, None), "mailSender");
        assert_eq!(BeanFactory::bean_name(&named, None), "mailer");
        assert_eq!(BeanFactory::bean_name(&named, Some("sender")), "sender");
    }

    #[test]
    fn map_declaration_merges_overrides() {
        let loader = loader();
        let env = EnvironmentBindings::empty();
        let factory = BeanFactory::new(&FixedResolver, &loader, &env, "<unresolved>");
        let mut registry = Registry::new();

        assert_eq!(
            factory.create_from_declaration(&mut registry, "db", "Map").as_deref(),
            Some("db")
        );
        let map = registry.find_by_type::<PropertyMap>().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["k1"], ResolvedValue::text("o1"));
        assert_eq!(map["k2"], ResolvedValue::text("d2"));
    }

    #[test]
    fn literal_and_type_declarations() {
        let loader = loader();
        let env = EnvironmentBindings::from_pairs([("HOST", "db.local")]);
        let factory = BeanFactory::new(&FixedResolver, &loader, &env, "<unresolved>");
        let mut registry = Registry::new();

        factory.create_from_declaration(&mut registry, "url", "String(\"jdbc://${HOST}\")");
        factory.create_from_declaration(&mut registry, "alias", "String(\"${url}\")");
        factory.create_from_declaration(&mut registry, "sender", "mail::MailSender");
        assert!(factory
            .create_from_declaration(&mut registry, "ghost", "mail::Unknown")
            .is_none());

        assert_eq!(
            registry.find_by_type_and_name::<String>("url").as_deref().map(String::as_str),
            Some("jdbc://db.local")
        );
        assert_eq!(registry.display_of("alias").as_deref(), Some("jdbc://db.local"));
        assert!(registry.find_by_type_and_name::<MailSender>("sender").is_some());
        assert_eq!(registry.bean_names(), vec!["url", "alias", "sender"]);
    }

    #[test]
    fn construction_failures_register_nothing() {
        let loader = loader();
        let env = EnvironmentBindings::empty();
        let factory = BeanFactory::new(&FixedResolver, &loader, &env, "<unresolved>");
        let mut registry = Registry::new();

        let failing = CandidateDescriptor::builder::<Broken>()
            .constructor(|| anyhow::bail!("连接被拒绝"))
            .build();
        assert!(factory.create_from_type(&mut registry, &failing, None).is_none());
        assert!(factory
            .create_from_type(&mut registry, &CandidateDescriptor::of::<Broken>(), None)
            .is_none());
        assert!(factory
            .create_from_type(&mut registry, &CandidateDescriptor::abstract_type::<dyn Send>(Vec::<Marker>::new()), None)
            .is_none());
        assert!(registry.is_empty());
    }
}

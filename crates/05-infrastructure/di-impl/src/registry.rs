//! bean 注册表
//!
//! 逻辑名称到实例的映射，保持注册顺序。类型、限定符和名称查找都在这里完成。

use di_abstractions::{
    BeanRegistry, CandidateDescriptor, Dependency, Erased, Injected, ResolvedBean, SlotKind,
};
use indexmap::IndexMap;
use infrastructure_common::{
    instance_address, DependencyError, DependencyResult, Instance, Marker, TypeInfo,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// 注册表中的一个 bean
#[derive(Debug, Clone)]
pub struct BeanEntry {
    /// 逻辑名称
    pub name: String,
    /// 实例
    pub instance: Instance,
    /// 描述符
    pub descriptor: CandidateDescriptor,
}

impl BeanEntry {
    /// 实例的字符串形式
    pub fn display(&self) -> String {
        self.descriptor.display(&self.instance, &self.name)
    }

    /// 是否可赋值给指定类型
    pub fn is_assignable_to(&self, target: &TypeInfo) -> bool {
        self.descriptor.is_assignable_to(target)
    }

    fn view(&self, target: &TypeInfo) -> Option<Erased> {
        self.descriptor.view_for(target)?.cast(&self.instance)
    }

    fn carries_all(&self, tags: &BTreeSet<Marker>) -> bool {
        tags.iter().all(|tag| self.descriptor.has_marker(tag))
    }
}

/// bean 注册表
#[derive(Debug, Clone)]
pub struct Registry {
    beans: IndexMap<String, BeanEntry>,
    qualifier_markers: BTreeSet<Marker>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// 创建空注册表，内置 `Named` 限定符
    pub fn new() -> Self {
        Self {
            beans: IndexMap::new(),
            qualifier_markers: BTreeSet::from([Marker::NAMED]),
        }
    }

    /// 登记限定符标记
    pub fn add_qualifier_marker(&mut self, marker: Marker) {
        if self.qualifier_markers.insert(marker.clone()) {
            debug!("登记限定符: {}", marker);
        }
    }

    /// 是否为已知的限定符标记
    pub fn is_qualifier(&self, marker: &Marker) -> bool {
        self.qualifier_markers.contains(marker)
    }

    /// 已知的限定符标记
    pub fn qualifier_markers(&self) -> &BTreeSet<Marker> {
        &self.qualifier_markers
    }

    /// bean 携带的限定符
    pub fn qualifiers_of(&self, name: &str) -> BTreeSet<Marker> {
        self.beans
            .get(name)
            .map(|entry| {
                entry
                    .descriptor
                    .markers()
                    .iter()
                    .filter(|marker| self.is_qualifier(marker))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 注册 bean
    ///
    /// 同名 bean 已存在时新实例替换旧实例（保留原注册位置），返回被替换的条目。
    pub fn register(
        &mut self,
        name: impl Into<String>,
        instance: Instance,
        descriptor: CandidateDescriptor,
    ) -> Option<BeanEntry> {
        let name = name.into();
        let entry = BeanEntry {
            name: name.clone(),
            instance,
            descriptor,
        };
        let replaced = self.beans.insert(name.clone(), entry);
        if let Some(previous) = &replaced {
            warn!(
                "bean 名称重复, 替换已有注册: {} ({} -> {})",
                name,
                previous.descriptor.type_info(),
                self.beans[&name].descriptor.type_info()
            );
        } else {
            debug!("注册 bean: {}", name);
        }
        replaced
    }

    /// 按名称获取条目
    pub fn entry(&self, name: &str) -> Option<&BeanEntry> {
        self.beans.get(name)
    }

    /// 按注册顺序遍历条目
    pub fn entries(&self) -> impl Iterator<Item = &BeanEntry> {
        self.beans.values()
    }

    /// 注册顺序中的位置
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.beans.get_index_of(name)
    }

    /// bean 数量
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// bean 的字符串形式
    pub fn display_of(&self, name: &str) -> Option<String> {
        self.beans.get(name).map(BeanEntry::display)
    }

    /// 校验标记都是限定符
    pub fn validate_qualifiers<'a>(
        &self,
        tags: impl IntoIterator<Item = &'a Marker>,
    ) -> DependencyResult<()> {
        for tag in tags {
            if !self.is_qualifier(tag) {
                return Err(DependencyError::NotAQualifier {
                    marker: tag.to_string(),
                });
            }
        }
        Ok(())
    }

    fn assignable<'a>(&'a self, target: &'a TypeInfo) -> impl Iterator<Item = &'a BeanEntry> + 'a {
        self.beans
            .values()
            .filter(move |entry| entry.is_assignable_to(target))
    }

    fn resolved(entry: &BeanEntry, target: &TypeInfo) -> DependencyResult<ResolvedBean> {
        entry
            .view(target)
            .map(|value| ResolvedBean::new(entry.name.clone(), value))
            .ok_or_else(|| DependencyError::TypeMismatch {
                name: entry.name.clone(),
                expected: target.name.to_string(),
            })
    }

    /// 解析依赖
    pub fn resolve(&self, dependency: &Dependency) -> DependencyResult<Injected> {
        let target = &dependency.element;
        match &dependency.kind {
            SlotKind::ByName(name) => {
                let entry = self
                    .beans
                    .get(name)
                    .ok_or_else(|| DependencyError::NamedBeanNotFound { name: name.clone() })?;
                Self::resolved(entry, target).map(Injected::Single)
            }
            SlotKind::Collection(_) => {
                let mut seen = HashSet::new();
                let mut beans = Vec::new();
                for entry in self.assignable(target) {
                    if !seen.insert(instance_address(&entry.instance)) {
                        continue;
                    }
                    beans.push(Self::resolved(entry, target)?);
                }
                Ok(Injected::Many(beans))
            }
            SlotKind::ByQualifier(tags) => {
                self.validate_qualifiers(tags)?;
                let entry = self
                    .assignable(target)
                    .find(|entry| entry.carries_all(tags))
                    .ok_or_else(|| DependencyError::QualifiedBeanNotFound {
                        type_name: target.name.to_string(),
                        qualifiers: tags
                            .iter()
                            .map(Marker::name)
                            .collect::<Vec<_>>()
                            .join(", "),
                    })?;
                Self::resolved(entry, target).map(Injected::Single)
            }
            SlotKind::ByType => {
                let entry = self.assignable(target).next().ok_or_else(|| {
                    DependencyError::BeanOfTypeNotFound {
                        type_name: target.name.to_string(),
                    }
                })?;
                Self::resolved(entry, target).map(Injected::Single)
            }
        }
    }
}

impl BeanRegistry for Registry {
    fn find_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.beans
            .values()
            .find_map(|entry| entry.descriptor.cast::<T>(&entry.instance))
    }

    fn find_all_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        let mut seen = HashSet::new();
        self.beans
            .values()
            .filter_map(|entry| {
                let bean = entry.descriptor.cast::<T>(&entry.instance)?;
                seen.insert(instance_address(&entry.instance)).then_some(bean)
            })
            .collect()
    }

    fn find_by_type_and_name<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let entry = self.beans.get(name)?;
        entry.descriptor.cast::<T>(&entry.instance)
    }

    fn find_by_qualifiers(&self, qualifiers: &[Marker]) -> DependencyResult<Vec<Instance>> {
        self.validate_qualifiers(qualifiers)?;
        let tags: BTreeSet<Marker> = qualifiers.iter().cloned().collect();
        Ok(self
            .beans
            .values()
            .filter(|entry| entry.carries_all(&tags))
            .map(|entry| entry.instance.clone())
            .collect())
    }

    fn get(&self, name: &str) -> Option<Instance> {
        self.beans.get(name).map(|entry| entry.instance.clone())
    }

    fn contains(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    fn bean_names(&self) -> Vec<String> {
        self.beans.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::CollectionShape;

    trait Channel: Send + Sync {
        fn id(&self) -> &'static str;
    }

    struct Email;
    struct Sms;

    impl Channel for Email {
        fn id(&self) -> &'static str {
            "email"
        }
    }

    impl Channel for Sms {
        fn id(&self) -> &'static str {
            "sms"
        }
    }

    fn email() -> CandidateDescriptor {
        CandidateDescriptor::builder::<Email>()
            .marker("Primary")
            .provides::<dyn Channel>(|bean| bean)
            .build()
    }

    fn sms() -> CandidateDescriptor {
        CandidateDescriptor::builder::<Sms>()
            .provides::<dyn Channel>(|bean| bean)
            .build()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_qualifier_marker(Marker::new("Primary"));
        registry.register("sms", Arc::new(Sms), sms());
        registry.register("email", Arc::new(Email), email());
        registry
    }

    #[test]
    fn by_type_returns_first_assignable_in_registration_order() {
        let registry = registry();
        let channel = registry
            .resolve(&Dependency::by_type::<dyn Channel>())
            .unwrap()
            .into_single::<dyn Channel>()
            .unwrap();
        assert_eq!(channel.id(), "sms");

        let err = registry
            .resolve(&Dependency::by_type::<String>())
            .unwrap_err();
        assert_eq!(err.to_string(), format!("bean of type {} not found", std::any::type_name::<String>()));
    }

    #[test]
    fn by_name_checks_assignability() {
        let registry = registry();
        assert!(registry
            .resolve(&Dependency::by_name::<dyn Channel>("email"))
            .is_ok());
        assert!(matches!(
            registry.resolve(&Dependency::by_name::<String>("email")),
            Err(DependencyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            registry.resolve(&Dependency::by_name::<dyn Channel>("fax")),
            Err(DependencyError::NamedBeanNotFound { .. })
        ));
    }

    #[test]
    fn qualifiers_must_be_declared() {
        let registry = registry();
        let channel = registry
            .resolve(&Dependency::qualified::<dyn Channel>([Marker::new("Primary")]))
            .unwrap()
            .into_single::<dyn Channel>()
            .unwrap();
        assert_eq!(channel.id(), "email");

        let err = registry
            .find_by_qualifiers(&[Marker::new("Fast")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Not a qualifier: Fast");
        assert_eq!(registry.find_by_qualifiers(&[Marker::new("Primary")]).unwrap().len(), 1);
    }

    #[test]
    fn collections_hold_each_instance_once() {
        let mut registry = registry();
        let shared = registry.get("sms").unwrap();
        registry.register("sms-alias", shared, sms());

        let list = registry
            .resolve(&Dependency::all::<dyn Channel>(CollectionShape::List))
            .unwrap();
        let set = registry
            .resolve(&Dependency::all::<dyn Channel>(CollectionShape::Set))
            .unwrap();

        assert_eq!(list.bean_names(), vec!["sms", "email"]);
        assert_eq!(set.bean_names(), vec!["sms", "email"]);
        assert_eq!(registry.find_all_by_type::<dyn Channel>().len(), 2);
    }

    #[test]
    fn aliases_without_the_view_do_not_hide_castable_ones() {
        let shared: Instance = Arc::new(Email);
        let mut registry = Registry::new();
        registry.register("plain", shared.clone(), CandidateDescriptor::of::<Email>());
        registry.register("email", shared.clone(), email());
        registry.register("alias", shared, email());

        let list = registry
            .resolve(&Dependency::all::<dyn Channel>(CollectionShape::List))
            .unwrap();

        assert_eq!(list.bean_names(), vec!["email"]);
        assert_eq!(registry.find_all_by_type::<dyn Channel>().len(), 1);
        assert_eq!(registry.find_all_by_type::<Email>().len(), 1);
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let mut registry = registry();
        let replaced = registry.register("sms", Arc::new("text".to_string()), CandidateDescriptor::text());

        assert!(replaced.is_some());
        assert_eq!(registry.bean_names(), vec!["sms", "email"]);
        assert_eq!(registry.display_of("sms").as_deref(), Some("text"));
        assert!(registry.find_by_type_and_name::<Sms>("sms").is_none());
        assert!(registry.find_by_type_and_name::<String>("sms").is_some());
    }
}

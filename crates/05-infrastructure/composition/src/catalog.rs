//! 目录式解析器
//!
//! 不扫描任何代码：候选类型由调用方显式登记，声明式条目来自内存登记或
//! 目录中直接位于其下的 `*.properties` 文件。

use config_impl::PROPERTIES_EXTENSION;
use di_abstractions::{CandidateDescriptor, Resolver};
use infrastructure_common::{
    path_is_under, DiscoveryError, DiscoveryResult, Marker, TypeInfo,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
struct CatalogEntry {
    location: String,
    descriptor: CandidateDescriptor,
}

/// 目录式解析器
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    entries: Vec<CatalogEntry>,
    declarative: BTreeMap<String, BTreeSet<String>>,
    declarative_dirs: BTreeMap<String, PathBuf>,
}

impl CatalogResolver {
    /// 创建空的解析器
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记描述符，位置取其类型路径
    pub fn register(mut self, descriptor: CandidateDescriptor) -> Self {
        let location = descriptor
            .type_info()
            .name
            .trim_start_matches("dyn ")
            .to_string();
        self.entries.push(CatalogEntry {
            location,
            descriptor,
        });
        self
    }

    /// 在指定模块路径下登记描述符，适用于标记声明等没有类型路径的条目
    pub fn register_in(mut self, root: impl Into<String>, descriptor: CandidateDescriptor) -> Self {
        self.entries.push(CatalogEntry {
            location: root.into(),
            descriptor,
        });
        self
    }

    /// 登记声明式条目标识
    pub fn declarative_entry(mut self, root: impl Into<String>, entry: impl Into<String>) -> Self {
        self.declarative
            .entry(root.into())
            .or_default()
            .insert(entry.into());
        self
    }

    /// 把目录中直接位于其下的属性文件作为扫描根的声明式条目
    pub fn declarative_dir<P: AsRef<Path>>(mut self, root: impl Into<String>, dir: P) -> Self {
        self.declarative_dirs
            .insert(root.into(), dir.as_ref().to_path_buf());
        self
    }

    /// 登记的描述符数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn under<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a CandidateDescriptor> + 'a {
        self.entries
            .iter()
            .filter(move |entry| path_is_under(&entry.location, root))
            .map(|entry| &entry.descriptor)
    }

    fn list_dir(root: &str, dir: &Path) -> DiscoveryResult<BTreeSet<String>> {
        let read = std::fs::read_dir(dir)
            .map_err(|e| DiscoveryError::root_unavailable(root, format!("{}: {}", dir.display(), e)))?;

        let mut entries = BTreeSet::new();
        for item in read {
            let item = item.map_err(|e| DiscoveryError::root_unavailable(root, e.to_string()))?;
            let path = item.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(PROPERTIES_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                entries.insert(stem.to_string());
            }
        }
        debug!("声明式目录 {} 中有 {} 个条目", dir.display(), entries.len());
        Ok(entries)
    }
}

impl Resolver for CatalogResolver {
    fn subclasses_of(&self, root: &str, target: &TypeInfo) -> DiscoveryResult<Vec<CandidateDescriptor>> {
        Ok(self
            .under(root)
            .filter(|d| d.is_concrete() && d.is_assignable_to(target))
            .cloned()
            .collect())
    }

    fn marked_with(&self, root: &str, marker: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>> {
        Ok(self
            .under(root)
            .filter(|d| d.is_concrete() && d.has_marker(marker))
            .cloned()
            .collect())
    }

    fn marked_items(&self, root: &str, marker: &Marker) -> DiscoveryResult<Vec<CandidateDescriptor>> {
        Ok(self
            .under(root)
            .filter(|d| d.has_marker(marker))
            .cloned()
            .collect())
    }

    fn declarative_entries(&self, root: &str) -> DiscoveryResult<BTreeSet<String>> {
        let mut entries = self.declarative.get(root).cloned().unwrap_or_default();
        if let Some(dir) = self.declarative_dirs.get(root) {
            entries.extend(Self::list_dir(root, dir)?);
        }
        Ok(entries)
    }

    fn find_type(&self, type_name: &str) -> Option<CandidateDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.type_info().name == type_name)
            .map(|entry| entry.descriptor.clone())
    }

    fn name(&self) -> &str {
        "CatalogResolver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    trait Store: Send + Sync {}

    #[derive(Default)]
    struct MemoryStore;
    impl Store for MemoryStore {}

    fn catalog() -> CatalogResolver {
        CatalogResolver::new()
            .register(
                CandidateDescriptor::builder::<MemoryStore>()
                    .marker("Primary")
                    .default_constructor()
                    .provides::<dyn Store>(|bean| bean)
                    .build(),
            )
            .register(CandidateDescriptor::abstract_type::<dyn Store>([Marker::new("Primary")]))
    }

    #[test]
    fn filters_by_root_marker_and_type() {
        let catalog = catalog();
        let root = module_path!();

        assert_eq!(catalog.subclasses_of(root, &TypeInfo::of::<dyn Store>()).unwrap().len(), 1);
        assert_eq!(catalog.marked_with(root, &Marker::new("Primary")).unwrap().len(), 1);
        assert_eq!(catalog.marked_items(root, &Marker::new("Primary")).unwrap().len(), 2);
        assert!(catalog.marked_with("elsewhere", &Marker::new("Primary")).unwrap().is_empty());
        assert_eq!(
            catalog
                .marked_subclasses_of(root, &TypeInfo::of::<dyn Store>(), &Marker::NAMED)
                .unwrap()
                .len(),
            0
        );
        assert!(catalog.find_type(std::any::type_name::<MemoryStore>()).is_some());
    }

    #[test]
    fn lists_property_files_without_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("beans.properties"), "a=Map\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.properties")).unwrap();

        let catalog = CatalogResolver::new()
            .declarative_entry("app", "extra")
            .declarative_dir("app", dir.path());
        let entries = catalog.declarative_entries("app").unwrap();

        assert_eq!(entries.into_iter().collect::<Vec<_>>(), vec!["beans", "extra"]);
        assert!(catalog.declarative_entries("other").unwrap().is_empty());
    }

    #[test]
    fn missing_directory_makes_root_unavailable() {
        let catalog = CatalogResolver::new().declarative_dir("app", "/nonexistent/beans-dir");
        let err = catalog.declarative_entries("app").unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, DiscoveryError::RootUnavailable { .. }));
    }
}

//! bean 图启动示例
//!
//! 演示用描述符登记组件、用属性源提供配置，并在启动后查询注册表

use config_impl::{EnvironmentBindings, InMemoryPropertySource};
use di_abstractions::{BeanRegistry, CandidateDescriptor, CollectionShape};
use infrastructure_common::{Marker, Slot};
use infrastructure_composition::{BootstrapBuilder, CatalogResolver, LoggingConfig};
use std::sync::Arc;

// 示例：用户仓储 trait
pub trait UserRepository: Send + Sync {
    fn find_name(&self, id: u64) -> Option<String>;
}

// 示例：内存仓储实现
#[derive(Default)]
pub struct MemoryUserRepository;

impl UserRepository for MemoryUserRepository {
    fn find_name(&self, id: u64) -> Option<String> {
        (id == 1).then(|| "张三".to_string())
    }
}

// 示例：用户服务
#[derive(Default)]
pub struct UserService {
    repositories: Slot<Vec<Arc<dyn UserRepository>>>,
    greeting: Slot<String>,
}

impl UserService {
    pub fn greet(&self, id: u64) -> String {
        let name = self
            .repositories
            .get()
            .unwrap_or_default()
            .iter()
            .find_map(|repository| repository.find_name(id))
            .unwrap_or_else(|| "访客".to_string());
        format!("{}, {}", self.greeting.get().unwrap_or_default(), name)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = module_path!();
    let resolver = CatalogResolver::new()
        .register_in(root, CandidateDescriptor::marker_declaration("Repository", [Marker::SCOPE]))
        .register(
            CandidateDescriptor::builder::<MemoryUserRepository>()
                .marker("Repository")
                .default_constructor()
                .provides::<dyn UserRepository>(|bean| bean)
                .build(),
        )
        .register(
            CandidateDescriptor::builder::<UserService>()
                .named("userService")
                .default_constructor()
                .inject_all::<dyn UserRepository>("repositories", CollectionShape::List, |bean, all| {
                    bean.repositories.set(all)
                })
                .property("greeting", |bean, value| bean.greeting.set(value.to_display_string()))
                .build(),
        );

    let properties = InMemoryPropertySource::new()
        .with_defaults("userService", [("greeting", "${GREETING} from ${REGION}")]);

    let container = BootstrapBuilder::new()
        .with_logging(LoggingConfig::development())
        .with_resolver(resolver)
        .with_property_source(properties)
        .with_environment(EnvironmentBindings::from_pairs([("GREETING", "你好")]))
        .search_root(root)
        .build()?;

    if let Some(service) = container.find_by_type::<UserService>() {
        println!("{}", service.greet(1));
        println!("{}", service.greet(2));
    }

    println!("{:#?}", container.diagnostics());
    Ok(())
}

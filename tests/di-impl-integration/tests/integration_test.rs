//! Centralized end-to-end tests: builder, catalog resolver, property directories

use config_impl::{EnvironmentBindings, InMemoryPropertySource};
use di_abstractions::{BeanRegistry, CandidateDescriptor, CollectionShape, Dependency};
use di_impl::{Container, EdgeTarget};
use infrastructure_common::{Marker, PropertyMap, ResolvedValue, Slot};
use infrastructure_composition::{BootstrapBuilder, CatalogResolver, LoggingConfig};
use std::fs;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        LoggingConfig::development().init();
    });
}

const ROOT: &str = module_path!();

// ---- 应用类型 ----

trait PaymentGateway: Send + Sync {
    fn code(&self) -> &'static str;
}

#[derive(Default)]
struct CardGateway;

impl PaymentGateway for CardGateway {
    fn code(&self) -> &'static str {
        "card"
    }
}

#[derive(Default)]
struct WalletGateway;

impl PaymentGateway for WalletGateway {
    fn code(&self) -> &'static str {
        "wallet"
    }
}

#[derive(Default)]
struct Checkout {
    gateways: Slot<Vec<Arc<dyn PaymentGateway>>>,
    preferred: Slot<Arc<dyn PaymentGateway>>,
    limits: Slot<Arc<PropertyMap>>,
    currencies: Slot<Vec<ResolvedValue>>,
    audit: Slot<ResolvedValue>,
    ready: Slot<bool>,
}

#[derive(Default)]
struct AuditLog {
    target: Slot<String>,
}

fn catalog() -> CatalogResolver {
    CatalogResolver::new()
        .register_in(ROOT, CandidateDescriptor::marker_declaration("Preferred", [Marker::QUALIFIER]))
        .register_in(ROOT, CandidateDescriptor::marker_declaration("Component", [Marker::SCOPE]))
        .register(CandidateDescriptor::abstract_type::<dyn PaymentGateway>(Vec::<Marker>::new()))
        .register(
            CandidateDescriptor::builder::<CardGateway>()
                .marker("Component")
                .default_constructor()
                .provides::<dyn PaymentGateway>(|bean| bean)
                .build(),
        )
        .register(
            CandidateDescriptor::builder::<WalletGateway>()
                .marker("Component")
                .marker("Preferred")
                .default_constructor()
                .provides::<dyn PaymentGateway>(|bean| bean)
                .build(),
        )
        .register(
            CandidateDescriptor::builder::<AuditLog>()
                .named("audit")
                .default_constructor()
                .property("target", |bean, target| bean.target.set(target.to_display_string()))
                .display_with(|bean| format!("audit->{}", bean.target.get().unwrap_or_default()))
                .build(),
        )
        .register(
            CandidateDescriptor::builder::<Checkout>()
                .named("checkout")
                .default_constructor()
                .inject_all::<dyn PaymentGateway>("gateways", CollectionShape::Set, |bean, all| {
                    bean.gateways.set(all)
                })
                .inject_method(
                    "configure",
                    vec![
                        Dependency::qualified::<dyn PaymentGateway>([Marker::new("Preferred")]),
                        Dependency::by_name::<PropertyMap>("limits"),
                    ],
                    |bean: &Checkout, args| {
                        bean.preferred.set(args.take::<dyn PaymentGateway>(0)?);
                        bean.limits.set(args.take::<PropertyMap>(1)?);
                        Ok(())
                    },
                )
                .property_collection("currencies", |bean, values| bean.currencies.set(values))
                .property("audit", |bean, audit| bean.audit.set(audit))
                .post_construct("ready", |bean: &Checkout| {
                    if !bean.preferred.is_set() {
                        anyhow::bail!("preferred gateway missing");
                    }
                    bean.ready.set(true);
                    Ok(())
                })
                .build(),
        )
        .declarative_entry(ROOT, "beans")
}

fn properties() -> InMemoryPropertySource {
    InMemoryPropertySource::new()
        .with_defaults("beans", [("limits", "Map"), ("currency", "String(\"EUR\")")])
        .with_defaults("limits", [("daily", "1000"), ("single", "250")])
        .with_overrides("limits", [("single", "500")])
        .with_defaults(
            "checkout",
            [("currencies", "${currency}, USD, ${currency}"), ("audit", "${audit}")],
        )
        .with_defaults("audit", [("target", "${LOG_HOST}/payments")])
}

fn build() -> Container {
    init_test_logger();
    BootstrapBuilder::new()
        .with_resolver(catalog())
        .with_property_source(properties())
        .with_environment(EnvironmentBindings::from_pairs([("LOG_HOST", "logs.internal")]))
        .search_root(ROOT)
        .build()
        .unwrap()
}

#[test]
fn test_checkout_graph_is_fully_wired() {
    let container = build();
    let checkout = container.find_by_type::<Checkout>().unwrap();

    let gateways: Vec<&str> = checkout
        .gateways
        .get()
        .unwrap()
        .iter()
        .map(|gateway| gateway.code())
        .collect();
    assert_eq!(gateways, vec!["card", "wallet"]);
    assert_eq!(checkout.preferred.get().unwrap().code(), "wallet");

    let limits = checkout.limits.get().unwrap();
    assert_eq!(limits["daily"], ResolvedValue::text("1000"));
    assert_eq!(limits["single"], ResolvedValue::text("500"));

    let currencies: Vec<String> = checkout
        .currencies
        .get()
        .unwrap()
        .iter()
        .map(ResolvedValue::to_display_string)
        .collect();
    assert_eq!(currencies, vec!["EUR", "USD"]);

    let audit = checkout.audit.get().unwrap();
    assert_eq!(audit.bean_name(), Some("audit"));
    assert_eq!(audit.to_display_string(), "audit->logs.internal/payments");
    assert_eq!(checkout.ready.get(), Some(true));
}

#[test]
fn test_checkout_is_initialized_after_its_dependencies() {
    let container = build();

    let ordered = container.ordered();
    let position = |name: &str| ordered.iter().position(|bean| bean == name);
    for dependency in ["cardGateway", "walletGateway", "limits", "currency", "audit"] {
        assert!(position(dependency).is_some(), "{} 未排序", dependency);
        assert!(position(dependency) < position("checkout"));
    }
    assert!(container.pending().is_empty());

    let edges = container.dependencies_of("checkout");
    assert!(edges.contains(&EdgeTarget::Bean("audit".into())));
    assert!(edges.contains(&EdgeTarget::Collection(vec!["currency".into()])));
    assert!(edges.contains(&EdgeTarget::Bean("limits".into())));
}

#[test]
fn test_qualifier_queries() {
    let container = build();

    let preferred = container.find_by_qualifiers(&[Marker::new("Preferred")]).unwrap();
    assert_eq!(preferred.len(), 1);

    let err = container.find_by_qualifiers(&[Marker::new("Component")]).unwrap_err();
    assert_eq!(err.to_string(), "Not a qualifier: Component");
}

#[test]
fn test_diagnostics_report_the_graph() {
    let container = build();
    let diagnostics = container.diagnostics();

    assert_eq!(diagnostics.bean_names.len(), container.bean_names().len());
    assert!(diagnostics.lifecycle.failed.is_empty());
    assert!(diagnostics.lifecycle.invoked.contains(&"checkout".to_string()));

    assert_eq!(
        diagnostics.qualifiers.get("walletGateway"),
        Some(&vec!["Preferred".to_string()])
    );
    assert!(!diagnostics.qualifiers.contains_key("cardGateway"));

    let json = serde_json::to_value(&diagnostics).unwrap();
    assert!(json["edges"]["checkout"].is_array());
    assert!(json["created_at"].is_string());
}

#[test]
fn test_map_declaration_from_property_directories() {
    init_test_logger();
    let defaults = TempDir::new().unwrap();
    let overrides = TempDir::new().unwrap();
    fs::write(defaults.path().join("beans.properties"), "settings = Map\n").unwrap();
    fs::write(defaults.path().join("settings.properties"), "k1=d1\n").unwrap();
    fs::write(overrides.path().join("settings.properties"), "k1: o1\nk2: d2\n").unwrap();

    let container = BootstrapBuilder::new()
        .with_resolver(CatalogResolver::new().declarative_dir(ROOT, defaults.path()))
        .with_property_source(
            config_impl::DirectoryPropertySource::new(defaults.path()).with_overrides(overrides.path()),
        )
        .with_environment(EnvironmentBindings::empty())
        .search_root(ROOT)
        .build()
        .unwrap();

    let settings = container.find_by_type_and_name::<PropertyMap>("settings").unwrap();
    let expected: PropertyMap = [("k1", "o1"), ("k2", "d2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), ResolvedValue::text(v)))
        .collect();
    assert_eq!(*settings, expected);
}

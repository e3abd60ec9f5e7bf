//! 候选类型描述符
//!
//! 取代运行时反射：每个可被容器管理的类型在编译期通过 [`DescriptorBuilder`]
//! 声明自己的构造器、可赋值的类型视图、注入点、属性设置器和初始化钩子。

use infrastructure_common::{
    CreationError, CreationResult, DependencyError, DependencyResult, Instance, LifecycleError,
    LifecycleResult, Marker, PropertyMap, ResolvedValue, TypeInfo,
};
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 类型擦除后的 `Arc<D>`
pub type Erased = Box<dyn Any + Send + Sync>;

type CastFn = Arc<dyn Fn(&Instance) -> Option<Erased> + Send + Sync>;
type ConstructorFn = Arc<dyn Fn() -> anyhow::Result<Instance> + Send + Sync>;
type FieldApplyFn = Arc<dyn Fn(&Instance, Injected) -> DependencyResult<()> + Send + Sync>;
type InvokeFn = Arc<dyn Fn(&Instance, &mut MethodArgs) -> anyhow::Result<()> + Send + Sync>;
type SetterFn = Arc<dyn Fn(&Instance, PropertyValue) -> anyhow::Result<()> + Send + Sync>;
type HookFn = Arc<dyn Fn(&Instance, &[Instance]) -> anyhow::Result<()> + Send + Sync>;
type DisplayFn = Arc<dyn Fn(&Instance) -> Option<String> + Send + Sync>;

/// 类型视图：实例可以被当作哪个类型（自身、trait object 等）使用
#[derive(Clone)]
pub struct TypeView {
    type_info: TypeInfo,
    cast: CastFn,
}

impl TypeView {
    fn identity<T: Send + Sync + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            cast: Arc::new(|instance: &Instance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|typed| Box::new(typed) as Erased)
            }),
        }
    }

    fn projected<T, D>(project: impl Fn(Arc<T>) -> Arc<D> + Send + Sync + 'static) -> Self
    where
        T: Send + Sync + 'static,
        D: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<D>(),
            cast: Arc::new(move |instance: &Instance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|typed| Box::new(project(typed)) as Erased)
            }),
        }
    }

    /// 视图对应的类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 把实例转换为该视图，结果中装的是 `Arc<D>`
    pub fn cast(&self, instance: &Instance) -> Option<Erased> {
        (self.cast)(instance)
    }
}

impl fmt::Debug for TypeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeView").field(&self.type_info.name).finish()
    }
}

/// 集合注入的形态
///
/// 两种形态注入的元素相同：每个可赋值实例只出现一次，与 `find_all_by_type` 一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// 有序，按实例首次出现的注册表顺序
    List,
    /// 无序集合
    Set,
}

/// 注入槽类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKind {
    /// 第一个可赋值的 bean
    ByType,
    /// 按逻辑名称精确查找
    ByName(String),
    /// 第一个携带全部限定符的可赋值 bean
    ByQualifier(BTreeSet<Marker>),
    /// 全部可赋值的 bean
    Collection(CollectionShape),
}

/// 依赖声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// 元素类型
    pub element: TypeInfo,
    /// 槽类型
    pub kind: SlotKind,
}

impl Dependency {
    /// 按类型注入
    pub fn by_type<D: ?Sized + 'static>() -> Self {
        Self {
            element: TypeInfo::of::<D>(),
            kind: SlotKind::ByType,
        }
    }

    /// 按名称注入
    pub fn by_name<D: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            element: TypeInfo::of::<D>(),
            kind: SlotKind::ByName(name.into()),
        }
    }

    /// 按限定符注入
    pub fn qualified<D: ?Sized + 'static>(qualifiers: impl IntoIterator<Item = Marker>) -> Self {
        Self {
            element: TypeInfo::of::<D>(),
            kind: SlotKind::ByQualifier(qualifiers.into_iter().collect()),
        }
    }

    /// 注入全部可赋值的 bean
    pub fn all<D: ?Sized + 'static>(shape: CollectionShape) -> Self {
        Self {
            element: TypeInfo::of::<D>(),
            kind: SlotKind::Collection(shape),
        }
    }

    /// 是否为集合依赖
    pub fn is_collection(&self) -> bool {
        matches!(self.kind, SlotKind::Collection(_))
    }
}

/// 已解析的单个 bean
pub struct ResolvedBean {
    /// bean 名称
    pub name: String,
    value: Erased,
}

impl ResolvedBean {
    /// 创建已解析的 bean，`value` 中必须装有 `Arc<D>`
    pub fn new(name: impl Into<String>, value: Erased) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// 取出 `Arc<D>`
    pub fn downcast<D: ?Sized + Send + Sync + 'static>(self) -> Option<Arc<D>> {
        self.value.downcast::<Arc<D>>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for ResolvedBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBean")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 依赖解析结果
#[derive(Debug)]
pub enum Injected {
    /// 单个 bean
    Single(ResolvedBean),
    /// bean 集合
    Many(Vec<ResolvedBean>),
}

impl Injected {
    /// 参与解析的 bean 名称
    pub fn bean_names(&self) -> Vec<String> {
        match self {
            Self::Single(bean) => vec![bean.name.clone()],
            Self::Many(beans) => beans.iter().map(|bean| bean.name.clone()).collect(),
        }
    }

    /// 取出单个 bean
    pub fn into_single<D: ?Sized + Send + Sync + 'static>(self) -> DependencyResult<Arc<D>> {
        match self {
            Self::Single(bean) => {
                let name = bean.name.clone();
                bean.downcast::<D>().ok_or_else(|| DependencyError::TypeMismatch {
                    name,
                    expected: std::any::type_name::<D>().to_string(),
                })
            }
            Self::Many(_) => Err(DependencyError::TypeMismatch {
                name: "<collection>".to_string(),
                expected: std::any::type_name::<D>().to_string(),
            }),
        }
    }

    /// 取出 bean 集合
    pub fn into_many<D: ?Sized + Send + Sync + 'static>(self) -> DependencyResult<Vec<Arc<D>>> {
        let beans = match self {
            Self::Single(bean) => vec![bean],
            Self::Many(beans) => beans,
        };
        beans
            .into_iter()
            .map(|bean| {
                let name = bean.name.clone();
                bean.downcast::<D>().ok_or_else(|| DependencyError::TypeMismatch {
                    name,
                    expected: std::any::type_name::<D>().to_string(),
                })
            })
            .collect()
    }
}

/// 注入方法的实参
#[derive(Debug, Default)]
pub struct MethodArgs {
    values: Vec<Option<Injected>>,
}

impl MethodArgs {
    /// 由已解析的参数创建
    pub fn new(values: Vec<Injected>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// 参数个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取出第 `index` 个单值参数
    pub fn take<D: ?Sized + Send + Sync + 'static>(&mut self, index: usize) -> DependencyResult<Arc<D>> {
        self.take_raw(index)?.into_single::<D>()
    }

    /// 取出第 `index` 个集合参数
    pub fn take_all<D: ?Sized + Send + Sync + 'static>(
        &mut self,
        index: usize,
    ) -> DependencyResult<Vec<Arc<D>>> {
        self.take_raw(index)?.into_many::<D>()
    }

    fn take_raw(&mut self, index: usize) -> DependencyResult<Injected> {
        self.values
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(DependencyError::MissingArgument { index })
    }
}

/// 字段注入点
#[derive(Clone)]
pub struct FieldPoint {
    /// 字段名称
    pub name: String,
    /// 依赖声明
    pub dependency: Dependency,
    apply: FieldApplyFn,
}

impl FieldPoint {
    /// 把解析结果写入实例
    pub fn apply(&self, instance: &Instance, injected: Injected) -> DependencyResult<()> {
        (self.apply)(instance, injected)
    }
}

impl fmt::Debug for FieldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPoint")
            .field("name", &self.name)
            .field("dependency", &self.dependency)
            .finish_non_exhaustive()
    }
}

/// 带参数的注入方法
#[derive(Clone)]
pub struct InjectionMethod {
    /// 方法名称
    pub name: String,
    /// 参数依赖
    pub params: Vec<Dependency>,
    invoke: InvokeFn,
}

impl InjectionMethod {
    /// 以绑定好的参数调用方法
    pub fn invoke(&self, instance: &Instance, args: &mut MethodArgs) -> anyhow::Result<()> {
        (self.invoke)(instance, args)
    }
}

/// 属性设置器的参数形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    /// `"true"`（忽略大小写）为真，其余为假
    Boolean,
    /// 逗号分隔，每个元素都经过引用解析
    Collection,
    /// 直接引用解析
    Reference,
}

/// 传给属性设置器的值
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 布尔值
    Boolean(bool),
    /// 去重后的集合
    Collection(Vec<ResolvedValue>),
    /// 单个值
    Reference(ResolvedValue),
}

/// 约定式属性设置器
#[derive(Clone)]
pub struct PropertySetter {
    /// 属性名称，与属性包中的键匹配
    pub property: String,
    /// 参数形态
    pub shape: PropertyShape,
    apply: SetterFn,
}

impl PropertySetter {
    /// 调用设置器
    pub fn apply(&self, instance: &Instance, value: PropertyValue) -> anyhow::Result<()> {
        (self.apply)(instance, value)
    }
}

/// 方法注入点，按声明顺序执行
#[derive(Clone)]
pub enum MethodPoint {
    /// 注入方法
    Inject(InjectionMethod),
    /// 属性设置器
    Setter(PropertySetter),
}

impl MethodPoint {
    /// 方法名称
    pub fn name(&self) -> &str {
        match self {
            Self::Inject(method) => &method.name,
            Self::Setter(setter) => &setter.property,
        }
    }
}

impl fmt::Debug for MethodPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inject(method) => f
                .debug_struct("Inject")
                .field("name", &method.name)
                .field("params", &method.params)
                .finish_non_exhaustive(),
            Self::Setter(setter) => f
                .debug_struct("Setter")
                .field("property", &setter.property)
                .field("shape", &setter.shape)
                .finish_non_exhaustive(),
        }
    }
}

/// 初始化钩子
#[derive(Clone)]
pub struct PostConstructHook {
    /// 钩子名称
    pub name: String,
    /// 钩子声明的参数类型
    pub parameters: Vec<TypeInfo>,
    invoke: HookFn,
}

impl PostConstructHook {
    /// 调用钩子；参数个数与声明不符时返回签名不兼容错误
    pub fn invoke(&self, instance: &Instance, args: &[Instance]) -> LifecycleResult<()> {
        if args.len() != self.parameters.len() {
            return Err(LifecycleError::IncompatibleHook {
                hook: self.name.clone(),
                expected: self.parameters.len(),
                actual: args.len(),
            });
        }
        (self.invoke)(instance, args).map_err(|source| LifecycleError::HookFailed {
            hook: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for PostConstructHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostConstructHook")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 候选条目的种类
#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeKind {
    /// 可实例化的具体类型
    Concrete,
    /// 抽象类型或 trait
    Abstract,
    /// 标记声明（例如自定义限定符）
    MarkerDeclaration(Marker),
}

struct DescriptorInner {
    type_info: TypeInfo,
    kind: TypeKind,
    bean_name: Option<String>,
    markers: BTreeSet<Marker>,
    views: Vec<TypeView>,
    constructor: Option<ConstructorFn>,
    fields: Vec<FieldPoint>,
    methods: Vec<MethodPoint>,
    post_construct: Option<PostConstructHook>,
    display: Option<DisplayFn>,
}

impl DescriptorInner {
    fn new(type_info: TypeInfo, kind: TypeKind) -> Self {
        Self {
            type_info,
            kind,
            bean_name: None,
            markers: BTreeSet::new(),
            views: Vec::new(),
            constructor: None,
            fields: Vec::new(),
            methods: Vec::new(),
            post_construct: None,
            display: None,
        }
    }
}

/// 候选类型描述符
///
/// 由解析器产出，克隆代价很低。
#[derive(Clone)]
pub struct CandidateDescriptor {
    inner: Arc<DescriptorInner>,
}

static TEXT_DESCRIPTOR: Lazy<CandidateDescriptor> = Lazy::new(|| {
    CandidateDescriptor::builder::<String>()
        .display_with(|text: &String| text.clone())
        .build()
});

static PROPERTY_MAP_DESCRIPTOR: Lazy<CandidateDescriptor> = Lazy::new(|| {
    CandidateDescriptor::builder::<PropertyMap>()
        .display_with(|map: &PropertyMap| {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            format!("{{{}}}", entries.join(", "))
        })
        .build()
});

impl CandidateDescriptor {
    /// 开始声明类型 `T`
    pub fn builder<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::new()
    }

    /// 只有自身类型视图的描述符，适用于外部提供的实例
    pub fn of<T: Send + Sync + 'static>() -> Self {
        Self::builder::<T>().build()
    }

    /// 字符串 bean 的描述符
    pub fn text() -> Self {
        TEXT_DESCRIPTOR.clone()
    }

    /// 映射 bean 的描述符
    pub fn property_map() -> Self {
        PROPERTY_MAP_DESCRIPTOR.clone()
    }

    /// 抽象类型（trait）条目，仅用于元级发现
    pub fn abstract_type<D: ?Sized + 'static>(markers: impl IntoIterator<Item = Marker>) -> Self {
        let mut inner = DescriptorInner::new(TypeInfo::of::<D>(), TypeKind::Abstract);
        inner.markers = markers.into_iter().collect();
        Self {
            inner: Arc::new(inner),
        }
    }

    /// 标记声明条目，例如 `marker_declaration("Primary", [Marker::QUALIFIER])`
    pub fn marker_declaration(
        marker: impl Into<Marker>,
        meta: impl IntoIterator<Item = Marker>,
    ) -> Self {
        let marker = marker.into();
        let mut inner = DescriptorInner::new(
            TypeInfo::synthetic(marker.name().to_string()),
            TypeKind::MarkerDeclaration(marker),
        );
        inner.markers = meta.into_iter().collect();
        Self {
            inner: Arc::new(inner),
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.inner.type_info
    }

    /// 是否为具体类型
    pub fn is_concrete(&self) -> bool {
        self.inner.kind == TypeKind::Concrete
    }

    /// 标记声明所声明的标记
    pub fn declared_marker(&self) -> Option<&Marker> {
        match &self.inner.kind {
            TypeKind::MarkerDeclaration(marker) => Some(marker),
            _ => None,
        }
    }

    /// `Named` 标记的值
    pub fn bean_name(&self) -> Option<&str> {
        self.inner.bean_name.as_deref()
    }

    /// 类型上的全部标记
    pub fn markers(&self) -> &BTreeSet<Marker> {
        &self.inner.markers
    }

    /// 是否携带指定标记
    pub fn has_marker(&self, marker: &Marker) -> bool {
        self.inner.markers.contains(marker)
    }

    /// 指定类型的视图
    pub fn view_for(&self, target: &TypeInfo) -> Option<&TypeView> {
        self.inner
            .views
            .iter()
            .find(|view| view.type_info.id == target.id)
    }

    /// 是否可赋值给指定类型
    pub fn is_assignable_to(&self, target: &TypeInfo) -> bool {
        self.view_for(target).is_some()
    }

    /// 把实例转换为 `Arc<D>`
    pub fn cast<D: ?Sized + Send + Sync + 'static>(&self, instance: &Instance) -> Option<Arc<D>> {
        self.view_for(&TypeInfo::of::<D>())?
            .cast(instance)?
            .downcast::<Arc<D>>()
            .ok()
            .map(|boxed| *boxed)
    }

    /// 字段注入点
    pub fn fields(&self) -> &[FieldPoint] {
        &self.inner.fields
    }

    /// 方法注入点
    pub fn methods(&self) -> &[MethodPoint] {
        &self.inner.methods
    }

    /// 初始化钩子
    pub fn post_construct(&self) -> Option<&PostConstructHook> {
        self.inner.post_construct.as_ref()
    }

    /// 通过无参构造器创建实例
    pub fn instantiate(&self) -> CreationResult<Instance> {
        let constructor =
            self.inner
                .constructor
                .as_ref()
                .ok_or_else(|| CreationError::NoViableConstructor {
                    type_name: self.inner.type_info.name.to_string(),
                })?;
        constructor().map_err(|source| CreationError::ConstructionFailed {
            type_name: self.inner.type_info.name.to_string(),
            source,
        })
    }

    /// 实例的字符串形式，未声明时使用 `类型名@bean名`
    pub fn display(&self, instance: &Instance, bean_name: &str) -> String {
        self.inner
            .display
            .as_ref()
            .and_then(|display| display(instance))
            .unwrap_or_else(|| format!("{}@{}", self.inner.type_info.name, bean_name))
    }
}

impl fmt::Debug for CandidateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateDescriptor")
            .field("type", &self.inner.type_info.name)
            .field("kind", &self.inner.kind)
            .field("bean_name", &self.inner.bean_name)
            .field("markers", &self.inner.markers)
            .field("views", &self.inner.views)
            .field("fields", &self.inner.fields)
            .field("methods", &self.inner.methods)
            .field("post_construct", &self.inner.post_construct)
            .finish_non_exhaustive()
    }
}

/// 描述符构建器
pub struct DescriptorBuilder<T> {
    inner: DescriptorInner,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    fn new() -> Self {
        let mut inner = DescriptorInner::new(TypeInfo::of::<T>(), TypeKind::Concrete);
        inner.views.push(TypeView::identity::<T>());
        Self {
            inner,
            _type: PhantomData,
        }
    }

    fn owner<'a>(instance: &'a Instance, point: &str) -> Result<&'a T, DependencyError> {
        instance
            .downcast_ref::<T>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                name: point.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 添加 `Named` 标记并指定 bean 名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.inner.bean_name = Some(name.into());
        self.inner.markers.insert(Marker::NAMED);
        self
    }

    /// 添加标记（包括限定符和自定义 bean 标记）
    pub fn marker(mut self, marker: impl Into<Marker>) -> Self {
        self.inner.markers.insert(marker.into());
        self
    }

    /// 声明无参构造器
    pub fn constructor(
        mut self,
        constructor: impl Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.inner.constructor = Some(Arc::new(move || {
            constructor().map(|value| Arc::new(value) as Instance)
        }));
        self
    }

    /// 使用 `Default` 作为无参构造器
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|| Ok(T::default()))
    }

    /// 声明可赋值的类型，通常是 trait object：`.provides::<dyn Greeter>(|bean| bean)`
    pub fn provides<D>(mut self, project: impl Fn(Arc<T>) -> Arc<D> + Send + Sync + 'static) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.inner.views.push(TypeView::projected::<T, D>(project));
        self
    }

    fn field_point(
        mut self,
        field: &str,
        dependency: Dependency,
        apply: impl Fn(&T, Injected) -> DependencyResult<()> + Send + Sync + 'static,
    ) -> Self {
        let point = field.to_string();
        let apply: FieldApplyFn = Arc::new(move |instance: &Instance, injected: Injected| {
            let owner = Self::owner(instance, &point)?;
            apply(owner, injected)
        });
        self.inner.fields.push(FieldPoint {
            name: field.to_string(),
            dependency,
            apply,
        });
        self
    }

    fn single_field<D>(
        self,
        field: &str,
        dependency: Dependency,
        setter: impl Fn(&T, Arc<D>) + Send + Sync + 'static,
    ) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.field_point(field, dependency, move |owner, injected| {
            setter(owner, injected.into_single::<D>()?);
            Ok(())
        })
    }

    /// 按类型注入字段
    pub fn inject<D>(self, field: &str, setter: impl Fn(&T, Arc<D>) + Send + Sync + 'static) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.single_field(field, Dependency::by_type::<D>(), setter)
    }

    /// 按名称注入字段
    pub fn inject_named<D>(
        self,
        field: &str,
        name: impl Into<String>,
        setter: impl Fn(&T, Arc<D>) + Send + Sync + 'static,
    ) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.single_field(field, Dependency::by_name::<D>(name), setter)
    }

    /// 按限定符注入字段
    pub fn inject_qualified<D>(
        self,
        field: &str,
        qualifiers: impl IntoIterator<Item = Marker>,
        setter: impl Fn(&T, Arc<D>) + Send + Sync + 'static,
    ) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.single_field(field, Dependency::qualified::<D>(qualifiers), setter)
    }

    /// 注入全部可赋值的 bean
    pub fn inject_all<D>(
        self,
        field: &str,
        shape: CollectionShape,
        setter: impl Fn(&T, Vec<Arc<D>>) + Send + Sync + 'static,
    ) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.field_point(field, Dependency::all::<D>(shape), move |owner, injected| {
            setter(owner, injected.into_many::<D>()?);
            Ok(())
        })
    }

    /// 声明注入方法，全部参数解析成功后调用一次
    pub fn inject_method(
        mut self,
        method: &str,
        params: Vec<Dependency>,
        invoke: impl Fn(&T, &mut MethodArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let point = method.to_string();
        let invoke: InvokeFn = Arc::new(move |instance: &Instance, args: &mut MethodArgs| {
            let owner = Self::owner(instance, &point)?;
            invoke(owner, args)
        });
        self.inner.methods.push(MethodPoint::Inject(InjectionMethod {
            name: method.to_string(),
            params,
            invoke,
        }));
        self
    }

    fn setter(
        mut self,
        property: &str,
        shape: PropertyShape,
        apply: impl Fn(&T, PropertyValue) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let point = property.to_string();
        let apply: SetterFn = Arc::new(move |instance: &Instance, value: PropertyValue| {
            let owner = Self::owner(instance, &point)?;
            apply(owner, value)
        });
        self.inner.methods.push(MethodPoint::Setter(PropertySetter {
            property: property.to_string(),
            shape,
            apply,
        }));
        self
    }

    /// 布尔属性设置器
    pub fn property_bool(
        self,
        property: &str,
        setter: impl Fn(&T, bool) + Send + Sync + 'static,
    ) -> Self {
        self.setter(property, PropertyShape::Boolean, move |owner, value| {
            match value {
                PropertyValue::Boolean(flag) => setter(owner, flag),
                other => anyhow::bail!("期望布尔值, 实际为 {:?}", other),
            }
            Ok(())
        })
    }

    /// 集合属性设置器，属性值以逗号分隔
    pub fn property_collection(
        self,
        property: &str,
        setter: impl Fn(&T, Vec<ResolvedValue>) + Send + Sync + 'static,
    ) -> Self {
        self.setter(property, PropertyShape::Collection, move |owner, value| {
            match value {
                PropertyValue::Collection(values) => setter(owner, values),
                other => anyhow::bail!("期望集合值, 实际为 {:?}", other),
            }
            Ok(())
        })
    }

    /// 普通属性设置器，属性值经过引用解析
    pub fn property(
        self,
        property: &str,
        setter: impl Fn(&T, ResolvedValue) + Send + Sync + 'static,
    ) -> Self {
        self.setter(property, PropertyShape::Reference, move |owner, value| {
            match value {
                PropertyValue::Reference(resolved) => setter(owner, resolved),
                other => anyhow::bail!("期望单个值, 实际为 {:?}", other),
            }
            Ok(())
        })
    }

    /// 无参初始化钩子
    pub fn post_construct(
        mut self,
        name: &str,
        hook: impl Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let point = name.to_string();
        let invoke: HookFn = Arc::new(move |instance: &Instance, _args: &[Instance]| {
            let owner = Self::owner(instance, &point)?;
            hook(owner)
        });
        self.inner.post_construct = Some(PostConstructHook {
            name: name.to_string(),
            parameters: Vec::new(),
            invoke,
        });
        self
    }

    /// 声明了一个参数的初始化钩子；容器不会为钩子提供参数，调用时按签名不兼容处理
    pub fn post_construct_with<A: Send + Sync + 'static>(
        mut self,
        name: &str,
        hook: impl Fn(&T, Arc<A>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let point = name.to_string();
        let invoke: HookFn = Arc::new(move |instance: &Instance, args: &[Instance]| {
            let owner = Self::owner(instance, &point)?;
            let argument = args
                .first()
                .and_then(|arg| arg.clone().downcast::<A>().ok())
                .ok_or_else(|| anyhow::anyhow!("钩子参数类型不匹配: {}", point))?;
            hook(owner, argument)
        });
        self.inner.post_construct = Some(PostConstructHook {
            name: name.to_string(),
            parameters: vec![TypeInfo::of::<A>()],
            invoke,
        });
        self
    }

    /// 声明实例的字符串形式
    pub fn display_with(mut self, display: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.inner.display = Some(Arc::new(move |instance: &Instance| {
            instance.downcast_ref::<T>().map(&display)
        }));
        self
    }

    /// 完成声明
    pub fn build(self) -> CandidateDescriptor {
        CandidateDescriptor {
            inner: Arc::new(self.inner),
        }
    }
}

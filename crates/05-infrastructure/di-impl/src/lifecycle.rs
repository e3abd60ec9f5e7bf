//! 生命周期调度
//!
//! 先按拓扑排序调用初始化钩子，再按注册顺序调用未能排序的 bean 的钩子。
//! 每个钩子只调用一次，失败只记录日志。

use crate::registry::{BeanEntry, Registry};
use crate::tracker::TopologicalOrder;
use di_abstractions::CandidateDescriptor;
use infrastructure_common::{Instance, LifecycleResult};
use serde::Serialize;
use tracing::{debug, error, warn};

/// 生命周期调度结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleReport {
    /// 已调用钩子的 bean，按调用顺序
    pub invoked: Vec<String>,
    /// 钩子失败的 bean
    pub failed: Vec<String>,
    /// 未能排序、在最后调用的 bean
    pub unordered: Vec<String>,
}

/// 生命周期调度器
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleDispatcher;

impl LifecycleDispatcher {
    /// 调用单个 bean 的初始化钩子，返回是否声明了钩子
    pub fn run_hook(
        name: &str,
        instance: &Instance,
        descriptor: &CandidateDescriptor,
    ) -> LifecycleResult<bool> {
        let Some(hook) = descriptor.post_construct() else {
            return Ok(false);
        };
        debug!("调用初始化钩子: {}.{}", name, hook.name);
        // 容器不为钩子提供参数
        hook.invoke(instance, &[])?;
        Ok(true)
    }

    /// 按排序结果调度全部 bean 的初始化钩子
    pub fn dispatch(registry: &Registry, order: &TopologicalOrder) -> LifecycleReport {
        let mut report = LifecycleReport::default();

        for name in &order.ordered {
            if let Some(entry) = registry.entry(name) {
                Self::dispatch_one(entry, &mut report);
            }
        }

        for name in &order.pending {
            let Some(entry) = registry.entry(name) else {
                continue;
            };
            warn!("bean 未能按依赖排序 (循环或依赖缺失), 仍调用其初始化钩子: {}", name);
            report.unordered.push(name.clone());
            Self::dispatch_one(entry, &mut report);
        }

        report
    }

    fn dispatch_one(entry: &BeanEntry, report: &mut LifecycleReport) {
        match Self::run_hook(&entry.name, &entry.instance, &entry.descriptor) {
            Ok(true) => report.invoked.push(entry.name.clone()),
            Ok(false) => {}
            Err(e) => {
                error!("初始化钩子失败: {}, 原因: {}", entry.name, e);
                report.invoked.push(entry.name.clone());
                report.failed.push(entry.name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::Slot;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct First;
    #[derive(Default)]
    struct Second;
    #[derive(Default)]
    struct Stuck {
        touched: Slot<bool>,
    }

    #[test]
    fn hooks_run_in_order_then_pending() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (stuck_calls, second_calls, first_calls) = (calls.clone(), calls.clone(), calls.clone());
        let mut registry = Registry::new();
        registry.register(
            "stuck",
            Arc::new(Stuck::default()),
            CandidateDescriptor::builder::<Stuck>()
                .post_construct("init", move |bean| {
                    bean.touched.set(true);
                    stuck_calls.lock().unwrap().push("stuck");
                    Ok(())
                })
                .build(),
        );
        registry.register(
            "second",
            Arc::new(Second),
            CandidateDescriptor::builder::<Second>()
                .post_construct("init", move |_| {
                    second_calls.lock().unwrap().push("second");
                    anyhow::bail!("初始化失败")
                })
                .build(),
        );
        registry.register(
            "first",
            Arc::new(First),
            CandidateDescriptor::builder::<First>()
                .post_construct_with::<String>("init", move |_, _| {
                    first_calls.lock().unwrap().push("first");
                    Ok(())
                })
                .build(),
        );
        registry.register("plain", Arc::new(First), CandidateDescriptor::of::<First>());

        let order = TopologicalOrder {
            ordered: vec!["first".into(), "plain".into(), "second".into()],
            pending: vec!["stuck".into()],
        };
        let report = LifecycleDispatcher::dispatch(&registry, &order);

        assert_eq!(*calls.lock().unwrap(), vec!["second", "stuck"]);
        assert_eq!(report.invoked, vec!["first", "second", "stuck"]);
        assert_eq!(report.failed, vec!["first", "second"]);
        assert_eq!(report.unordered, vec!["stuck"]);
        let stuck = registry.entry("stuck").unwrap();
        assert_eq!(
            stuck
                .descriptor
                .cast::<Stuck>(&stuck.instance)
                .unwrap()
                .touched
                .get(),
            Some(true)
        );
    }
}

//! 依赖跟踪与拓扑排序

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// 依赖边的目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeTarget {
    /// 单个 bean
    Bean(String),
    /// bean 集合，全部元素都已排序时才满足
    Collection(Vec<String>),
}

impl EdgeTarget {
    /// 涉及的 bean 名称
    pub fn bean_names(&self) -> &[String] {
        match self {
            Self::Bean(name) => std::slice::from_ref(name),
            Self::Collection(names) => names,
        }
    }
}

/// bean 的排序状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    /// 等待依赖就绪
    Pending,
    /// 已排序
    Ordered,
}

/// 拓扑排序结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// 依赖就绪的顺序
    pub ordered: Vec<String>,
    /// 始终无法排序的 bean（循环依赖或依赖缺失），按注册顺序
    pub pending: Vec<String>,
}

impl TopologicalOrder {
    /// 在排序中的位置
    pub fn position(&self, name: &str) -> Option<usize> {
        self.ordered.iter().position(|ordered| ordered == name)
    }

    /// 是否全部排序完成
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

/// 依赖跟踪器
///
/// 记录每个 bean 实际注入的 bean，用于计算构造完成顺序。
#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    edges: IndexMap<String, Vec<EdgeTarget>>,
}

impl DependencyTracker {
    /// 创建空的跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条依赖边
    pub fn record(&mut self, owner: &str, target: EdgeTarget) {
        debug!("记录依赖: {} -> {:?}", owner, target);
        self.edges.entry(owner.to_string()).or_default().push(target);
    }

    /// 记录多条依赖边
    pub fn record_all(&mut self, owner: &str, targets: impl IntoIterator<Item = EdgeTarget>) {
        for target in targets {
            self.record(owner, target);
        }
    }

    /// bean 的依赖边
    pub fn dependencies_of(&self, owner: &str) -> &[EdgeTarget] {
        self.edges.get(owner).map(Vec::as_slice).unwrap_or_default()
    }

    /// 全部依赖边
    pub fn edges(&self) -> impl Iterator<Item = (&String, &Vec<EdgeTarget>)> {
        self.edges.iter()
    }

    /// 对给定的 bean（注册顺序）排序
    ///
    /// 反复扫描仍在等待的 bean；一个 bean 的全部依赖都已排序时它就被排序，
    /// 没有依赖的 bean 在第一轮即被排序。某一轮没有任何进展时结束。
    /// 依赖了未知名称或自身的 bean 保持等待。
    pub fn sort(&self, names: &[String]) -> TopologicalOrder {
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        // None 表示依赖了不在排序范围内的名称，永远无法满足
        let requirements: Vec<Option<Vec<usize>>> = names
            .iter()
            .map(|name| {
                self.dependencies_of(name)
                    .iter()
                    .flat_map(EdgeTarget::bean_names)
                    .map(|dependency| index.get(dependency.as_str()).copied())
                    .collect()
            })
            .collect();

        let mut states = vec![OrderState::Pending; names.len()];
        let mut ordered = Vec::with_capacity(names.len());
        let mut pass = 0;

        loop {
            pass += 1;
            let mut progressed = false;
            for i in 0..names.len() {
                if states[i] == OrderState::Ordered {
                    continue;
                }
                let ready = requirements[i].as_ref().is_some_and(|deps| {
                    deps.iter().all(|&dep| states[dep] == OrderState::Ordered)
                });
                if ready {
                    states[i] = OrderState::Ordered;
                    ordered.push(names[i].clone());
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        let pending: Vec<String> = names
            .iter()
            .zip(&states)
            .filter(|(_, state)| **state == OrderState::Pending)
            .map(|(name, _)| name.clone())
            .collect();
        debug!(
            "拓扑排序完成: {} 轮, 已排序 {} 个, 未排序 {} 个",
            pass,
            ordered.len(),
            pending.len()
        );

        TopologicalOrder { ordered, pending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dependencies_precede_dependents() {
        let mut tracker = DependencyTracker::new();
        tracker.record("service", EdgeTarget::Bean("repository".into()));
        tracker.record("repository", EdgeTarget::Bean("pool".into()));

        let order = tracker.sort(&names(&["service", "repository", "pool"]));

        assert!(order.is_complete());
        assert!(order.position("pool") < order.position("repository"));
        assert!(order.position("repository") < order.position("service"));
    }

    #[test]
    fn collections_wait_for_every_member() {
        let mut tracker = DependencyTracker::new();
        tracker.record("router", EdgeTarget::Collection(names(&["a", "b"])));
        tracker.record("b", EdgeTarget::Bean("c".into()));
        tracker.record("empty", EdgeTarget::Collection(Vec::new()));

        let order = tracker.sort(&names(&["router", "a", "b", "c", "empty"]));

        assert_eq!(order.ordered, names(&["a", "c", "empty", "b", "router"]));
    }

    #[test]
    fn cycles_and_unknown_dependencies_stay_pending() {
        let mut tracker = DependencyTracker::new();
        tracker.record("x", EdgeTarget::Bean("y".into()));
        tracker.record("y", EdgeTarget::Bean("x".into()));
        tracker.record("self", EdgeTarget::Bean("self".into()));
        tracker.record("orphan", EdgeTarget::Bean("ghost".into()));

        let order = tracker.sort(&names(&["x", "free", "y", "self", "orphan"]));

        assert_eq!(order.ordered, names(&["free"]));
        assert_eq!(order.pending, names(&["x", "y", "self", "orphan"]));
    }
}

//! Rewriting pass that flattens redundant group nesting.
//!
//! Every rewrite preserves the set of matched points. Rendering never depends
//! on this pass having run.

use tracing::debug;

use crate::filter::condition::Condition;
use crate::filter::group::{GroupCondition, GroupKind};

/// Rewriting visitor over group conditions.
///
/// Rules, applied bottom-up:
/// - `must` inside `must`, `should` inside `should` and `should` inside
///   `must_not` are spliced into the parent;
/// - a `must` with a single logical group child is replaced by that child;
/// - a non-empty `min_should` with `min_count == 1` becomes `should`.
#[derive(Debug, Default)]
pub struct FilterOptimizer {
    rewrites: usize,
}

impl FilterOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rewrites applied so far.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    /// Optimizes a condition in place. Leaves are left untouched.
    pub fn visit(&mut self, condition: &mut dyn Condition) {
        if let Some(group) = condition.as_group_mut() {
            self.visit_group(group);
        }
    }

    /// Optimizes a group and its subtree in place.
    pub fn visit_group(&mut self, group: &mut GroupCondition) {
        for child in group.children_mut().iter_mut() {
            self.visit(child.as_mut());
        }

        if group.kind() == (GroupKind::MinShould { min_count: 1 }) && !group.is_empty() {
            group.set_kind(GroupKind::Should);
            self.rewrites += 1;
        }

        self.splice_children(group);
        self.collapse_single_child(group);
    }

    /// Merges top-level `must` groups into the first one, and likewise for
    /// `must_not`.
    pub fn merge_top_level(&mut self, conditions: &mut Vec<Box<dyn Condition>>) {
        let mut merged: Vec<Box<dyn Condition>> = Vec::with_capacity(conditions.len());
        let mut must_at: Option<usize> = None;
        let mut must_not_at: Option<usize> = None;

        for mut condition in conditions.drain(..) {
            let target = match condition.as_group().map(GroupCondition::kind) {
                Some(GroupKind::Must) => &mut must_at,
                Some(GroupKind::MustNot) => &mut must_not_at,
                _ => {
                    merged.push(condition);
                    continue;
                }
            };

            match *target {
                Some(index) => {
                    let children = condition
                        .as_group_mut()
                        .map(GroupCondition::take_children)
                        .unwrap_or_default();
                    if let Some(first) = merged[index].as_group_mut() {
                        first.children_mut().extend(children);
                    }
                    self.rewrites += 1;
                }
                None => {
                    *target = Some(merged.len());
                    merged.push(condition);
                }
            }
        }

        *conditions = merged;
    }

    fn splice_children(&mut self, group: &mut GroupCondition) {
        let kind = group.kind();
        let children = group.take_children();
        let mut spliced = Vec::with_capacity(children.len());

        for mut child in children {
            // Absorbed children are dropped once their own children move up.
            let absorb = child.as_group().map_or(false, |inner| absorbs(kind, inner));

            if !absorb {
                spliced.push(child);
                continue;
            }
            if let Some(inner) = child.as_group_mut() {
                spliced.extend(inner.take_children());
                self.rewrites += 1;
            }
        }

        *group.children_mut() = spliced;
    }

    fn collapse_single_child(&mut self, group: &mut GroupCondition) {
        if group.kind() != GroupKind::Must || group.len() != 1 {
            return;
        }
        let collapsible = group.children()[0]
            .as_group()
            .map_or(false, |inner| inner.kind() != GroupKind::Filter);
        if !collapsible {
            return;
        }

        let mut children = group.take_children();
        if let Some(inner) = children[0].as_group_mut() {
            *group = std::mem::take(inner);
            self.rewrites += 1;
        }
    }
}

/// Whether `child` can be spliced into a group of kind `parent`.
///
/// An empty `should` matches every point, so it is never spliced.
fn absorbs(parent: GroupKind, child: &GroupCondition) -> bool {
    match (parent, child.kind()) {
        (GroupKind::Must, GroupKind::Must) => true,
        (GroupKind::Should, GroupKind::Should) | (GroupKind::MustNot, GroupKind::Should) => {
            !child.is_empty()
        }
        _ => false,
    }
}

/// Optimizes a list of top-level groups, logging how much was rewritten.
pub(crate) fn optimize_conditions(conditions: &mut Vec<Box<dyn Condition>>) -> usize {
    let mut optimizer = FilterOptimizer::new();
    for condition in conditions.iter_mut() {
        optimizer.visit(condition.as_mut());
    }
    optimizer.merge_top_level(conditions);

    debug!(
        rewrites = optimizer.rewrites(),
        top_level = conditions.len(),
        "filter optimized"
    );
    optimizer.rewrites()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::leaf::field;
    use serde_json::json;

    fn leaf(name: &str) -> Box<dyn Condition> {
        Box::new(field(name).eq(1))
    }

    #[test]
    fn test_nested_must_is_spliced() {
        let mut group = GroupCondition::must(vec![
            leaf("a"),
            Box::new(GroupCondition::must(vec![leaf("b"), leaf("c")])),
        ]);

        let mut optimizer = FilterOptimizer::new();
        optimizer.visit_group(&mut group);

        assert_eq!(group.len(), 3);
        assert_eq!(optimizer.rewrites(), 1);
    }

    #[test]
    fn test_single_child_must_collapses() {
        // must[must[should[a, b]]] -> should[a, b]
        let mut group = GroupCondition::must(vec![Box::new(GroupCondition::must(vec![Box::new(
            GroupCondition::should(vec![leaf("a"), leaf("b")]),
        )]))]);

        FilterOptimizer::new().visit_group(&mut group);

        assert_eq!(group.kind(), GroupKind::Should);
        assert_eq!(
            group.to_json(),
            json!({
                "should": [
                    {"key": "a", "match": {"value": 1}},
                    {"key": "b", "match": {"value": 1}}
                ]
            })
        );
    }

    #[test]
    fn test_should_inside_must_not_is_spliced() {
        let mut group = GroupCondition::must_not(vec![Box::new(GroupCondition::should(vec![
            leaf("a"),
            leaf("b"),
        ]))]);

        FilterOptimizer::new().visit_group(&mut group);

        assert_eq!(group.kind(), GroupKind::MustNot);
        assert_eq!(group.len(), 2);
        assert!(group.children().iter().all(|c| c.as_group().is_none()));
    }

    #[test]
    fn test_should_inside_must_is_kept() {
        let mut group = GroupCondition::must(vec![
            leaf("a"),
            Box::new(GroupCondition::should(vec![leaf("b"), leaf("c")])),
        ]);

        let mut optimizer = FilterOptimizer::new();
        optimizer.visit_group(&mut group);

        assert_eq!(group.len(), 2);
        assert_eq!(optimizer.rewrites(), 0);
    }

    #[test]
    fn test_min_should_one_becomes_should() {
        let mut group = GroupCondition::min_should(1, vec![leaf("a"), leaf("b")]);
        FilterOptimizer::new().visit_group(&mut group);
        assert_eq!(group.kind(), GroupKind::Should);

        let mut group = GroupCondition::min_should(2, vec![leaf("a"), leaf("b")]);
        FilterOptimizer::new().visit_group(&mut group);
        assert_eq!(group.kind(), GroupKind::MinShould { min_count: 2 });

        // Matches nothing, unlike an empty `should`.
        let mut group = GroupCondition::min_should(1, Vec::new());
        FilterOptimizer::new().visit_group(&mut group);
        assert_eq!(group.kind(), GroupKind::MinShould { min_count: 1 });
    }

    #[test]
    fn test_empty_should_is_not_spliced() {
        let mut group = GroupCondition::should(vec![leaf("a"), Box::new(GroupCondition::should(Vec::new()))]);
        let mut optimizer = FilterOptimizer::new();
        optimizer.visit_group(&mut group);
        assert_eq!(group.len(), 2);
        assert_eq!(optimizer.rewrites(), 0);
    }

    #[test]
    fn test_filter_group_child_not_collapsed() {
        let mut group = GroupCondition::must(vec![Box::new(GroupCondition::filter(vec![leaf("a")]))]);
        FilterOptimizer::new().visit_group(&mut group);
        assert_eq!(group.kind(), GroupKind::Must);
    }

    #[test]
    fn test_empty_must_child_vanishes() {
        let mut group = GroupCondition::must(vec![leaf("a"), Box::new(GroupCondition::must(Vec::new()))]);
        FilterOptimizer::new().visit_group(&mut group);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_merge_top_level() {
        let mut conditions: Vec<Box<dyn Condition>> = vec![
            Box::new(GroupCondition::must(vec![leaf("a")])),
            Box::new(GroupCondition::should(vec![leaf("b")])),
            Box::new(GroupCondition::must(vec![leaf("c")])),
            Box::new(GroupCondition::must_not(vec![leaf("d")])),
            Box::new(GroupCondition::must_not(vec![leaf("e")])),
        ];

        let rewrites = optimize_conditions(&mut conditions);

        assert_eq!(rewrites, 2);
        assert_eq!(conditions.len(), 3);
        let kinds: Vec<_> = conditions
            .iter()
            .filter_map(|c| c.as_group().map(GroupCondition::kind))
            .collect();
        assert_eq!(kinds, vec![GroupKind::Must, GroupKind::Should, GroupKind::MustNot]);
        assert_eq!(conditions[0].as_group().unwrap().len(), 2);
    }
}

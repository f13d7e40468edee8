//! Read-only traversal of condition trees.

use std::collections::HashSet;

use crate::filter::condition::{Condition, PayloadField};
use crate::filter::group::GroupCondition;

/// Visitor over a condition tree.
///
/// [`walk`] dispatches every node to either [`visit_group`] or [`visit_leaf`];
/// the default `visit_group` descends into the children in order.
///
/// [`visit_group`]: ConditionVisitor::visit_group
/// [`visit_leaf`]: ConditionVisitor::visit_leaf
pub trait ConditionVisitor {
    fn visit_leaf(&mut self, leaf: &dyn Condition);

    fn visit_group(&mut self, group: &GroupCondition) {
        for child in group.children() {
            walk(self, child.as_ref());
        }
    }
}

/// Dispatches a condition to the visitor.
pub fn walk<V: ConditionVisitor + ?Sized>(visitor: &mut V, condition: &dyn Condition) {
    match condition.as_group() {
        Some(group) => visitor.visit_group(group),
        None => visitor.visit_leaf(condition),
    }
}

/// Collects the payload fields referenced by leaf conditions.
///
/// Every leaf naming a field is recorded with its inferred type, or with no
/// type for structural checks and named vectors. Leaves without a field name
/// (point ids) are skipped.
#[derive(Debug, Default)]
pub struct PayloadFieldCollector {
    fields: HashSet<PayloadField>,
}

impl PayloadFieldCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_fields(self) -> HashSet<PayloadField> {
        self.fields
    }
}

impl ConditionVisitor for PayloadFieldCollector {
    fn visit_leaf(&mut self, leaf: &dyn Condition) {
        if let Some(name) = leaf.payload_field_name() {
            self.fields
                .insert(PayloadField::new(name, leaf.payload_field_type()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::condition::PayloadFieldType;
    use crate::filter::leaf::{field, HasIdCondition, HasVectorCondition};

    #[derive(Default)]
    struct LeafCounter {
        leaves: usize,
        groups: usize,
    }

    impl ConditionVisitor for LeafCounter {
        fn visit_leaf(&mut self, _leaf: &dyn Condition) {
            self.leaves += 1;
        }

        fn visit_group(&mut self, group: &GroupCondition) {
            self.groups += 1;
            for child in group.children() {
                walk(self, child.as_ref());
            }
        }
    }

    #[test]
    fn test_walk_counts_nodes() {
        let tree = GroupCondition::must(vec![
            Box::new(field("a").eq(1)),
            Box::new(GroupCondition::should(vec![
                Box::new(field("b").eq(2)),
                Box::new(field("c").eq(3)),
            ])),
        ]);

        let mut counter = LeafCounter::default();
        walk(&mut counter, &tree);
        assert_eq!(counter.groups, 2);
        assert_eq!(counter.leaves, 3);
    }

    #[test]
    fn test_collector_keeps_untyped_leaves() {
        let tree = GroupCondition::must(vec![
            Box::new(field("age").gte(18)),
            Box::new(HasVectorCondition::new("image")),
            Box::new(field("tags").empty()),
            Box::new(HasIdCondition::new([1u64, 2])),
        ]);

        let mut collector = PayloadFieldCollector::new();
        walk(&mut collector, &tree);
        let fields = collector.into_fields();

        // Point ids name no payload field.
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&PayloadField::new("age", PayloadFieldType::Integer)));
        assert!(fields.contains(&PayloadField::untyped("image")));
        assert!(fields.contains(&PayloadField::untyped("tags")));
    }
}

//! Group conditions: structural nodes combining child conditions.

use serde_json::{Map, Value};

use crate::filter::condition::{normalize, Condition};

pub(crate) const MUST: &str = "must";
pub(crate) const MUST_NOT: &str = "must_not";
pub(crate) const SHOULD: &str = "should";
pub(crate) const MIN_SHOULD: &str = "min_should";
pub(crate) const FILTER: &str = "filter";

/// The logical kind of a group, which decides its JSON clause key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Every child must match.
    Must,
    /// No child may match.
    MustNot,
    /// At least one child must match.
    Should,
    /// At least `min_count` children must match.
    MinShould { min_count: usize },
    /// A nested filter object, used where the grammar expects a whole filter.
    Filter,
}

impl GroupKind {
    /// JSON clause key emitted for this kind.
    pub fn clause_key(&self) -> &'static str {
        match self {
            GroupKind::Must => MUST,
            GroupKind::MustNot => MUST_NOT,
            GroupKind::Should => SHOULD,
            GroupKind::MinShould { .. } => MIN_SHOULD,
            GroupKind::Filter => FILTER,
        }
    }
}

/// A condition owning an ordered list of child conditions.
///
/// Child order is preserved verbatim in the emitted JSON.
///
/// # Example
///
/// ```
/// use qfilter_core::filter::{field, Condition, GroupCondition};
///
/// let group = GroupCondition::should(vec![
///     Box::new(field("city").eq("Paris")),
///     Box::new(field("city").eq("Berlin")),
/// ]);
///
/// let json = group.to_json();
/// assert_eq!(json["should"].as_array().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct GroupCondition {
    kind: GroupKind,
    children: Vec<Box<dyn Condition>>,
}

impl Default for GroupCondition {
    fn default() -> Self {
        Self::must(Vec::new())
    }
}

impl GroupCondition {
    /// Creates a group of the given kind. Children of a [`GroupKind::Filter`]
    /// group are normalized the same way top-level filter entries are.
    pub fn new(kind: GroupKind, children: Vec<Box<dyn Condition>>) -> Self {
        let children = if kind == GroupKind::Filter {
            children.into_iter().map(normalize).collect()
        } else {
            children
        };
        Self { kind, children }
    }

    /// AND group (`must`).
    pub fn must(children: Vec<Box<dyn Condition>>) -> Self {
        Self::new(GroupKind::Must, children)
    }

    /// NOT group (`must_not`).
    pub fn must_not(children: Vec<Box<dyn Condition>>) -> Self {
        Self::new(GroupKind::MustNot, children)
    }

    /// OR group (`should`).
    pub fn should(children: Vec<Box<dyn Condition>>) -> Self {
        Self::new(GroupKind::Should, children)
    }

    /// Threshold-OR group (`min_should`).
    pub fn min_should(min_count: usize, children: Vec<Box<dyn Condition>>) -> Self {
        Self::new(GroupKind::MinShould { min_count }, children)
    }

    /// Nested filter group (`filter`).
    pub fn filter(children: Vec<Box<dyn Condition>>) -> Self {
        Self::new(GroupKind::Filter, children)
    }

    /// Appends a child. Chainable.
    pub fn with<C: Condition + 'static>(mut self, child: C) -> Self {
        self.push(Box::new(child));
        self
    }

    /// Appends a child, normalizing it for filter groups.
    pub fn push(&mut self, child: Box<dyn Condition>) {
        let child = if self.kind == GroupKind::Filter {
            normalize(child)
        } else {
            child
        };
        self.children.push(child);
    }

    #[inline]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    #[inline]
    pub fn children(&self) -> &[Box<dyn Condition>] {
        &self.children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Box<dyn Condition>> {
        &mut self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<Box<dyn Condition>> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn set_kind(&mut self, kind: GroupKind) {
        self.kind = kind;
    }

    fn children_json(&self) -> Value {
        Value::Array(self.children.iter().map(|c| c.to_json()).collect())
    }
}

impl Condition for GroupCondition {
    fn write_json(&self, out: &mut Map<String, Value>) {
        match self.kind {
            GroupKind::Must | GroupKind::MustNot | GroupKind::Should => {
                out.insert(self.kind.clause_key().to_string(), self.children_json());
            }
            GroupKind::MinShould { min_count } => {
                let mut body = Map::new();
                body.insert("conditions".to_string(), self.children_json());
                body.insert("min_count".to_string(), Value::from(min_count));
                out.insert(MIN_SHOULD.to_string(), Value::Object(body));
            }
            GroupKind::Filter => {
                let mut body = Map::new();
                write_filter_members(&self.children, &mut body);
                out.insert(FILTER.to_string(), Value::Object(body));
            }
        }
    }

    fn as_group(&self) -> Option<&GroupCondition> {
        Some(self)
    }

    fn as_group_mut(&mut self) -> Option<&mut GroupCondition> {
        Some(self)
    }
}

/// Writes the members of a filter object built from top-level groups.
///
/// A clause key may appear only once in a JSON object. Repeated `must` and
/// `must_not` members are concatenated; any other repeated member is moved
/// into the `must` array as a nested filter object.
pub(crate) fn write_filter_members(conditions: &[Box<dyn Condition>], out: &mut Map<String, Value>) {
    let mut deferred = Vec::new();

    for condition in conditions {
        let mut members = Map::new();
        condition.write_json(&mut members);

        for (key, value) in members {
            match out.get_mut(&key) {
                None => {
                    out.insert(key, value);
                }
                Some(Value::Array(existing)) if key == MUST || key == MUST_NOT => match value {
                    Value::Array(items) => existing.extend(items),
                    other => existing.push(other),
                },
                Some(_) => {
                    let mut nested = Map::new();
                    nested.insert(key, value);
                    deferred.push(Value::Object(nested));
                }
            }
        }
    }

    if deferred.is_empty() {
        return;
    }
    if let Value::Array(items) = out
        .entry(MUST)
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        items.extend(deferred);
    }
}

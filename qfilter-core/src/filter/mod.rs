//! Filter expressions and their query-language JSON.
//!
//! A [`Filter`] is an ordered list of top-level group conditions, or a raw
//! pre-serialized filter string. Conditions are combined into filters, which
//! render into the JSON object the service accepts as a request `filter`.

pub mod condition;
pub mod group;
pub mod leaf;
pub mod optimize;
pub mod visit;

pub use condition::{normalize, Condition, PayloadField, PayloadFieldType};
pub use group::{GroupCondition, GroupKind};
pub use leaf::{
    field, DatetimeRangeCondition, FieldFilter, FieldMatchCondition, FieldRangeCondition,
    GeoBoundingBoxCondition, GeoPoint, GeoRadiusCondition, HasIdCondition, HasVectorCondition,
    IsEmptyCondition, IsNullCondition, Match, MatchValue, NestedCondition, PointId, RangeValue,
    ValuesCountCondition,
};
pub use optimize::FilterOptimizer;
pub use visit::{walk, ConditionVisitor, PayloadFieldCollector};

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug)]
enum FilterRepr {
    Conditions(Vec<Box<dyn Condition>>),
    Raw(String),
}

/// A filter attached to search, scroll, count or delete requests.
///
/// Every top-level entry is a group; bare leaves are wrapped in an implicit
/// `must` group on the way in. Raw filters are opaque and can't be combined.
///
/// # Example
///
/// ```
/// use qfilter_core::filter::{field, Filter, GroupCondition};
///
/// let filter = Filter::from_condition(field("category").eq("docs"))
///     .add_condition(GroupCondition::should(vec![
///         Box::new(field("year").gte(2024)),
///         Box::new(field("pinned").eq(true)),
///     ]))
///     .unwrap();
///
/// let json = filter.render(false);
/// assert!(json.starts_with(r#"{"must":[{"key":"category""#));
/// assert!(json.contains(r#""should":["#));
/// ```
#[derive(Debug)]
pub struct Filter {
    repr: FilterRepr,
}

impl Default for Filter {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Filter {
    /// The empty filter. Each use yields a fresh value, so it can't be mutated
    /// in place by a combination.
    pub const EMPTY: Filter = Filter {
        repr: FilterRepr::Conditions(Vec::new()),
    };

    /// Creates a filter with a single top-level entry.
    pub fn from_condition<C: Condition + 'static>(condition: C) -> Self {
        Self::from_boxed(Box::new(condition))
    }

    /// Creates a filter from an already boxed condition.
    pub fn from_boxed(condition: Box<dyn Condition>) -> Self {
        Self {
            repr: FilterRepr::Conditions(vec![normalize(condition)]),
        }
    }

    /// Creates a filter from a condition that may be absent.
    pub fn try_from_condition(condition: Option<Box<dyn Condition>>) -> Result<Self> {
        condition
            .map(Self::from_boxed)
            .ok_or_else(|| Error::InvalidArgument("condition must be provided".to_string()))
    }

    /// Creates a filter from any number of conditions. No conditions yield the
    /// empty filter.
    pub fn from_conditions<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Condition>>,
    {
        Self {
            repr: FilterRepr::Conditions(conditions.into_iter().map(normalize).collect()),
        }
    }

    /// Creates a filter from a non-empty list of conditions.
    pub fn from_condition_list(conditions: Vec<Box<dyn Condition>>) -> Result<Self> {
        let mut conditions = conditions.into_iter();
        let first = conditions.next().ok_or_else(|| {
            Error::InvalidArgument("condition list must contain at least one condition".to_string())
        })?;

        conditions.try_fold(Self::from_boxed(first), |filter, condition| {
            filter.add_boxed(condition)
        })
    }

    /// Creates a raw filter from pre-serialized query JSON. The text is passed
    /// through verbatim and never validated.
    pub fn from_raw(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "raw filter string must not be blank".to_string(),
            ));
        }
        Ok(Self {
            repr: FilterRepr::Raw(raw),
        })
    }

    /// Appends a condition to `target`, or builds a new filter when there is
    /// no target.
    pub fn append(target: Option<Filter>, condition: Box<dyn Condition>) -> Result<Self> {
        match target {
            Some(filter) => filter.add_boxed(condition),
            None => Ok(Self::from_boxed(condition)),
        }
    }

    /// Appends a condition and returns the same filter. Chainable.
    pub fn add_condition<C: Condition + 'static>(self, condition: C) -> Result<Self> {
        self.add_boxed(Box::new(condition))
    }

    /// Appends a boxed condition and returns the same filter.
    pub fn add_boxed(mut self, condition: Box<dyn Condition>) -> Result<Self> {
        match &mut self.repr {
            FilterRepr::Raw(raw) => return Err(forbidden(raw)),
            FilterRepr::Conditions(conditions) => conditions.push(normalize(condition)),
        }
        Ok(self)
    }

    /// Appends the top-level entries of `other` to this filter and returns it.
    ///
    /// Fails if either side is a raw filter. An empty `other` is a no-op.
    pub fn combine(mut self, other: Filter) -> Result<Self> {
        if let FilterRepr::Raw(raw) = &self.repr {
            return Err(forbidden(raw));
        }
        let incoming = match other.repr {
            FilterRepr::Raw(raw) => return Err(forbidden(&raw)),
            FilterRepr::Conditions(incoming) => incoming,
        };
        if let FilterRepr::Conditions(conditions) = &mut self.repr {
            conditions.extend(incoming);
        }
        Ok(self)
    }

    /// Returns true if there are no conditions and no raw string.
    pub fn is_empty(&self) -> bool {
        match &self.repr {
            FilterRepr::Conditions(conditions) => conditions.is_empty(),
            FilterRepr::Raw(_) => false,
        }
    }

    /// Returns true for raw filters.
    pub fn is_raw(&self) -> bool {
        matches!(self.repr, FilterRepr::Raw(_))
    }

    /// The raw filter text, for raw filters.
    pub fn raw(&self) -> Option<&str> {
        match &self.repr {
            FilterRepr::Raw(raw) => Some(raw),
            FilterRepr::Conditions(_) => None,
        }
    }

    /// Top-level entries. Always groups; empty for raw filters.
    pub fn conditions(&self) -> &[Box<dyn Condition>] {
        match &self.repr {
            FilterRepr::Conditions(conditions) => conditions,
            FilterRepr::Raw(_) => &[],
        }
    }

    /// Rewrites the tree into an equivalent, flatter form. Returns the number
    /// of rewrites applied. Raw filters are left untouched.
    pub fn optimize(&mut self) -> usize {
        match &mut self.repr {
            FilterRepr::Conditions(conditions) => optimize::optimize_conditions(conditions),
            FilterRepr::Raw(_) => 0,
        }
    }

    /// Consuming form of [`optimize`](Filter::optimize). Chainable.
    pub fn optimized(mut self) -> Self {
        self.optimize();
        self
    }

    /// Collects the typed payload fields referenced anywhere in the filter.
    ///
    /// Raw filters are opaque and yield an empty set. The same field used with
    /// two different types shows up twice.
    pub fn collect_payload_fields(&self) -> HashSet<PayloadField> {
        let mut collector = PayloadFieldCollector::new();
        for condition in self.conditions() {
            walk(&mut collector, condition.as_ref());
        }
        collector.into_fields()
    }

    /// Renders the filter as query JSON.
    ///
    /// Raw filters are returned verbatim and an empty filter renders as an
    /// empty string.
    pub fn render(&self, indent: bool) -> String {
        match &self.repr {
            FilterRepr::Raw(raw) => raw.clone(),
            FilterRepr::Conditions(conditions) if conditions.is_empty() => String::new(),
            FilterRepr::Conditions(conditions) => {
                let value = Value::Object(render_object(conditions));
                if indent {
                    format!("{:#}", value)
                } else {
                    value.to_string()
                }
            }
        }
    }

    /// The filter as a JSON value: `null` when empty, the parsed text for raw
    /// filters.
    pub fn to_value(&self) -> Result<Value> {
        match &self.repr {
            FilterRepr::Raw(raw) => {
                serde_json::from_str(raw).map_err(|e| Error::InvalidFilter(e.to_string()))
            }
            FilterRepr::Conditions(conditions) if conditions.is_empty() => Ok(Value::Null),
            FilterRepr::Conditions(conditions) => Ok(Value::Object(render_object(conditions))),
        }
    }
}

fn render_object(conditions: &[Box<dyn Condition>]) -> Map<String, Value> {
    let mut out = Map::new();
    group::write_filter_members(conditions, &mut out);
    out
}

fn forbidden(raw: &str) -> Error {
    warn!(raw, "refusing to combine a raw filter");
    Error::FilterModificationForbidden {
        raw: raw.to_string(),
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value = self
            .to_value()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        value.serialize(serializer)
    }
}

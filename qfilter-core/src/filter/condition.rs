//! The condition contract shared by every node of a filter tree.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::group::GroupCondition;

/// Index type inferred for a payload field from the way a condition uses it.
///
/// Names match the payload index schemas accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFieldType {
    Keyword,
    Integer,
    Float,
    Bool,
    Geo,
    Text,
    Datetime,
    Uuid,
}

impl PayloadFieldType {
    /// Returns the schema name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFieldType::Keyword => "keyword",
            PayloadFieldType::Integer => "integer",
            PayloadFieldType::Float => "float",
            PayloadFieldType::Bool => "bool",
            PayloadFieldType::Geo => "geo",
            PayloadFieldType::Text => "text",
            PayloadFieldType::Datetime => "datetime",
            PayloadFieldType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for PayloadFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload field referenced by a filter, together with its inferred type.
///
/// `field_type` is `None` for references that carry no index type, such as
/// emptiness checks or named vectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub field_type: Option<PayloadFieldType>,
}

impl PayloadField {
    /// Creates a new payload field descriptor.
    pub fn new(name: impl Into<String>, field_type: impl Into<Option<PayloadFieldType>>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    /// Creates a descriptor for a reference without an index type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
        }
    }

    /// Whether this reference calls for a typed payload index.
    pub fn is_typed(&self) -> bool {
        self.field_type.is_some()
    }
}

/// A node in a filter expression tree.
///
/// Leaves constrain a single payload field (or a point property such as its id),
/// groups combine child conditions. Implementors only need [`write_json`]; the
/// remaining methods have defaults suitable for structural leaves.
///
/// [`write_json`]: Condition::write_json
pub trait Condition: fmt::Debug + Send + Sync {
    /// Payload field this condition constrains, if any.
    fn payload_field_name(&self) -> Option<&str> {
        None
    }

    /// Index type inferred for [`payload_field_name`](Condition::payload_field_name).
    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        None
    }

    /// Writes this condition's member(s) into the enclosing JSON object.
    fn write_json(&self, out: &mut Map<String, Value>);

    /// Returns the group view when this condition is a group.
    fn as_group(&self) -> Option<&GroupCondition> {
        None
    }

    /// Mutable group view, used by rewriting visitors.
    fn as_group_mut(&mut self) -> Option<&mut GroupCondition> {
        None
    }

    /// Emits this condition as a standalone JSON object.
    fn to_json(&self) -> Value {
        let mut out = Map::new();
        self.write_json(&mut out);
        Value::Object(out)
    }
}

/// Returns true when the condition is one of the group kinds.
#[inline]
pub fn is_group(condition: &dyn Condition) -> bool {
    condition.as_group().is_some()
}

/// Wraps bare leaves into an implicit `must` group. Groups pass through untouched.
pub fn normalize(condition: Box<dyn Condition>) -> Box<dyn Condition> {
    if is_group(condition.as_ref()) {
        condition
    } else {
        Box::new(GroupCondition::must(vec![condition]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::leaf::HasVectorCondition;

    #[test]
    fn test_field_type_names() {
        assert_eq!(PayloadFieldType::Keyword.to_string(), "keyword");
        assert_eq!(PayloadFieldType::Datetime.as_str(), "datetime");
        assert_eq!(
            serde_json::to_string(&PayloadFieldType::Geo).unwrap(),
            "\"geo\""
        );
    }

    #[test]
    fn test_payload_field_typing() {
        let typed = PayloadField::new("age", PayloadFieldType::Integer);
        assert!(typed.is_typed());
        assert_eq!(typed.field_type, Some(PayloadFieldType::Integer));

        let untyped = PayloadField::untyped("image");
        assert!(!untyped.is_typed());
        assert_eq!(untyped.field_type, None);
    }

    #[test]
    fn test_normalize_wraps_leaf() {
        let wrapped = normalize(Box::new(HasVectorCondition::new("image")));
        let group = wrapped.as_group().unwrap();
        assert_eq!(group.kind().clause_key(), "must");
        assert_eq!(group.children().len(), 1);
        assert!(wrapped.payload_field_name().is_none());
    }

    #[test]
    fn test_normalize_keeps_group() {
        let group = GroupCondition::should(vec![Box::new(HasVectorCondition::new("a"))]);
        let normalized = normalize(Box::new(group));
        assert_eq!(normalized.as_group().unwrap().kind().clause_key(), "should");
    }
}

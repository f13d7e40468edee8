//! Leaf conditions and the field-scoped builder that creates them.
//!
//! Each leaf emits the clause shape the service grammar defines for it and
//! reports the payload index type its usage implies.

use serde_json::{json, Map, Value};

use crate::filter::condition::{Condition, PayloadFieldType};
use crate::filter::group::GroupCondition;

/// Starts a condition on the given payload field.
///
/// # Example
///
/// ```
/// use qfilter_core::filter::{field, Condition, PayloadFieldType};
///
/// let adult = field("age").gte(18);
/// assert_eq!(adult.payload_field_name(), Some("age"));
/// assert_eq!(adult.payload_field_type(), Some(PayloadFieldType::Integer));
/// ```
pub fn field(name: &str) -> FieldFilter {
    FieldFilter {
        field_name: name.to_string(),
    }
}

/// Builder for field-specific conditions.
#[derive(Debug)]
pub struct FieldFilter {
    field_name: String,
}

impl FieldFilter {
    /// Field equals value.
    pub fn eq<V: Into<MatchValue>>(self, value: V) -> FieldMatchCondition {
        FieldMatchCondition::new(self.field_name, Match::Value(value.into()))
    }

    /// Field equals the given UUID.
    pub fn eq_uuid(self, uuid: impl Into<String>) -> FieldMatchCondition {
        FieldMatchCondition::new(self.field_name, Match::Value(MatchValue::Uuid(uuid.into())))
    }

    /// Field value is one of the given values.
    pub fn any_of<V: Into<MatchValue>>(self, values: Vec<V>) -> FieldMatchCondition {
        let values = values.into_iter().map(Into::into).collect();
        FieldMatchCondition::new(self.field_name, Match::Any(values))
    }

    /// Field value is none of the given values.
    pub fn none_of<V: Into<MatchValue>>(self, values: Vec<V>) -> FieldMatchCondition {
        let values = values.into_iter().map(Into::into).collect();
        FieldMatchCondition::new(self.field_name, Match::Except(values))
    }

    /// Full-text field contains the given text.
    pub fn text(self, text: impl Into<String>) -> FieldMatchCondition {
        FieldMatchCondition::new(self.field_name, Match::Text(text.into()))
    }

    /// Field greater than value.
    pub fn gt<V: Into<RangeValue>>(self, value: V) -> FieldRangeCondition {
        FieldRangeCondition::new(self.field_name).gt(value)
    }

    /// Field greater than or equal to value.
    pub fn gte<V: Into<RangeValue>>(self, value: V) -> FieldRangeCondition {
        FieldRangeCondition::new(self.field_name).gte(value)
    }

    /// Field less than value.
    pub fn lt<V: Into<RangeValue>>(self, value: V) -> FieldRangeCondition {
        FieldRangeCondition::new(self.field_name).lt(value)
    }

    /// Field less than or equal to value.
    pub fn lte<V: Into<RangeValue>>(self, value: V) -> FieldRangeCondition {
        FieldRangeCondition::new(self.field_name).lte(value)
    }

    /// Starts a datetime range on this field.
    pub fn datetime(self) -> DatetimeRangeCondition {
        DatetimeRangeCondition::new(self.field_name)
    }

    /// Starts a constraint on the number of values stored in this field.
    pub fn values_count(self) -> ValuesCountCondition {
        ValuesCountCondition::new(self.field_name)
    }

    /// Field is missing, null or an empty array.
    pub fn empty(self) -> IsEmptyCondition {
        IsEmptyCondition {
            key: self.field_name,
        }
    }

    /// Field is explicitly null.
    pub fn null(self) -> IsNullCondition {
        IsNullCondition {
            key: self.field_name,
        }
    }

    /// Geo point field lies within `radius` meters of `center`.
    pub fn within_radius(self, center: GeoPoint, radius: f64) -> GeoRadiusCondition {
        GeoRadiusCondition {
            key: self.field_name,
            center,
            radius,
        }
    }

    /// Geo point field lies within the bounding box.
    pub fn within_box(self, top_left: GeoPoint, bottom_right: GeoPoint) -> GeoBoundingBoxCondition {
        GeoBoundingBoxCondition {
            key: self.field_name,
            top_left,
            bottom_right,
        }
    }

    /// Array-of-objects field where at least one element matches `conditions`.
    pub fn nested(self, conditions: Vec<Box<dyn Condition>>) -> NestedCondition {
        NestedCondition {
            key: self.field_name,
            filter: GroupCondition::filter(conditions),
        }
    }
}

/// A single value used by match conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchValue {
    Keyword(String),
    Integer(i64),
    Bool(bool),
    Uuid(String),
}

impl MatchValue {
    fn field_type(&self) -> PayloadFieldType {
        match self {
            MatchValue::Keyword(_) => PayloadFieldType::Keyword,
            MatchValue::Integer(_) => PayloadFieldType::Integer,
            MatchValue::Bool(_) => PayloadFieldType::Bool,
            MatchValue::Uuid(_) => PayloadFieldType::Uuid,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            MatchValue::Keyword(s) | MatchValue::Uuid(s) => Value::from(s.as_str()),
            MatchValue::Integer(i) => Value::from(*i),
            MatchValue::Bool(b) => Value::from(*b),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::Keyword(value.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        MatchValue::Keyword(value)
    }
}

impl From<i64> for MatchValue {
    fn from(value: i64) -> Self {
        MatchValue::Integer(value)
    }
}

impl From<i32> for MatchValue {
    fn from(value: i32) -> Self {
        MatchValue::Integer(value.into())
    }
}

impl From<u32> for MatchValue {
    fn from(value: u32) -> Self {
        MatchValue::Integer(value.into())
    }
}

impl From<bool> for MatchValue {
    fn from(value: bool) -> Self {
        MatchValue::Bool(value)
    }
}

/// The body of a `match` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Value(MatchValue),
    Any(Vec<MatchValue>),
    Except(Vec<MatchValue>),
    Text(String),
}

/// `{"key": k, "match": {...}}`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatchCondition {
    key: String,
    matcher: Match,
}

impl FieldMatchCondition {
    pub fn new(key: impl Into<String>, matcher: Match) -> Self {
        Self {
            key: key.into(),
            matcher,
        }
    }
}

impl Condition for FieldMatchCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        match &self.matcher {
            Match::Value(v) => Some(v.field_type()),
            Match::Any(values) | Match::Except(values) => values.first().map(MatchValue::field_type),
            Match::Text(_) => Some(PayloadFieldType::Text),
        }
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        let body = match &self.matcher {
            Match::Value(v) => json!({ "value": v.to_json() }),
            Match::Any(values) => json!({ "any": values.iter().map(MatchValue::to_json).collect::<Vec<_>>() }),
            Match::Except(values) => {
                json!({ "except": values.iter().map(MatchValue::to_json).collect::<Vec<_>>() })
            }
            Match::Text(text) => json!({ "text": text }),
        };
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert("match".to_string(), body);
    }
}

/// A numeric range bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeValue {
    Integer(i64),
    Float(f64),
}

impl RangeValue {
    fn to_json(self) -> Value {
        match self {
            RangeValue::Integer(i) => Value::from(i),
            RangeValue::Float(f) => Value::from(f),
        }
    }
}

impl From<i64> for RangeValue {
    fn from(value: i64) -> Self {
        RangeValue::Integer(value)
    }
}

impl From<i32> for RangeValue {
    fn from(value: i32) -> Self {
        RangeValue::Integer(value.into())
    }
}

impl From<u32> for RangeValue {
    fn from(value: u32) -> Self {
        RangeValue::Integer(value.into())
    }
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Float(value)
    }
}

impl From<f32> for RangeValue {
    fn from(value: f32) -> Self {
        RangeValue::Float(value.into())
    }
}

/// Writes `{"gt": .., "gte": .., "lt": .., "lte": ..}`, skipping unset bounds.
fn bounds_json(bounds: [(&str, Option<Value>); 4]) -> Value {
    let mut body = Map::new();
    for (name, bound) in bounds {
        if let Some(bound) = bound {
            body.insert(name.to_string(), bound);
        }
    }
    Value::Object(body)
}

/// `{"key": k, "range": {...}}` over numbers.
///
/// The field is typed `integer` while every bound is an integer, `float` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRangeCondition {
    key: String,
    gt: Option<RangeValue>,
    gte: Option<RangeValue>,
    lt: Option<RangeValue>,
    lte: Option<RangeValue>,
}

impl FieldRangeCondition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn gt<V: Into<RangeValue>>(mut self, value: V) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn gte<V: Into<RangeValue>>(mut self, value: V) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lt<V: Into<RangeValue>>(mut self, value: V) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn lte<V: Into<RangeValue>>(mut self, value: V) -> Self {
        self.lte = Some(value.into());
        self
    }
}

impl Condition for FieldRangeCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        let has_float = [self.gt, self.gte, self.lt, self.lte]
            .iter()
            .any(|b| matches!(b, Some(RangeValue::Float(_))));
        if has_float {
            Some(PayloadFieldType::Float)
        } else {
            Some(PayloadFieldType::Integer)
        }
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert(
            "range".to_string(),
            bounds_json([
                ("gt", self.gt.map(RangeValue::to_json)),
                ("gte", self.gte.map(RangeValue::to_json)),
                ("lt", self.lt.map(RangeValue::to_json)),
                ("lte", self.lte.map(RangeValue::to_json)),
            ]),
        );
    }
}

/// `{"key": k, "range": {...}}` over RFC 3339 timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatetimeRangeCondition {
    key: String,
    gt: Option<String>,
    gte: Option<String>,
    lt: Option<String>,
    lte: Option<String>,
}

impl DatetimeRangeCondition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn gt(mut self, timestamp: impl Into<String>) -> Self {
        self.gt = Some(timestamp.into());
        self
    }

    pub fn gte(mut self, timestamp: impl Into<String>) -> Self {
        self.gte = Some(timestamp.into());
        self
    }

    pub fn lt(mut self, timestamp: impl Into<String>) -> Self {
        self.lt = Some(timestamp.into());
        self
    }

    pub fn lte(mut self, timestamp: impl Into<String>) -> Self {
        self.lte = Some(timestamp.into());
        self
    }
}

impl Condition for DatetimeRangeCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        Some(PayloadFieldType::Datetime)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        let bound = |b: &Option<String>| b.as_deref().map(Value::from);
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert(
            "range".to_string(),
            bounds_json([
                ("gt", bound(&self.gt)),
                ("gte", bound(&self.gte)),
                ("lt", bound(&self.lt)),
                ("lte", bound(&self.lte)),
            ]),
        );
    }
}

/// `{"key": k, "values_count": {...}}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuesCountCondition {
    key: String,
    gt: Option<u64>,
    gte: Option<u64>,
    lt: Option<u64>,
    lte: Option<u64>,
}

impl ValuesCountCondition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn gt(mut self, count: u64) -> Self {
        self.gt = Some(count);
        self
    }

    pub fn gte(mut self, count: u64) -> Self {
        self.gte = Some(count);
        self
    }

    pub fn lt(mut self, count: u64) -> Self {
        self.lt = Some(count);
        self
    }

    pub fn lte(mut self, count: u64) -> Self {
        self.lte = Some(count);
        self
    }
}

impl Condition for ValuesCountCondition {
    // Counting values does not need a typed payload index.
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert(
            "values_count".to_string(),
            bounds_json([
                ("gt", self.gt.map(Value::from)),
                ("gte", self.gte.map(Value::from)),
                ("lt", self.lt.map(Value::from)),
                ("lte", self.lte.map(Value::from)),
            ]),
        );
    }
}

/// `{"is_empty": {"key": k}}`
#[derive(Debug, Clone, PartialEq)]
pub struct IsEmptyCondition {
    key: String,
}

impl Condition for IsEmptyCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("is_empty".to_string(), json!({ "key": self.key }));
    }
}

/// `{"is_null": {"key": k}}`
#[derive(Debug, Clone, PartialEq)]
pub struct IsNullCondition {
    key: String,
}

impl Condition for IsNullCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("is_null".to_string(), json!({ "key": self.key }));
    }
}

/// Point identifier: unsigned integer or UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl From<u64> for PointId {
    fn from(value: u64) -> Self {
        PointId::Num(value)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        PointId::Uuid(value.to_string())
    }
}

impl From<String> for PointId {
    fn from(value: String) -> Self {
        PointId::Uuid(value)
    }
}

/// `{"has_id": [ids]}`
#[derive(Debug, Clone, PartialEq)]
pub struct HasIdCondition {
    ids: Vec<PointId>,
}

impl HasIdCondition {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PointId>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Condition for HasIdCondition {
    fn write_json(&self, out: &mut Map<String, Value>) {
        let ids = self
            .ids
            .iter()
            .map(|id| match id {
                PointId::Num(n) => Value::from(*n),
                PointId::Uuid(u) => Value::from(u.as_str()),
            })
            .collect();
        out.insert("has_id".to_string(), Value::Array(ids));
    }
}

/// `{"has_vector": name}`
///
/// The name identifies a named vector, not a payload key, so no field type is
/// ever reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct HasVectorCondition {
    vector_name: String,
}

impl HasVectorCondition {
    pub fn new(vector_name: impl Into<String>) -> Self {
        Self {
            vector_name: vector_name.into(),
        }
    }
}

impl Condition for HasVectorCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.vector_name)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("has_vector".to_string(), Value::from(self.vector_name.as_str()));
    }
}

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn to_json(self) -> Value {
        json!({ "lon": self.lon, "lat": self.lat })
    }
}

/// `{"key": k, "geo_radius": {"center": .., "radius": r}}`
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRadiusCondition {
    key: String,
    center: GeoPoint,
    radius: f64,
}

impl Condition for GeoRadiusCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        Some(PayloadFieldType::Geo)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert(
            "geo_radius".to_string(),
            json!({ "center": self.center.to_json(), "radius": self.radius }),
        );
    }
}

/// `{"key": k, "geo_bounding_box": {"top_left": .., "bottom_right": ..}}`
#[derive(Debug, Clone, PartialEq)]
pub struct GeoBoundingBoxCondition {
    key: String,
    top_left: GeoPoint,
    bottom_right: GeoPoint,
}

impl Condition for GeoBoundingBoxCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn payload_field_type(&self) -> Option<PayloadFieldType> {
        Some(PayloadFieldType::Geo)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        out.insert("key".to_string(), Value::from(self.key.as_str()));
        out.insert(
            "geo_bounding_box".to_string(),
            json!({
                "top_left": self.top_left.to_json(),
                "bottom_right": self.bottom_right.to_json(),
            }),
        );
    }
}

/// `{"nested": {"key": k, "filter": {...}}}`
///
/// Keys inside the nested filter are relative to the array elements of `key`,
/// so the inner conditions are not reported as top-level payload fields.
#[derive(Debug)]
pub struct NestedCondition {
    key: String,
    filter: GroupCondition,
}

impl NestedCondition {
    /// The nested filter applied to each array element.
    pub fn filter(&self) -> &GroupCondition {
        &self.filter
    }
}

impl Condition for NestedCondition {
    fn payload_field_name(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn write_json(&self, out: &mut Map<String, Value>) {
        let mut body = Map::new();
        body.insert("key".to_string(), Value::from(self.key.as_str()));
        self.filter.write_json(&mut body);
        out.insert("nested".to_string(), Value::Object(body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_value_types() {
        assert_eq!(
            field("city").eq("Paris").payload_field_type(),
            Some(PayloadFieldType::Keyword)
        );
        assert_eq!(
            field("year").eq(2024).payload_field_type(),
            Some(PayloadFieldType::Integer)
        );
        assert_eq!(
            field("active").eq(true).payload_field_type(),
            Some(PayloadFieldType::Bool)
        );
        assert_eq!(
            field("owner").eq_uuid("5c56c793-69f3-4fbf-87e6-c4bf54c28c26").payload_field_type(),
            Some(PayloadFieldType::Uuid)
        );
    }

    #[test]
    fn test_match_emission() {
        assert_eq!(
            field("city").eq("Paris").to_json(),
            json!({"key": "city", "match": {"value": "Paris"}})
        );
        assert_eq!(
            field("color").any_of(vec!["red", "green"]).to_json(),
            json!({"key": "color", "match": {"any": ["red", "green"]}})
        );
        assert_eq!(
            field("color").none_of(vec![1, 2]).to_json(),
            json!({"key": "color", "match": {"except": [1, 2]}})
        );
        assert_eq!(
            field("body").text("vector search").to_json(),
            json!({"key": "body", "match": {"text": "vector search"}})
        );
        assert_eq!(
            field("body").text("x").payload_field_type(),
            Some(PayloadFieldType::Text)
        );
    }

    #[test]
    fn test_range_emission_skips_unset_bounds() {
        let range = field("age").gte(18).lt(65);
        assert_eq!(
            range.to_json(),
            json!({"key": "age", "range": {"gte": 18, "lt": 65}})
        );
        assert_eq!(range.payload_field_type(), Some(PayloadFieldType::Integer));
    }

    #[test]
    fn test_range_with_float_bound_is_float() {
        let range = field("price").gt(0).lte(9.99);
        assert_eq!(range.payload_field_type(), Some(PayloadFieldType::Float));
    }

    #[test]
    fn test_datetime_range() {
        let range = field("created_at")
            .datetime()
            .gte("2024-01-01T00:00:00Z")
            .lt("2025-01-01T00:00:00Z");
        assert_eq!(
            range.to_json(),
            json!({
                "key": "created_at",
                "range": {"gte": "2024-01-01T00:00:00Z", "lt": "2025-01-01T00:00:00Z"}
            })
        );
        assert_eq!(range.payload_field_type(), Some(PayloadFieldType::Datetime));
    }

    #[test]
    fn test_structural_leaves() {
        assert_eq!(
            field("tags").values_count().gt(2).to_json(),
            json!({"key": "tags", "values_count": {"gt": 2}})
        );
        assert_eq!(
            field("tags").empty().to_json(),
            json!({"is_empty": {"key": "tags"}})
        );
        assert_eq!(
            field("tags").null().to_json(),
            json!({"is_null": {"key": "tags"}})
        );
        assert!(field("tags").empty().payload_field_type().is_none());

        let has_id = HasIdCondition::new(vec![PointId::from(1), PointId::from("a-uuid")]);
        assert_eq!(has_id.to_json(), json!({"has_id": [1, "a-uuid"]}));
        assert!(has_id.payload_field_name().is_none());
    }

    #[test]
    fn test_has_vector_reports_name_without_type() {
        let cond = HasVectorCondition::new("image");
        assert_eq!(cond.to_json(), json!({"has_vector": "image"}));
        assert_eq!(cond.payload_field_name(), Some("image"));
        assert!(cond.payload_field_type().is_none());
    }

    #[test]
    fn test_geo_conditions() {
        let radius = field("location").within_radius(GeoPoint::new(13.4, 52.5), 1000.0);
        assert_eq!(
            radius.to_json(),
            json!({
                "key": "location",
                "geo_radius": {"center": {"lon": 13.4, "lat": 52.5}, "radius": 1000.0}
            })
        );
        assert_eq!(radius.payload_field_type(), Some(PayloadFieldType::Geo));

        let bbox = field("location").within_box(GeoPoint::new(13.0, 53.0), GeoPoint::new(14.0, 52.0));
        assert_eq!(
            bbox.to_json()["geo_bounding_box"]["bottom_right"],
            json!({"lon": 14.0, "lat": 52.0})
        );
    }

    #[test]
    fn test_nested_condition() {
        let nested = field("diet").nested(vec![
            Box::new(field("food").eq("meat")),
            Box::new(field("likes").eq(true)),
        ]);

        assert_eq!(
            nested.to_json(),
            json!({
                "nested": {
                    "key": "diet",
                    "filter": {
                        "must": [
                            {"key": "food", "match": {"value": "meat"}},
                            {"key": "likes", "match": {"value": true}}
                        ]
                    }
                }
            })
        );
        assert!(nested.payload_field_type().is_none());
        assert_eq!(nested.filter().len(), 2);
    }
}

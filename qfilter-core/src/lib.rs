//! # qfilter Core
//!
//! Core library for qfilter — filter trees for vector-database clients.
//!
//! This crate builds the `filter` part of search, scroll, count and delete
//! requests and renders it into the service's query-language JSON. It has no
//! transport or async runtime dependency.
//!
//! ## Core Types
//!
//! ### Filters
//!
//! - [`Filter`] - Ordered top-level groups, or an opaque raw filter string
//! - [`Condition`] - The contract every filter node implements
//! - [`GroupCondition`] - `must`, `must_not`, `should`, `min_should` and nested `filter` groups
//! - [`field`] - Builder for leaf conditions on a payload field
//!
//! ### Visitors
//!
//! - [`FilterOptimizer`] - Flattens redundant nesting, on request only
//! - [`PayloadFieldCollector`] - Collects typed payload fields for index planning
//!
//! ### Rotation
//!
//! - [`CircularSequence`] - Round-robin cursor with full-cycle detection
//!
//! ### Glue
//!
//! - [`ClientSettings`] - Endpoints, API key and timeout
//! - [`OperationStatus`] - Outcome of a remote call

pub mod circular;
pub mod config;
pub mod error;
pub mod filter;
pub mod status;

// Re-exports for convenient access
pub use circular::{CircularSequence, CycleDetectionGuard};
pub use config::ClientSettings;
pub use error::{Error, Result};
pub use filter::{
    field, Condition, ConditionVisitor, Filter, FilterOptimizer, GroupCondition, GroupKind,
    PayloadField, PayloadFieldCollector, PayloadFieldType,
};
pub use status::OperationStatus;

/// Re-export commonly used types for convenience.
///
/// # Example
///
/// ```rust
/// use qfilter_core::prelude::*;
///
/// let filter = Filter::from_condition(field("city").eq("Paris"));
/// let fields = filter.collect_payload_fields();
/// assert!(fields.contains(&PayloadField::new("city", PayloadFieldType::Keyword)));
/// ```
pub mod prelude {
    pub use crate::filter::{
        field, Condition, Filter, GeoPoint, GroupCondition, GroupKind, HasIdCondition,
        HasVectorCondition, PayloadField, PayloadFieldType,
    };
    pub use crate::{CircularSequence, ClientSettings, Error, OperationStatus, Result};
}

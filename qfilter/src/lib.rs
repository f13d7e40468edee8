//! # qfilter
//!
//! **Build, combine, optimize and render query filters for vector-database clients.**
//!
//! qfilter turns a tree of conditions into the `filter` JSON object a Qdrant-style
//! service expects, and can tell you which payload fields a filter touches so
//! you know which payload indexes to create.
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **Condition tree** | `must`, `must_not`, `should`, `min_should` and nested filter groups |
//! | **Leaf catalogue** | Match, range, datetime, geo, values count, emptiness, ids, named vectors, nested |
//! | **Raw filters** | Pass pre-serialized filter JSON through untouched |
//! | **Introspection** | Collect `(field, index type)` pairs for index planning |
//! | **Optimization** | Opt-in flattening of redundant nesting |
//! | **Failover rotation** | Cycle-detecting round-robin over endpoints |
//!
//! ## Quick Start
//!
//! ```rust
//! use qfilter::prelude::*;
//!
//! let filter = Filter::from_condition(field("category").eq("docs"))
//!     .add_condition(GroupCondition::should(vec![
//!         Box::new(field("year").gte(2024)),
//!         Box::new(field("pinned").eq(true)),
//!     ]))
//!     .unwrap();
//!
//! assert_eq!(
//!     filter.render(false),
//!     r#"{"must":[{"key":"category","match":{"value":"docs"}}],"should":[{"key":"year","range":{"gte":2024}},{"key":"pinned","match":{"value":true}}]}"#
//! );
//! ```
//!
//! ### Raw Filters
//!
//! Filters written by hand are sent verbatim and can't be combined further:
//!
//! ```rust
//! use qfilter::prelude::*;
//!
//! let raw = Filter::from_raw(r#"{"must":[{"has_id":[1,2,3]}]}"#).unwrap();
//! let err = raw.add_condition(field("city").eq("Paris")).unwrap_err();
//! assert!(matches!(err, Error::FilterModificationForbidden { .. }));
//! ```
//!
//! ### Index Planning
//!
//! ```rust
//! use qfilter::prelude::*;
//!
//! let filter = Filter::from_condition(GroupCondition::must(vec![
//!     Box::new(field("age").gte(18)),
//!     Box::new(field("city").eq("Paris")),
//!     Box::new(HasVectorCondition::new("image")),
//! ]));
//!
//! let fields = filter.collect_payload_fields();
//! assert_eq!(fields.len(), 3);
//! assert!(fields.contains(&PayloadField::new("age", PayloadFieldType::Integer)));
//! assert!(fields.contains(&PayloadField::untyped("image")));
//!
//! let indexed = fields.iter().filter(|f| f.is_typed()).count();
//! assert_eq!(indexed, 2);
//! ```
//!
//! ### Endpoint Failover
//!
//! ```rust
//! use qfilter::prelude::*;
//!
//! let settings = ClientSettings::new("http://node-a:6333").with_endpoint("http://node-b:6333");
//! let mut endpoints = settings.endpoint_rotation().unwrap();
//!
//! let served_by = endpoints.try_each(|endpoint| {
//!     if endpoint.contains("node-b") { Ok(endpoint.clone()) } else { Err("connection refused") }
//! });
//! assert_eq!(served_by.unwrap(), "http://node-b:6333");
//! ```
//!
//! ## Architecture
//!
//! qfilter is organized into two crates:
//!
//! - **`qfilter-core`** — Filter tree, visitors, rotation, settings
//! - **`qfilter`** — Main crate that re-exports everything
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`](crate::Result), which uses
//! the [`Error`] enum for error types.
//!
//! ## Thread Safety
//!
//! - [`Filter`] and its conditions are `Send + Sync`; build on one thread, share read-only
//! - [`CircularSequence`] is not synchronized; use external locking if shared

// Re-export everything from core
pub use qfilter_core::*;

//! # Filter Module
//!
//! Per-resource filter tables and the compiler that turns query parameters
//! into parameterized predicates.

pub mod compiler;
pub mod query;
pub mod registry;
pub mod resources;
pub mod spec;
pub mod sql;

pub use compiler::{compile, compile_lookup, MAX_PAGE, RESERVED_PARAMS};
pub use query::{
    BoundValue, CompiledPredicate, CompiledQuery, Condition, PageDirective, SortDirection,
    SortDirective,
};
pub use registry::FilterRegistry;
pub use spec::{FilterShape, FilterSpec, IdShape, ResourceName, ResourceSpec};
pub use sql::{render_select, Dialect, Postgres, Sqlite, SqlStatement};

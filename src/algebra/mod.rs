//! Relational algebra operators: select, project and insert over an open
//! relational store.
//!
//! Operators validate everything they can (relation handles, attribute names,
//! literal types) before touching storage. Select and project build their
//! result in a freshly created target relation. The target is closed when
//! the operator succeeds and deleted when anything fails after its creation.
mod coerce;
mod insert;
mod lifecycle;
mod project;
pub mod resolve;
mod select;

#[cfg(test)]
mod tests;

pub use coerce::{coerce, is_number};
pub use insert::insert;
pub use project::{project, project_attributes};
pub use select::select;

pub mod field;
mod op;
mod schema;

pub use field::{BoundedString, Field};
pub use op::CompareOp;
pub use schema::{AttributeSpec, DataType, Schema, SchemaBuilder};

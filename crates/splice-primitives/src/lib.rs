pub mod builtin;
pub mod operator;
pub mod primitive;
pub mod registry;

pub use operator::{Operator, Shape};
pub use primitive::Primitive;
pub use registry::{PrimitiveLibrary, STANDARD_TYPES};

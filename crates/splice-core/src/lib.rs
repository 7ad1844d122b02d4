pub mod config;
pub mod data;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use data::{DataFactory, DataValue, TypeDescriptor, Value, ValueKind};
pub use error::{Result, SpliceError};
pub use types::Signature;

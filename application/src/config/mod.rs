//! Application-level configuration values.

pub mod execution_params;

pub use execution_params::ExecutionParams;

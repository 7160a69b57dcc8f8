//! Configuration loading and raw file-config types.

pub mod file_config;
pub mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileCouncilConfig, FileGatewayConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;

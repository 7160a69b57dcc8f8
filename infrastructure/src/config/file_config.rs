//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain/application
//! types after validation.

use council_application::ExecutionParams;
use council_domain::{CouncilConfig, Model, ScoringRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("council model name cannot be empty")]
    EmptyModelName,

    #[error("invalid scoring rule: {0}")]
    InvalidScoringRule(String),
}

/// Raw council configuration from TOML (`[council]` section)
///
/// ```toml
/// [council]
/// members = ["gpt-4o", "gemini-2.0-flash", "claude-sonnet-4-5"]
/// chairman = "gpt-4o"
/// title_model = "gpt-4o-mini"
/// scoring = "inverse-rank"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Member model names; empty means the built-in default council
    pub members: Vec<String>,
    /// Chairman model for synthesis
    pub chairman: Option<String>,
    /// Lightweight model for conversation titles
    pub title_model: Option<String>,
    /// Scoring rule: "inverse-rank" or "borda:N"
    pub scoring: String,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            chairman: None,
            title_model: None,
            scoring: "inverse-rank".to_string(),
        }
    }
}

impl FileCouncilConfig {
    /// Build the immutable council configuration, falling back to the
    /// built-in defaults for anything unset.
    pub fn to_council_config(&self) -> CouncilConfig {
        let members: Vec<Model> = if self.members.is_empty() {
            Model::default_council()
        } else {
            self.members.iter().map(|s| s.parse().unwrap()).collect()
        };

        let mut config = CouncilConfig::new(members);
        if let Some(chairman) = &self.chairman {
            config = config.with_chairman(chairman.parse().unwrap());
        }
        if let Some(title_model) = &self.title_model {
            config = config.with_title_model(title_model.parse().unwrap());
        }
        config
    }

    /// Parse the scoring rule string.
    pub fn parse_scoring(&self) -> Result<ScoringRule, ConfigValidationError> {
        self.scoring
            .parse()
            .map_err(ConfigValidationError::InvalidScoringRule)
    }
}

/// Raw gateway configuration from TOML (`[gateway]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Base URL of the OpenAI-compatible routing proxy
    pub base_url: String,
    /// Optional bearer key (the proxy usually authenticates via OAuth)
    pub api_key: Option<String>,
    /// Deadline in seconds for council/chairman invocations
    pub timeout_seconds: u64,
    /// Deadline in seconds for the title invocation
    pub title_timeout_seconds: u64,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/v1".to_string(),
            api_key: None,
            timeout_seconds: 120,
            title_timeout_seconds: 30,
        }
    }
}

impl FileGatewayConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::new(
            Duration::from_secs(self.timeout_seconds),
            Duration::from_secs(self.title_timeout_seconds),
        )
    }
}

/// Raw storage configuration from TOML (`[storage]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding conversation JSON files
    pub data_dir: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/conversations".to_string(),
        }
    }
}

/// Complete file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub council: FileCouncilConfig,
    pub gateway: FileGatewayConfig,
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Validate the combination before any of it is used.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.council.members.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.gateway.timeout_seconds == 0 || self.gateway.title_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        self.council.parse_scoring()?;
        Ok(())
    }
}

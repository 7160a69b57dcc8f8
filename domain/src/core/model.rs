//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// This is a domain concept representing the different AI models
/// that can sit on a council. Identifiers match what the model-routing
/// proxy expects in chat completion requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // GPT models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    // Gemini models
    Gemini20Flash,
    Gemini25Flash,
    Gemini25Pro,
    // Claude models
    ClaudeSonnet45,
    ClaudeHaiku45,
    ClaudeOpus41,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::ClaudeSonnet45 => "claude-sonnet-4-5",
            Model::ClaudeHaiku45 => "claude-haiku-4-5",
            Model::ClaudeOpus41 => "claude-opus-4-1",
            Model::Custom(s) => s,
        }
    }

    /// The default council membership: one model per provider family.
    pub fn default_council() -> Vec<Model> {
        vec![Model::Gpt4o, Model::Gemini20Flash, Model::ClaudeSonnet45]
    }

    /// The default chairman model used for final synthesis.
    pub fn default_chairman() -> Model {
        Model::Gpt4o
    }

    /// The default lightweight model used for conversation titles.
    pub fn default_title_model() -> Model {
        Model::Gpt4oMini
    }

    /// Check if this is a GPT model
    pub fn is_gpt(&self) -> bool {
        matches!(self, Model::Gpt4o | Model::Gpt4oMini | Model::Gpt41)
    }

    /// Check if this is a Gemini model
    pub fn is_gemini(&self) -> bool {
        matches!(
            self,
            Model::Gemini20Flash | Model::Gemini25Flash | Model::Gemini25Pro
        )
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        matches!(
            self,
            Model::ClaudeSonnet45 | Model::ClaudeHaiku45 | Model::ClaudeOpus41
        )
    }
}

impl Default for Model {
    /// Returns the default model (GPT-4o)
    fn default() -> Self {
        Model::Gpt4o
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "claude-sonnet-4-5" => Model::ClaudeSonnet45,
            "claude-haiku-4-5" => Model::ClaudeHaiku45,
            "claude-opus-4-1" => Model::ClaudeOpus41,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap())
    }
}

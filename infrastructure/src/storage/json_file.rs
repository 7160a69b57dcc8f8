//! JSON file conversation store.
//!
//! One conversation per file under the data directory
//! (`<data_dir>/<id>.json`), written whole on every mutation. Conversations
//! are small and append-only per turn, so rewrite-on-append keeps the format
//! trivially inspectable.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use council_application::ports::conversation_store::{ConversationStore, StoreError};
use council_domain::{Conversation, ConversationSummary, CouncilTurn};
use std::fs;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// File-backed conversation store.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }

    /// Ids are store-generated UUIDs; anything else (in particular anything
    /// that could traverse paths) is rejected before touching the
    /// filesystem.
    fn validate_id(id: &str) -> Result<(), StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    fn read(&self, id: &str) -> Result<Conversation, StoreError> {
        Self::validate_id(id)?;
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::Io(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn write(&self, conversation: &Conversation) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Io(e.to_string()))?;
        let raw = serde_json::to_string_pretty(conversation)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        fs::write(self.path_for(&conversation.id), raw)
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl ConversationStore for JsonFileStore {
    async fn create(&self) -> Result<Conversation, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let conversation = Conversation::new(id, created_at);
        self.write(&conversation)?;
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Conversation, StoreError> {
        self.read(id)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            // A store that has never written anything lists as empty.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::Io(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| StoreError::Io(e.to_string()))
                .and_then(|raw| {
                    serde_json::from_str::<Conversation>(&raw)
                        .map_err(|e| StoreError::Corrupt(e.to_string()))
                }) {
                Ok(conversation) => summaries.push(conversation.summary()),
                Err(e) => warn!("Skipping unreadable conversation {}: {}", path.display(), e),
            }
        }

        // RFC 3339 strings sort chronologically; newest first.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn append_user_message(&self, id: &str, content: &str) -> Result<(), StoreError> {
        let mut conversation = self.read(id)?;
        conversation.add_user_message(content);
        self.write(&conversation)
    }

    async fn append_turn(&self, id: &str, turn: &CouncilTurn) -> Result<(), StoreError> {
        let mut conversation = self.read(id)?;
        conversation.add_turn(turn.clone());
        self.write(&conversation)
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), StoreError> {
        let mut conversation = self.read(id)?;
        conversation.set_title(title);
        self.write(&conversation)
    }
}

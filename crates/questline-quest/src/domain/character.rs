//! Character actions, used to wire quest givers to the quests they hand out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata key a give-quest action stores its quest id under.
pub const QUEST_ID_METADATA_KEY: &str = "questId";

/// What interacting with a character does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// Plain dialogue.
    Talk,
    /// Hands the player a quest.
    GiveQuest,
}

impl ActionType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Talk => "talk",
            Self::GiveQuest => "giveQuest",
        }
    }

    /// Parses the stored representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "talk" => Some(Self::Talk),
            "giveQuest" => Some(Self::GiveQuest),
            _ => None,
        }
    }
}

/// One line of character dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueMessage {
    pub speaker: String,
    pub text: String,
    pub order: i32,
}

/// An interaction offered by a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAction {
    pub id: Uuid,
    pub character_id: Uuid,
    pub action_type: ActionType,
    #[serde(default)]
    pub dialogue: Vec<DialogueMessage>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CharacterAction {
    /// A give-quest action pointing at `quest_id`, with no dialogue.
    #[must_use]
    pub fn give_quest(id: Uuid, character_id: Uuid, quest_id: Uuid) -> Self {
        let mut metadata = Map::new();
        metadata.insert(
            QUEST_ID_METADATA_KEY.to_owned(),
            Value::String(quest_id.to_string()),
        );
        Self {
            id,
            character_id,
            action_type: ActionType::GiveQuest,
            dialogue: Vec::new(),
            metadata,
        }
    }

    /// Quest referenced by the metadata, if it parses.
    #[must_use]
    pub fn quest_id(&self) -> Option<Uuid> {
        self.metadata
            .get(QUEST_ID_METADATA_KEY)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    }

    /// Whether this is a give-quest action for `quest_id`.
    #[must_use]
    pub fn gives_quest(&self, quest_id: Uuid) -> bool {
        self.action_type == ActionType::GiveQuest && self.quest_id() == Some(quest_id)
    }
}

pub mod abilities;
pub mod monsters;

use serde::{Deserialize, Serialize};

use self::monsters::CharacterTemplate;

/// Immutable stat tables handed to the room at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub player: CharacterTemplate,
    pub exit: CharacterTemplate,
    pub goblin: CharacterTemplate,
    pub goblin_leader: CharacterTemplate,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            player: CharacterTemplate::hero(),
            exit: CharacterTemplate::exit(),
            goblin: CharacterTemplate::goblin(),
            goblin_leader: CharacterTemplate::goblin_leader(),
        }
    }
}

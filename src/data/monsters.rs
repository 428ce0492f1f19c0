use serde::{Deserialize, Serialize};

/// Stat block a spawner copies into a fresh character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    pub glyph: char,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    /// Names resolved against the built-in ability table at spawn time.
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub death_message: Option<String>,
}

impl CharacterTemplate {
    pub fn hero() -> Self {
        Self::new("Hero", '@', 100, 10, 5)
    }

    pub fn exit() -> Self {
        Self::new("Exit", '=', 0, 0, 0)
    }

    pub fn goblin() -> Self {
        Self::new("Goblin", 'g', 30, 10, 2)
    }

    pub fn goblin_leader() -> Self {
        Self::new("Goblin Leader", 'G', 30, 15, 5)
    }

    pub fn death_line(&self) -> String {
        self.death_message
            .clone()
            .unwrap_or_else(|| format!("{} collapses in a heap.", self.name))
    }

    fn new(name: &str, glyph: char, hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.to_string(),
            glyph,
            hp,
            attack,
            defense,
            abilities: Vec::new(),
            death_message: None,
        }
    }
}

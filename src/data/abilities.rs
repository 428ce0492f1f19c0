use serde::{Deserialize, Serialize};

/// Additive stat modifiers. Summed across a character's abilities whenever
/// an attack resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effect {
    pub attack: i32,
    pub defense: i32,
    pub hp: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub effect: Effect,
}

impl Ability {
    fn new(name: &str, description: &str, effect: Effect) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            effect,
        }
    }
}

pub fn builtin_abilities() -> Vec<Ability> {
    vec![Ability::new(
        "Mighty Strength",
        "Increases your strength by 5 by a divine force",
        Effect {
            attack: 5,
            ..Effect::default()
        },
    )]
}

/// Case-insensitive lookup in the built-in ability table.
pub fn lookup(name: &str) -> Option<Ability> {
    builtin_abilities()
        .into_iter()
        .find(|ability| ability.name.eq_ignore_ascii_case(name))
}

use bracket_geometry::prelude::Point;
use crossterm::style::Color;
use smallvec::SmallVec;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::{data::abilities::Ability, map::Kind};

#[derive(Clone, Debug)]
pub struct Identity {
    pub kind: Kind,
    pub name: String,
    pub death_message: String,
}

impl Component for Identity {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
    pub previous: Point,
}

impl Position {
    pub fn at(point: Point) -> Self {
        Self {
            point,
            previous: point,
        }
    }

    pub fn step_to(&mut self, target: Point) {
        self.previous = self.point;
        self.point = target;
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: char,
    pub color: Color,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct CombatStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Abilities {
    pub list: SmallVec<[Ability; 4]>,
}

impl Abilities {
    pub fn attack_bonus(&self) -> i32 {
        self.list.iter().map(|ability| ability.effect.attack).sum()
    }

    pub fn defense_bonus(&self) -> i32 {
        self.list.iter().map(|ability| ability.effect.defense).sum()
    }
}

impl Component for Abilities {
    type Storage = VecStorage<Self>;
}

/// Latched flags: once set they are never cleared.
#[derive(Clone, Debug, Default)]
pub struct Status {
    pub has_died: bool,
    pub has_exited: bool,
}

impl Component for Status {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct IntentStep {
    pub delta: Point,
}

impl Default for IntentStep {
    fn default() -> Self {
        Self {
            delta: Point::new(0, 0),
        }
    }
}

impl Component for IntentStep {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct MonsterTag;

impl Component for MonsterTag {
    type Storage = NullStorage<Self>;
}

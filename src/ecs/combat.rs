//! Melee resolution between two occupants of the room.

use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, WorldExt};
use tracing::debug;

use super::{
    EcsWorld,
    components::{Abilities, CombatStats},
};
use crate::{error::RuleError, map::Occupant};

/// HP taken from the defender by one blow.
///
/// Ability defense bonuses are subtracted from the defender's defense, so a
/// positive defense effect makes the defender easier to hit. Damage is not
/// clamped and can come out negative.
pub fn damage(attack: i32, attack_bonus: i32, defense: i32, defense_bonus: i32) -> i32 {
    (attack + attack_bonus) - (defense - defense_bonus)
}

impl EcsWorld {
    /// Attack from the occupant at `from` into whatever is at `to`.
    pub fn attack_direction(&mut self, from: Point, to: Point) -> Result<(), RuleError> {
        if !self.room.in_bounds(from) || !self.room.in_bounds(to) {
            return Err(RuleError::OutOfBounds);
        }
        if from == to {
            return Err(RuleError::SelfTarget);
        }
        let attacker = self
            .room
            .occupant_at(from)
            .and_then(|occupant| occupant.entity())
            .ok_or(RuleError::NoEntity)?;
        let defender = self.room.occupant_at(to).ok_or(RuleError::NoEntity)?;
        self.attack_entity(attacker, defender);
        Ok(())
    }

    /// Resolves one blow. Corpses, walls and empty air absorb it without any
    /// state change. Death is latched later, during the enemy pass.
    pub fn attack_entity(&mut self, attacker: Entity, defender: Occupant) {
        let target = match defender {
            Occupant::Empty => {
                self.room
                    .log
                    .push("You attack into the air and almost hit yourself!");
                return;
            }
            Occupant::Wall => {
                self.room.log.push("You attack and hit a wall!");
                return;
            }
            Occupant::Actor { entity, .. } => entity,
        };

        let attacker_name = self.name_of(attacker);
        let defender_name = self.name_of(target);
        let (attack_bonus, defense_bonus) = {
            let abilities = self.specs_world.read_component::<Abilities>();
            (
                abilities.get(attacker).map_or(0, Abilities::attack_bonus),
                abilities.get(target).map_or(0, Abilities::defense_bonus),
            )
        };

        let mut stats = self.specs_world.write_component::<CombatStats>();
        let Some(attack) = stats.get(attacker).map(|stat| stat.attack) else {
            debug!("{attacker_name} has no combat stats and cannot attack");
            return;
        };
        let Some(defender_stats) = stats.get_mut(target) else {
            debug!("{defender_name} has no combat stats and cannot be attacked");
            return;
        };

        if defender_stats.hp <= 0 {
            self.room
                .log
                .push(format!("{defender_name} is already defeated!"));
            return;
        }

        let dealt = damage(attack, attack_bonus, defender_stats.defense, defense_bonus);
        defender_stats.hp -= dealt;
        debug!("{attacker_name} hits {defender_name} for {dealt}");
        self.room
            .log
            .push(format!("{attacker_name} attacks {defender_name}!"));
        if defender_stats.hp <= 0 {
            self.room.log.push(format!("{defender_name} is defeated!"));
        } else {
            self.room.log.push(format!(
                "{defender_name} has {} HP left.",
                defender_stats.hp
            ));
        }
    }
}

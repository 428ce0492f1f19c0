use specs::prelude::*;

use super::{
    components::{CombatStats, IntentStep, MonsterTag, Position},
    resources::{ChaseTarget, TurnClock},
};
use crate::ai::chase_step;

/// Queues a step towards the player for every living monster on turns where
/// enemies are allowed to act.
#[derive(Default)]
pub struct ChaseSystem;

impl<'a> System<'a> for ChaseSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, MonsterTag>,
        ReadStorage<'a, CombatStats>,
        ReadExpect<'a, ChaseTarget>,
        ReadExpect<'a, TurnClock>,
        WriteStorage<'a, IntentStep>,
    );

    fn run(
        &mut self,
        (entities, positions, monsters, stats, target, clock, mut intents): Self::SystemData,
    ) {
        if !clock.enemies_act() {
            return;
        }
        for (entity, pos, _, stat) in (&entities, &positions, &monsters, &stats).join() {
            if stat.hp <= 0 {
                continue;
            }
            let delta = chase_step(pos.point, target.point);
            let _ = intents.insert(entity, IntentStep { delta });
        }
    }
}

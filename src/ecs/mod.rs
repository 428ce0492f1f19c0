pub mod combat;
pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use crossterm::style::Color;
use smallvec::SmallVec;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, World as SpecsWorld, WorldExt,
};
use tracing::{debug, warn};

use crate::{
    data::{
        Catalog,
        abilities::{self, Ability},
        monsters::CharacterTemplate,
    },
    error::{BlockReason, RuleError},
    map::{Kind, Occupant, Room},
};

use self::{
    components::{
        Abilities, CombatStats, Identity, IntentStep, MonsterTag, PlayerTag, Position,
        Renderable, Status,
    },
    resources::{ChaseTarget, TurnClock},
    systems::ChaseSystem,
};

/// The room plus every character standing in it.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    room: Room,
    player: Entity,
    enemies: Vec<Entity>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Attacked,
    Exited,
}

/// Read-only snapshot of one character's components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub entity: Entity,
    pub kind: Kind,
    pub name: String,
    pub glyph: char,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub point: Point,
    pub previous: Point,
    pub has_died: bool,
    pub has_exited: bool,
}

impl EcsWorld {
    pub fn new(
        mut room: Room,
        player_template: &CharacterTemplate,
        spawn: Point,
        rng: RandomNumberGenerator,
    ) -> Result<Self, RuleError> {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(rng);
        specs_world.insert(TurnClock::default());
        specs_world.insert(ChaseTarget { point: spawn });
        let player = Self::spawn_character(
            &mut specs_world,
            &mut room,
            player_template,
            Kind::Player,
            spawn,
        )?;
        let dispatcher = DispatcherBuilder::new()
            .with(ChaseSystem, "chase", &[])
            .build();

        Ok(Self {
            specs_world,
            dispatcher,
            room,
            player,
            enemies: Vec::new(),
        })
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Identity>();
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<CombatStats>();
        world.register::<Abilities>();
        world.register::<Status>();
        world.register::<IntentStep>();
        world.register::<PlayerTag>();
        world.register::<MonsterTag>();
    }

    fn spawn_character(
        world: &mut SpecsWorld,
        room: &mut Room,
        template: &CharacterTemplate,
        kind: Kind,
        point: Point,
    ) -> Result<Entity, RuleError> {
        room.check_vacant(point)?;

        let list = template
            .abilities
            .iter()
            .filter_map(|name| {
                let found = abilities::lookup(name);
                if found.is_none() {
                    warn!("{} has unknown ability {name:?}", template.name);
                }
                found
            })
            .collect::<SmallVec<[Ability; 4]>>();

        let builder = world
            .create_entity()
            .with(Identity {
                kind,
                name: template.name.clone(),
                death_message: template.death_line(),
            })
            .with(Position::at(point))
            .with(Renderable {
                glyph: template.glyph,
                color: kind_color(kind),
            })
            .with(CombatStats {
                hp: template.hp,
                attack: template.attack,
                defense: template.defense,
            })
            .with(Abilities { list })
            .with(Status::default());
        let entity = match kind {
            Kind::Player => builder.with(PlayerTag).build(),
            Kind::Enemy => builder.with(MonsterTag).build(),
            _ => builder.build(),
        };

        room.place(point, entity, kind)?;
        debug!(
            "{} added to the room at ({}, {})",
            template.name, point.x, point.y
        );
        Ok(entity)
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn player_point(&self) -> Point {
        let positions = self.specs_world.read_component::<Position>();
        positions
            .get(self.player)
            .map(|pos| pos.point)
            .unwrap_or(Point::new(0, 0))
    }

    pub fn player_character(&self) -> Option<Character> {
        self.character(self.player)
    }

    pub fn push_log<S: Into<String>>(&mut self, entry: S) {
        self.room.log.push(entry);
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        self.room.log.drain()
    }

    pub fn character(&self, entity: Entity) -> Option<Character> {
        let identities = self.specs_world.read_component::<Identity>();
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let statuses = self.specs_world.read_component::<Status>();

        let identity = identities.get(entity)?;
        let position = positions.get(entity)?;
        let stat = stats.get(entity)?;
        let status = statuses.get(entity).cloned().unwrap_or_default();
        Some(Character {
            entity,
            kind: identity.kind,
            name: identity.name.clone(),
            glyph: renderables.get(entity).map_or('?', |r| r.glyph),
            hp: stat.hp,
            attack: stat.attack,
            defense: stat.defense,
            point: position.point,
            previous: position.previous,
            has_died: status.has_died,
            has_exited: status.has_exited,
        })
    }

    /// Glyph, colour and death flag for the renderer.
    pub fn appearance(&self, entity: Entity) -> Option<(Renderable, bool)> {
        let renderables = self.specs_world.read_component::<Renderable>();
        let statuses = self.specs_world.read_component::<Status>();
        let renderable = renderables.get(entity)?.clone();
        let died = statuses.get(entity).is_some_and(|s| s.has_died);
        Some((renderable, died))
    }

    pub(crate) fn name_of(&self, entity: Entity) -> String {
        self.specs_world
            .read_component::<Identity>()
            .get(entity)
            .map(|identity| identity.name.clone())
            .unwrap_or_else(|| "something".to_string())
    }

    #[cfg(test)]
    pub(crate) fn grant_ability(&mut self, entity: Entity, ability: Ability) {
        let mut storage = self.specs_world.write_component::<Abilities>();
        if let Some(abilities) = storage.get_mut(entity) {
            abilities.list.push(ability);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_hp(&mut self, entity: Entity, hp: i32) {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        if let Some(stat) = stats.get_mut(entity) {
            stat.hp = hp;
        }
    }

    fn random_empty_space(&mut self) -> Option<Point> {
        let mut rng = self.specs_world.write_resource::<RandomNumberGenerator>();
        self.room.find_empty_space(&mut rng)
    }

    /// Puts the exit on the non-wall cell farthest from the player.
    pub fn spawn_exit(&mut self, template: &CharacterTemplate) -> Result<Entity, RuleError> {
        let point = self
            .room
            .find_farthest_distance(self.player_point(), true)
            .ok_or(RuleError::NoEmptySpace)?;
        debug!("Farthest exit found at coordinates: ({}, {})", point.x, point.y);
        Self::spawn_character(
            &mut self.specs_world,
            &mut self.room,
            template,
            Kind::Exit,
            point,
        )
    }

    pub fn spawn_enemy(
        &mut self,
        template: &CharacterTemplate,
        point: Point,
    ) -> Result<Entity, RuleError> {
        let entity = Self::spawn_character(
            &mut self.specs_world,
            &mut self.room,
            template,
            Kind::Enemy,
            point,
        )?;
        self.enemies.push(entity);
        Ok(entity)
    }

    /// Scatters up to `count` enemies over random empty cells. A spawn with
    /// nowhere to go is skipped.
    pub fn add_random_enemies(
        &mut self,
        template: &CharacterTemplate,
        count: usize,
    ) -> Vec<Entity> {
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(point) = self.random_empty_space() else {
                warn!("No empty space left for {}", template.name);
                continue;
            };
            match self.spawn_enemy(template, point) {
                Ok(entity) => spawned.push(entity),
                Err(err) => warn!("Could not spawn {}: {err}", template.name),
            }
        }
        spawned
    }

    /// Drops a cluster of goblins around a random empty anchor: the first
    /// `count` cells of the cluster get goblins, the next one the leader.
    pub fn place_goblin_pack(
        &mut self,
        count: usize,
        leader: bool,
        radius: i32,
        catalog: &Catalog,
    ) -> Vec<Entity> {
        let Some(anchor) = self.random_empty_space() else {
            warn!("No empty space left for a goblin pack");
            return Vec::new();
        };
        let area = self.room.find_empty_spaces_close_together(anchor, radius);
        debug!(
            "Empty area of {} cells found around ({}, {})",
            area.len(),
            anchor.x,
            anchor.y
        );

        let mut pack = Vec::new();
        for (index, point) in area.into_iter().enumerate() {
            let template = if index < count {
                &catalog.goblin
            } else if leader && index == count {
                &catalog.goblin_leader
            } else {
                break;
            };
            match self.spawn_enemy(template, point) {
                Ok(entity) => pack.push(entity),
                Err(err) => warn!("Could not spawn {}: {err}", template.name),
            }
        }
        pack
    }

    /// Steps `entity` by `delta`. Stepping into a hostile character attacks
    /// it instead; stepping onto the exit flags the mover as escaped without
    /// moving it.
    pub fn move_character(
        &mut self,
        entity: Entity,
        delta: Point,
    ) -> Result<MoveOutcome, RuleError> {
        let (origin, mover) = {
            let positions = self.specs_world.read_component::<Position>();
            let identities = self.specs_world.read_component::<Identity>();
            let position = positions.get(entity).ok_or(RuleError::NoEntity)?;
            let identity = identities.get(entity).ok_or(RuleError::NoEntity)?;
            (position.point, identity.kind)
        };
        let target = Point::new(origin.x + delta.x, origin.y + delta.y);
        let occupant = self
            .room
            .occupant_at(target)
            .ok_or(RuleError::OutOfBounds)?;

        match occupant {
            Occupant::Wall => Err(RuleError::Blocked(BlockReason::Wall)),
            Occupant::Actor {
                kind: Kind::Exit, ..
            } => {
                {
                    let mut statuses = self.specs_world.write_component::<Status>();
                    if let Some(status) = statuses.get_mut(entity) {
                        status.has_exited = true;
                    }
                }
                let name = self.name_of(entity);
                self.room.log.push(format!("{name} has found the exit!"));
                Ok(MoveOutcome::Exited)
            }
            Occupant::Actor {
                kind: Kind::Enemy, ..
            } if mover == Kind::Enemy => Err(RuleError::Blocked(BlockReason::Enemy)),
            Occupant::Actor { kind, .. } if mover.is_hostile_to(kind) => {
                self.attack_entity(entity, occupant);
                Ok(MoveOutcome::Attacked)
            }
            Occupant::Actor { .. } => Err(RuleError::Blocked(BlockReason::Occupied)),
            Occupant::Empty => {
                self.room.relocate(origin, target);
                let mut positions = self.specs_world.write_component::<Position>();
                if let Some(position) = positions.get_mut(entity) {
                    position.step_to(target);
                }
                Ok(MoveOutcome::Moved)
            }
        }
    }

    /// Sets `has_died` the first time it is called for a character and logs
    /// its death message. Returns whether this call did the latching.
    fn latch_death(&mut self, entity: Entity) -> bool {
        let newly_dead = {
            let mut statuses = self.specs_world.write_component::<Status>();
            match statuses.get_mut(entity) {
                Some(status) if !status.has_died => {
                    status.has_died = true;
                    true
                }
                _ => false,
            }
        };
        if newly_dead {
            let message = self
                .specs_world
                .read_component::<Identity>()
                .get(entity)
                .map(|identity| identity.death_message.clone());
            debug!("{} has died", self.name_of(entity));
            if let Some(message) = message {
                self.room.log.push(message);
            }
        }
        newly_dead
    }

    /// One pass over the enemies in spawn order: corpses are skipped, fresh
    /// deaths are latched, and on even turns the living chase the player.
    pub fn resolve_enemy_turns(&mut self, clock: TurnClock) {
        let target = self.player_point();
        self.specs_world.insert(clock);
        self.specs_world.insert(ChaseTarget { point: target });
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();

        for enemy in self.enemies.clone() {
            let Some(character) = self.character(enemy) else {
                continue;
            };
            if character.hp <= 0 {
                if character.has_died {
                    debug!("Enemy {} is dead and cannot take its turn", character.name);
                } else {
                    self.latch_death(enemy);
                }
                continue;
            }

            let intent = self
                .specs_world
                .write_component::<IntentStep>()
                .remove(enemy);
            if !clock.enemies_act() {
                debug!("Enemy {} is waiting for their turn", character.name);
                continue;
            }
            let Some(intent) = intent else {
                continue;
            };
            debug!(
                "Enemy {} direction vector: ({}, {})",
                character.name, intent.delta.x, intent.delta.y
            );

            match self.move_character(enemy, intent.delta) {
                Ok(MoveOutcome::Moved) => self
                    .room
                    .log
                    .push(format!("{} moves towards the player", character.name)),
                Ok(_) => {}
                Err(err) => {
                    debug!("Enemy {} could not move: {err}", character.name);
                    self.room.log.push(err.to_string());
                }
            }
        }
    }

    /// Latches the player's death once their HP has run out.
    pub fn settle_player(&mut self) -> bool {
        let down = self.player_character().is_some_and(|c| c.hp <= 0);
        if down {
            self.latch_death(self.player);
        }
        down
    }
}

fn kind_color(kind: Kind) -> Color {
    match kind {
        Kind::Player => Color::Yellow,
        Kind::Enemy => Color::Red,
        Kind::Exit => Color::Cyan,
        Kind::Wall => Color::Grey,
        Kind::Empty => Color::DarkGrey,
    }
}

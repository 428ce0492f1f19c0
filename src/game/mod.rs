pub mod command;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::{
    config::GameConfig,
    ecs::{EcsWorld, MoveOutcome, resources::TurnClock},
    error::RuleError,
    input::CommandSource,
    map::Room,
    render::{PROMPT, Screen, compose},
};

use self::command::{Action, Command};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Escaped,
    Defeated,
    InputClosed,
}

impl GameOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            GameOutcome::Escaped => 0,
            GameOutcome::Defeated => 1,
            GameOutcome::InputClosed => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    AwaitingPlayerInput,
    ResolvingPlayerAction,
    ResolvingEnemyTurns,
    Over(GameOutcome),
}

pub struct Game {
    world: EcsWorld,
    clock: TurnClock,
    turns_played: u32,
    state: RunState,
    started: DateTime<Local>,
}

impl Game {
    /// Builds the room, the player, the exit and the opening enemies.
    pub fn from_config(config: &GameConfig) -> Result<Self, RuleError> {
        let room = Room::new(config.room.width, config.room.height, config.room.level);
        let mut rng = match config.seed {
            Some(seed) => RandomNumberGenerator::seeded(seed),
            None => RandomNumberGenerator::new(),
        };
        let spawn = room.find_empty_space(&mut rng).ok_or(RuleError::NoEmptySpace)?;
        let enemy_count = rng.range(config.enemies.min, config.enemies.max + 1);
        let catalog = &config.catalog;

        let mut world = EcsWorld::new(room, &catalog.player, spawn, rng)?;
        world.spawn_exit(&catalog.exit)?;
        world.add_random_enemies(&catalog.goblin, enemy_count);
        if let Some(pack) = &config.enemies.pack {
            world.place_goblin_pack(pack.count, pack.leader, pack.radius, catalog);
        }
        info!(
            "Game ready: {}x{} room, player at ({}, {}), {} enemies",
            config.room.width,
            config.room.height,
            spawn.x,
            spawn.y,
            world.enemies().len()
        );
        Ok(Self::from_world(world))
    }

    pub fn from_world(world: EcsWorld) -> Self {
        Self {
            world,
            clock: TurnClock::default(),
            turns_played: 0,
            state: RunState::AwaitingPlayerInput,
            started: Local::now(),
        }
    }

    pub fn world(&self) -> &EcsWorld {
        &self.world
    }

    fn header(&self) -> String {
        let hp = self.world.player_character().map_or(0, |c| c.hp.max(0));
        let living = self
            .world
            .enemies()
            .iter()
            .filter_map(|enemy| self.world.character(*enemy))
            .filter(|enemy| enemy.hp > 0)
            .count();
        format!(
            "Level {} | Turn {} | HP {} | Enemies {}",
            self.world.room().level,
            self.clock.0,
            hp,
            living
        )
    }

    fn present(&mut self, screen: &mut dyn Screen, prompt: Option<&'static str>) {
        let log = self.world.drain_log();
        let mut frame = compose(&self.world, self.header(), log);
        if let Some(prompt) = prompt {
            frame = frame.with_prompt(prompt);
        }
        if let Err(err) = screen.present(&frame) {
            warn!("Could not draw the room: {err}");
        }
    }

    /// One full turn: draw, read a command, resolve it, then let the enemies
    /// act. Returns the state the game is left in.
    pub fn process_turn(
        &mut self,
        input: &mut dyn CommandSource,
        screen: &mut dyn Screen,
    ) -> RunState {
        if let RunState::Over(_) = self.state {
            return self.state;
        }

        self.clock.advance();
        self.turns_played += 1;
        debug!("Game turn {}", self.clock.0);
        self.state = RunState::AwaitingPlayerInput;
        self.present(screen, Some(PROMPT));

        let line = match input.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed");
                return self.finish(GameOutcome::InputClosed, screen);
            }
            Err(err) => {
                error!("Error reading input: {err}");
                self.world.push_log(format!("Error reading input: {err}"));
                return self.state;
            }
        };
        debug!("Input: {line}");

        self.state = RunState::ResolvingPlayerAction;
        if let Err(err) = self.resolve_command(&line) {
            debug!("Rejected command {line:?}: {err}");
            self.world.push_log(err.to_string());
            self.state = RunState::AwaitingPlayerInput;
            return self.state;
        }
        debug!("Player action resolved: {line}");

        if self.world.player_character().is_some_and(|c| c.has_exited) {
            self.world.push_log("You have exited the game.");
            return self.finish(GameOutcome::Escaped, screen);
        }

        self.state = RunState::ResolvingEnemyTurns;
        self.world.resolve_enemy_turns(self.clock);
        if self.world.settle_player() {
            self.world.push_log("You have been defeated.");
            return self.finish(GameOutcome::Defeated, screen);
        }

        self.state = RunState::AwaitingPlayerInput;
        self.state
    }

    /// Parse and apply one command. Only parse failures and unknown
    /// directions come back as errors; rule violations during the action
    /// itself are logged and still cost the turn.
    fn resolve_command(&mut self, line: &str) -> Result<(), RuleError> {
        let command = Command::parse(line)?;
        match command.action {
            Action::Move => {
                let direction = command.direction()?;
                let player = self.world.player();
                match self.world.move_character(player, direction.delta()) {
                    Ok(MoveOutcome::Moved) => {
                        let name = self.world.name_of(player);
                        self.world
                            .push_log(format!("{name} moves {}", command.object));
                    }
                    Ok(_) => {}
                    Err(err) => self.world.push_log(err.to_string()),
                }
            }
            Action::Attack => {
                let delta = command.direction()?.delta();
                let from = self.world.player_point();
                let to = Point::new(from.x + delta.x, from.y + delta.y);
                if let Err(err) = self.world.attack_direction(from, to) {
                    self.world.push_log(err.to_string());
                }
            }
            other => debug!("{other} {} does nothing yet", command.object),
        }
        Ok(())
    }

    fn finish(&mut self, outcome: GameOutcome, screen: &mut dyn Screen) -> RunState {
        self.state = RunState::Over(outcome);
        let elapsed = Local::now() - self.started;
        info!(
            "Game over ({outcome:?}) after {} turns in {}s",
            self.turns_played,
            elapsed.num_seconds()
        );
        self.present(screen, None);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{EnemyConfig, PackConfig},
        data::monsters::CharacterTemplate,
        ecs::tests::world_with_player_at,
        input::ScriptedInput,
        map::Kind,
        render::tests::RecordingScreen,
    };

    fn run_to_end(
        game: &mut Game,
        script: &mut ScriptedInput,
        screen: &mut RecordingScreen,
    ) -> GameOutcome {
        for _ in 0..64 {
            if let RunState::Over(outcome) = game.process_turn(script, screen) {
                return outcome;
            }
        }
        panic!("game did not finish");
    }

    #[test]
    fn idle_player_sees_enemy_move_every_other_turn() {
        let mut world = world_with_player_at(1, 1);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(6, 5))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines(["wait here"; 4]);
        let mut screen = RecordingScreen::default();

        for _ in 0..4 {
            assert_eq!(
                game.process_turn(&mut script, &mut screen),
                RunState::AwaitingPlayerInput
            );
        }

        // Moved on turns 2 and 4 only.
        let character = game.world().character(goblin).unwrap();
        assert_eq!(character.point, Point::new(4, 3));
        assert_eq!(character.previous, Point::new(5, 4));
        assert_eq!(screen.frames.len(), 4);
        assert!(screen.frames[2]
            .log
            .contains(&"Goblin moves towards the player".to_string()));
        assert!(screen.frames[1].log.is_empty());
    }

    #[test]
    fn walking_onto_the_exit_ends_the_game() {
        let mut world = world_with_player_at(1, 1);
        world.spawn_exit(&CharacterTemplate::exit()).unwrap();
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines([
            "move northeast",
            "move up-right",
            "move northeast",
            "move northeast",
            "move east",
            "move right",
            "move east",
        ]);
        let mut screen = RecordingScreen::default();

        let outcome = run_to_end(&mut game, &mut script, &mut screen);

        assert_eq!(outcome, GameOutcome::Escaped);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(game.world().player_point(), Point::new(7, 5));
        let last = screen.frames.last().unwrap();
        assert_eq!(last.prompt, None);
        assert!(last.log.contains(&"Hero has found the exit!".to_string()));
        assert_eq!(last.log.last().unwrap(), "You have exited the game.");
        assert!(screen.frames[1].log.contains(&"Hero moves northeast".to_string()));
    }

    #[test]
    fn invalid_command_skips_the_enemy_pass() {
        let mut world = world_with_player_at(1, 1);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(6, 5))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut script =
            ScriptedInput::from_lines(["wait here", "dance wildly", "move sideways"]);
        let mut screen = RecordingScreen::default();

        game.process_turn(&mut script, &mut screen);
        game.process_turn(&mut script, &mut screen);
        assert_eq!(game.world().character(goblin).unwrap().point, Point::new(6, 5));

        game.process_turn(&mut script, &mut screen);
        assert_eq!(screen.frames[2].log, vec!["invalid command".to_string()]);
        game.process_turn(&mut script, &mut screen);
        assert_eq!(screen.frames[3].log, vec!["You can't go that way.".to_string()]);
    }

    #[test]
    fn blocked_player_move_still_lets_enemies_act() {
        let mut world = world_with_player_at(1, 1);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(6, 5))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines(["rest now", "move west"]);
        let mut screen = RecordingScreen::default();

        game.process_turn(&mut script, &mut screen);
        game.process_turn(&mut script, &mut screen);

        assert_eq!(game.world().character(goblin).unwrap().point, Point::new(5, 4));
        assert_eq!(game.world().player_point(), Point::new(1, 1));
    }

    #[test]
    fn attack_command_hits_the_neighbour() {
        let mut world = world_with_player_at(3, 3);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(3, 4))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines(["attack north", "attack south"]);
        let mut screen = RecordingScreen::default();

        game.process_turn(&mut script, &mut screen);
        assert_eq!(game.world().character(goblin).unwrap().hp, 22);

        // Turn 2: swing at air, then the goblin hits back.
        game.process_turn(&mut script, &mut screen);
        assert_eq!(game.world().player_character().unwrap().hp, 95);
    }

    #[test]
    fn player_at_zero_hp_is_defeated() {
        let mut world = world_with_player_at(1, 1);
        world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(2, 2))
            .unwrap();
        let player = world.player();
        world.set_hp(player, 5);
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines(["wait", "wait a moment", "wait again"]);
        let mut screen = RecordingScreen::default();

        let outcome = run_to_end(&mut game, &mut script, &mut screen);

        assert_eq!(outcome, GameOutcome::Defeated);
        assert_eq!(outcome.exit_code(), 1);
        let last = screen.frames.last().unwrap();
        assert!(last.log.contains(&"Hero collapses in a heap.".to_string()));
        assert_eq!(last.log.last().unwrap(), "You have been defeated.");
        assert!(last.header.contains("HP 0"));
        // The first line had no object and was rejected.
        assert_eq!(screen.frames[1].log, vec!["invalid command".to_string()]);
    }

    /// Hands out "wait here" except on the turns listed in `broken`.
    struct FlakyInput {
        turn: u32,
        broken: &'static [u32],
    }

    impl CommandSource for FlakyInput {
        fn next_line(&mut self) -> std::io::Result<Option<String>> {
            self.turn += 1;
            if self.broken.contains(&self.turn) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "bad bytes",
                ));
            }
            Ok(Some("wait here".to_string()))
        }
    }

    #[test]
    fn read_error_is_logged_and_skips_the_enemy_pass() {
        let mut world = world_with_player_at(1, 1);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(6, 5))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut input = FlakyInput {
            turn: 0,
            broken: &[2],
        };
        let mut screen = RecordingScreen::default();

        for _ in 0..2 {
            assert_eq!(
                game.process_turn(&mut input, &mut screen),
                RunState::AwaitingPlayerInput
            );
        }
        // Turn 2 is even but the read failed, so the goblin stayed put.
        assert_eq!(game.world().character(goblin).unwrap().point, Point::new(6, 5));

        assert_eq!(
            game.process_turn(&mut input, &mut screen),
            RunState::AwaitingPlayerInput
        );
        assert_eq!(
            screen.frames[2].log,
            vec!["Error reading input: bad bytes".to_string()]
        );
        assert_eq!(game.world().character(goblin).unwrap().point, Point::new(6, 5));
        assert_eq!(game.world().player_point(), Point::new(1, 1));
    }

    #[test]
    fn enemy_two_cells_away_closes_in_then_attacks() {
        let mut world = world_with_player_at(1, 1);
        let goblin = world
            .spawn_enemy(&CharacterTemplate::goblin(), Point::new(3, 3))
            .unwrap();
        let mut game = Game::from_world(world);
        let mut script = ScriptedInput::from_lines(["wait here"; 4]);
        let mut screen = RecordingScreen::default();

        game.process_turn(&mut script, &mut screen);
        game.process_turn(&mut script, &mut screen);
        let character = game.world().character(goblin).unwrap();
        assert_eq!(character.point, Point::new(2, 2));
        assert_eq!(character.previous, Point::new(3, 3));
        assert_eq!(game.world().player_character().unwrap().hp, 100);

        game.process_turn(&mut script, &mut screen);
        game.process_turn(&mut script, &mut screen);
        // Adjacent now, so turn 4 is a hit instead of a step.
        assert_eq!(game.world().character(goblin).unwrap().point, Point::new(2, 2));
        assert_eq!(game.world().player_character().unwrap().hp, 95);

        let steps = screen
            .frames
            .iter()
            .flat_map(|frame| frame.log.iter())
            .filter(|line| *line == "Goblin moves towards the player")
            .count();
        assert_eq!(steps, 1);
    }

    #[test]
    fn closed_input_ends_the_game() {
        let mut game = Game::from_world(world_with_player_at(1, 1));
        let mut script = ScriptedInput::from_lines(Vec::<String>::new());
        let mut screen = RecordingScreen::default();

        assert_eq!(
            game.process_turn(&mut script, &mut screen),
            RunState::Over(GameOutcome::InputClosed)
        );
        assert_eq!(GameOutcome::InputClosed.exit_code(), 2);
        // A finished game does not take more turns.
        assert_eq!(
            game.process_turn(&mut script, &mut screen),
            RunState::Over(GameOutcome::InputClosed)
        );
        assert_eq!(screen.frames.len(), 2);
    }

    #[test]
    fn seeded_setup_is_reproducible() {
        let config = GameConfig {
            seed: Some(1234),
            enemies: EnemyConfig {
                min: 2,
                max: 3,
                pack: Some(PackConfig {
                    count: 1,
                    leader: true,
                    radius: 1,
                }),
            },
            ..GameConfig::default()
        };

        let first = Game::from_config(&config).unwrap();
        let second = Game::from_config(&config).unwrap();

        let a = first.world();
        let b = second.world();
        assert_eq!(a.player_point(), b.player_point());
        assert_eq!(a.enemies().len(), b.enemies().len());
        // 2 or 3 scattered goblins, then at most a goblin and its leader.
        assert!((2..=5).contains(&a.enemies().len()));
        let exits = a
            .room()
            .cells()
            .filter(|cell| cell.occupant.kind() == Kind::Exit)
            .count();
        assert_eq!(exits, 1);
        assert!(first.header().starts_with("Level 1 | Turn 0 | HP 100 | Enemies "));
    }
}

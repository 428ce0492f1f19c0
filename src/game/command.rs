use std::{fmt, str::FromStr};

use bracket_geometry::prelude::Point;

use crate::error::RuleError;

/// Every verb the parser recognises. Only `Move` and `Attack` do anything
/// yet; the rest are accepted and ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Move,
    Attack,
    Use,
    Look,
    Examine,
    Open,
    Close,
    Pick,
    Drop,
    Talk,
    Read,
    Cast,
    Equip,
    Unequip,
    Drink,
    Eat,
    Climb,
    Swim,
    Jump,
    Sneak,
    Run,
    Hide,
    Search,
    Rest,
    Wait,
    Sleep,
    Save,
    Load,
    Quit,
    Exit,
    Help,
    Inventory,
    Status,
    Stats,
    Quests,
    Journal,
}

impl Action {
    pub const ALL: [Action; 36] = [
        Action::Move,
        Action::Attack,
        Action::Use,
        Action::Look,
        Action::Examine,
        Action::Open,
        Action::Close,
        Action::Pick,
        Action::Drop,
        Action::Talk,
        Action::Read,
        Action::Cast,
        Action::Equip,
        Action::Unequip,
        Action::Drink,
        Action::Eat,
        Action::Climb,
        Action::Swim,
        Action::Jump,
        Action::Sneak,
        Action::Run,
        Action::Hide,
        Action::Search,
        Action::Rest,
        Action::Wait,
        Action::Sleep,
        Action::Save,
        Action::Load,
        Action::Quit,
        Action::Exit,
        Action::Help,
        Action::Inventory,
        Action::Status,
        Action::Stats,
        Action::Quests,
        Action::Journal,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Move => "move",
            Action::Attack => "attack",
            Action::Use => "use",
            Action::Look => "look",
            Action::Examine => "examine",
            Action::Open => "open",
            Action::Close => "close",
            Action::Pick => "pick",
            Action::Drop => "drop",
            Action::Talk => "talk",
            Action::Read => "read",
            Action::Cast => "cast",
            Action::Equip => "equip",
            Action::Unequip => "unequip",
            Action::Drink => "drink",
            Action::Eat => "eat",
            Action::Climb => "climb",
            Action::Swim => "swim",
            Action::Jump => "jump",
            Action::Sneak => "sneak",
            Action::Run => "run",
            Action::Hide => "hide",
            Action::Search => "search",
            Action::Rest => "rest",
            Action::Wait => "wait",
            Action::Sleep => "sleep",
            Action::Save => "save",
            Action::Load => "load",
            Action::Quit => "quit",
            Action::Exit => "exit",
            Action::Help => "help",
            Action::Inventory => "inventory",
            Action::Status => "status",
            Action::Stats => "stats",
            Action::Quests => "quests",
            Action::Journal => "journal",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == lowered)
            .ok_or(RuleError::UnrecognizedAction(lowered))
    }
}

/// Eight compass steps. Up/north is +y because the room is drawn with
/// y = 0 at the bottom.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn parse(word: &str) -> Option<Self> {
        let direction = match word {
            "up" | "north" => Direction::North,
            "down" | "south" => Direction::South,
            "left" | "west" => Direction::West,
            "right" | "east" => Direction::East,
            "up-right" | "northeast" => Direction::NorthEast,
            "up-left" | "northwest" => Direction::NorthWest,
            "down-right" | "southeast" => Direction::SouthEast,
            "down-left" | "southwest" => Direction::SouthWest,
            _ => return None,
        };
        Some(direction)
    }

    pub fn delta(self) -> Point {
        match self {
            Direction::North => Point::new(0, 1),
            Direction::South => Point::new(0, -1),
            Direction::West => Point::new(-1, 0),
            Direction::East => Point::new(1, 0),
            Direction::NorthEast => Point::new(1, 1),
            Direction::NorthWest => Point::new(-1, 1),
            Direction::SouthEast => Point::new(1, -1),
            Direction::SouthWest => Point::new(-1, -1),
        }
    }
}

/// An `(action, object)` pair pulled out of one line of operator input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub object: String,
}

impl Command {
    /// The first recognised verb wins and the token after it is the object.
    /// A verb in last position has no object, which fails the whole line.
    pub fn parse(input: &str) -> Result<Self, RuleError> {
        let tokens: Vec<String> = input
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        for (idx, token) in tokens.iter().enumerate() {
            let Ok(action) = token.parse::<Action>() else {
                continue;
            };
            return match tokens.get(idx + 1) {
                Some(object) => Ok(Self {
                    action,
                    object: object.clone(),
                }),
                None => Err(RuleError::InvalidCommand),
            };
        }
        Err(RuleError::InvalidCommand)
    }

    /// Direction named by the object, for verbs that take one.
    pub fn direction(&self) -> Result<Direction, RuleError> {
        Direction::parse(&self.object).ok_or(RuleError::BadDirection {
            verb: match self.action {
                Action::Attack => "attack",
                _ => "go",
            },
        })
    }
}
